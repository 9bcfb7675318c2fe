use casmatch_core::batch::{process_batch, DocumentFailure};
use casmatch_core::error::CasMatchError;
use casmatch_core::extraction::pdftotext::PdftotextExtractor;
use casmatch_core::model::{DocumentKind, SourceDocument};
use casmatch_core::report::DirectorySink;
use casmatch_core::store::ReferenceStore;
use std::path::{Path, PathBuf};

use crate::output;

pub fn run(
    store_dir: &Path,
    out_dir: &Path,
    reference_name: &str,
    input_files: &[PathBuf],
    output_format: &str,
) -> Result<(), CasMatchError> {
    let store = ReferenceStore::open(store_dir)?;
    let reference = store.load(reference_name)?;

    // Unreadable files are reported with the batch instead of aborting it.
    let mut documents = Vec::new();
    let mut load_failures = Vec::new();
    for path in input_files {
        match SourceDocument::load(path) {
            Ok(doc) => documents.push(doc),
            Err(error) => load_failures.push(DocumentFailure {
                document: path.display().to_string(),
                error,
            }),
        }
    }

    let needs_pdftotext = documents.iter().any(|d| d.kind == DocumentKind::Paginated);
    if needs_pdftotext && !PdftotextExtractor::is_available() {
        tracing::warn!("pdftotext not found; PDF reports will fail");
    }

    let extractor = PdftotextExtractor::new();
    let mut sink = DirectorySink::new(out_dir)?;
    let mut outcome = process_batch(&reference, &documents, &extractor, &mut sink)?;
    load_failures.append(&mut outcome.failures);
    outcome.failures = load_failures;

    match output_format {
        "json" => output::json::print(&outcome)?,
        _ => print!("{}", output::table::format_outcome(&outcome, sink.dir())),
    }

    Ok(())
}
