use casmatch_core::error::CasMatchError;
use casmatch_core::extraction::pdftotext::PdftotextExtractor;
use casmatch_core::model::SourceDocument;
use std::path::Path;

use crate::output;

pub fn run(input_file: &Path, output_format: &str) -> Result<(), CasMatchError> {
    let document = SourceDocument::load(input_file)?;
    let extractor = PdftotextExtractor::new();
    let records = casmatch_core::extract_document(&document, &extractor)?;

    match output_format {
        "json" => output::json::print(&records)?,
        _ => print!("{}", output::table::format_records(&records)),
    }

    Ok(())
}
