use std::collections::HashSet;

use serde::Serialize;

use crate::error::CasMatchError;
use crate::extraction::PdfExtractor;
use crate::model::{MatchResult, ReferenceList, SourceDocument};
use crate::naming::OutputKey;
use crate::report::ReportSink;

/// A document that could not be processed, and why.
#[derive(Debug)]
pub struct DocumentFailure {
    pub document: String,
    pub error: CasMatchError,
}

#[derive(Debug, Serialize)]
struct FailureView<'a> {
    document: &'a str,
    error: String,
}

impl Serialize for DocumentFailure {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        FailureView {
            document: &self.document,
            error: self.error.to_string(),
        }
        .serialize(serializer)
    }
}

/// Result of a batch run.
#[derive(Debug, Default, Serialize)]
pub struct BatchOutcome {
    /// Keys of the reports written, in processing order.
    pub index: Vec<OutputKey>,
    pub failures: Vec<DocumentFailure>,
}

/// Check that a reference list can be matched against.
pub fn validate_reference(reference: &ReferenceList) -> Result<(), CasMatchError> {
    if reference.entries.is_empty() {
        return Err(CasMatchError::Schema(format!(
            "reference list '{}' has no entries",
            reference.name
        )));
    }
    // The key derivation rejects reserved characters in the list name.
    OutputKey::derive(&reference.name, 0, "")?;
    Ok(())
}

/// Extract, match and name a single document.
pub fn process_document(
    reference: &ReferenceList,
    document: &SourceDocument,
    pdf: &dyn PdfExtractor,
) -> Result<(OutputKey, MatchResult), CasMatchError> {
    let result = crate::match_document(document, &reference.entries, pdf)?;
    let key = OutputKey::derive(&reference.name, result.match_count, &document.name)?;
    Ok((key, result))
}

/// Process documents one after another against a shared reference list.
///
/// A problem with the reference list aborts the batch before any document
/// is read. A problem with one document is recorded in the outcome and the
/// batch moves on. A document whose key was already written in this batch
/// is reported as a collision and not written.
pub fn process_batch(
    reference: &ReferenceList,
    documents: &[SourceDocument],
    pdf: &dyn PdfExtractor,
    sink: &mut dyn ReportSink,
) -> Result<BatchOutcome, CasMatchError> {
    validate_reference(reference)?;

    let mut outcome = BatchOutcome::default();
    let mut written: HashSet<OutputKey> = HashSet::new();

    for document in documents {
        match run_one(reference, document, pdf, sink, &written) {
            Ok((key, match_count)) => {
                tracing::info!(
                    document = %document.name,
                    key = %key,
                    matches = match_count,
                    "report written"
                );
                written.insert(key.clone());
                outcome.index.push(key);
            }
            Err(error) => {
                tracing::warn!(document = %document.name, error = %error, "document failed");
                outcome.failures.push(DocumentFailure {
                    document: document.name.clone(),
                    error,
                });
            }
        }
    }

    Ok(outcome)
}

fn run_one(
    reference: &ReferenceList,
    document: &SourceDocument,
    pdf: &dyn PdfExtractor,
    sink: &mut dyn ReportSink,
    written: &HashSet<OutputKey>,
) -> Result<(OutputKey, usize), CasMatchError> {
    let (key, result) = process_document(reference, document, pdf)?;
    if written.contains(&key) {
        return Err(CasMatchError::OutputKeyCollision(key.file_name()));
    }
    sink.write(&key, &result)?;
    Ok((key, result.match_count))
}
