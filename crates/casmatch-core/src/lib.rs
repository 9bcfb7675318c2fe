pub mod batch;
pub mod error;
pub mod extraction;
pub mod matching;
pub mod model;
pub mod naming;
pub mod reference;
pub mod report;
pub mod store;
pub mod validate;
pub mod xlsx;

use error::CasMatchError;
use extraction::PdfExtractor;
use model::{LeveledRecord, MatchResult, ReferenceEntry, SourceDocument};

/// Main API entry point: extract a document's leveled records and match them.
///
/// Returns every derived table; writing them out is left to a
/// [`report::ReportSink`].
pub fn match_document(
    document: &SourceDocument,
    reference: &[ReferenceEntry],
    extractor: &dyn PdfExtractor,
) -> Result<MatchResult, CasMatchError> {
    if reference.is_empty() {
        return Err(CasMatchError::Schema("reference list has no entries".into()));
    }
    let records = extraction::extract_records(document, extractor)?;
    Ok(matching::match_records(&records, reference))
}

/// Extract a document's leveled records without matching.
pub fn extract_document(
    document: &SourceDocument,
    extractor: &dyn PdfExtractor,
) -> Result<Vec<LeveledRecord>, CasMatchError> {
    extraction::extract_records(document, extractor)
}
