pub mod docx;
pub mod pdftotext;
pub mod table;

use crate::error::CasMatchError;
use crate::model::{DocumentKind, LeveledRecord, SourceDocument};
use crate::validate::{level_of, strip_separators};

/// Content extracted from a single page of a PDF.
#[derive(Debug, Clone)]
pub struct PageContent {
    pub page_number: usize,
    pub lines: Vec<String>,
}

/// Trait for PDF text extraction backends.
pub trait PdfExtractor: Send + Sync {
    /// Extract text content from PDF bytes, returning one PageContent per page.
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, CasMatchError>;

    /// Name of this extraction backend (for diagnostics).
    fn backend_name(&self) -> &str;
}

/// Extract the leveled records of a document.
///
/// The format was fixed when the document was loaded; `pdf` is only
/// consulted for paginated documents.
pub fn extract_records(
    document: &SourceDocument,
    pdf: &dyn PdfExtractor,
) -> Result<Vec<LeveledRecord>, CasMatchError> {
    let records = match document.kind {
        DocumentKind::Tabular => {
            let tables = docx::read_tables(&document.bytes)?;
            records_from_rows(tables.iter().flatten())
        }
        DocumentKind::Paginated => {
            let pages = pdf.extract_pages(&document.bytes)?;
            let tables: Vec<_> = pages.iter().flat_map(table::find_tables).collect();
            records_from_rows(tables.iter().flat_map(|t| t.rows.iter()))
        }
    };

    tracing::debug!(
        document = %document.name,
        kind = %document.kind,
        records = records.len(),
        "extracted leveled records"
    );

    if records.is_empty() {
        return Err(CasMatchError::EmptyExtraction(document.name.clone()));
    }
    Ok(records)
}

/// Keep the rows whose first cell is a level marker, as 3-column records.
///
/// Rows shorter than three cells read the missing cells as empty.
pub fn records_from_rows<'a, I>(rows: I) -> Vec<LeveledRecord>
where
    I: IntoIterator<Item = &'a Vec<String>>,
{
    rows.into_iter().filter_map(|row| record_from_row(row)).collect()
}

fn record_from_row(row: &[String]) -> Option<LeveledRecord> {
    let cell = |i: usize| row.get(i).map(|c| strip_separators(c)).unwrap_or("");
    let level = level_of(cell(0))?;
    Some(LeveledRecord::new(level, cell(1), cell(2)))
}
