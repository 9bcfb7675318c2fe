use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

use crate::error::CasMatchError;

/// Text written in place of a chemical name when a record has no reference match.
pub const UNMATCHED: &str = "---";

/// Column headers shared by both output sheets.
pub const REPORT_COLUMNS: [&str; 4] = ["Level", "Substance Name", "CAS Number", "Chemical Name"];

/// One leveled row of a material declaration report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeveledRecord {
    pub level: u8,
    pub substance_name: String,
    pub cas_number: String,
}

impl LeveledRecord {
    pub fn new(level: u8, substance_name: impl Into<String>, cas_number: impl Into<String>) -> Self {
        LeveledRecord {
            level,
            substance_name: substance_name.into(),
            cas_number: cas_number.into(),
        }
    }
}

/// One CAS number from a reference list, paired with the chemical name of its source row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceEntry {
    pub cas_number: String,
    pub chemical_name: String,
}

impl ReferenceEntry {
    pub fn new(cas_number: impl Into<String>, chemical_name: impl Into<String>) -> Self {
        ReferenceEntry {
            cas_number: cas_number.into(),
            chemical_name: chemical_name.into(),
        }
    }
}

/// A normalized reference list together with the name it is stored under.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReferenceList {
    /// Stored filename, e.g. `processed_REACH_SVHC.xlsx`.
    pub name: String,
    pub entries: Vec<ReferenceEntry>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "status", content = "name")]
pub enum ChemicalName {
    Matched(String),
    Unmatched,
}

impl ChemicalName {
    pub fn is_matched(&self) -> bool {
        matches!(self, ChemicalName::Matched(_))
    }

    pub fn as_str(&self) -> &str {
        match self {
            ChemicalName::Matched(name) => name,
            ChemicalName::Unmatched => UNMATCHED,
        }
    }
}

impl fmt::Display for ChemicalName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchedRecord {
    #[serde(flatten)]
    pub record: LeveledRecord,
    pub chemical_name: ChemicalName,
}

impl MatchedRecord {
    pub fn is_matched(&self) -> bool {
        self.chemical_name.is_matched()
    }

    pub fn level(&self) -> u8 {
        self.record.level
    }
}

/// Everything derived from matching one document against one reference list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    /// Every extracted record, in document order.
    pub records: Vec<MatchedRecord>,
    pub match_count: usize,
    /// Records with a CAS-shaped number, in document order.
    pub full_table: Vec<MatchedRecord>,
    /// Matched records plus the ancestor rows that give them context.
    pub summary: Vec<MatchedRecord>,
}

/// Source document format, resolved once from the declared file type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentKind {
    /// Word document with real tables (`.docx`).
    Tabular,
    /// Page-oriented document whose tables are recovered from layout (`.pdf`).
    Paginated,
}

impl DocumentKind {
    pub fn from_path(path: &Path) -> Result<DocumentKind, CasMatchError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase());
        match ext.as_deref() {
            Some("docx") => Ok(DocumentKind::Tabular),
            Some("pdf") => Ok(DocumentKind::Paginated),
            _ => Err(CasMatchError::DocumentRead(format!(
                "{}: unsupported document type (expected .docx or .pdf)",
                path.display()
            ))),
        }
    }
}

impl fmt::Display for DocumentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentKind::Tabular => write!(f, "docx"),
            DocumentKind::Paginated => write!(f, "pdf"),
        }
    }
}

/// A document loaded into memory, ready for extraction.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    /// Filename as uploaded, used to derive the output key.
    pub name: String,
    pub kind: DocumentKind,
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, kind: DocumentKind, bytes: Vec<u8>) -> Self {
        SourceDocument {
            name: name.into(),
            kind,
            bytes,
        }
    }

    /// Read a document from disk, resolving its kind from the extension.
    pub fn load(path: &Path) -> Result<SourceDocument, CasMatchError> {
        let kind = DocumentKind::from_path(path)?;
        let bytes = std::fs::read(path)
            .map_err(|e| CasMatchError::DocumentRead(format!("{}: {e}", path.display())))?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Ok(SourceDocument { name, kind, bytes })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_kind_from_extension() {
        assert_eq!(
            DocumentKind::from_path(Path::new("reports/A.docx")).unwrap(),
            DocumentKind::Tabular
        );
        assert_eq!(
            DocumentKind::from_path(Path::new("B.PDF")).unwrap(),
            DocumentKind::Paginated
        );
        assert!(matches!(
            DocumentKind::from_path(Path::new("notes.txt")),
            Err(CasMatchError::DocumentRead(_))
        ));
    }

    #[test]
    fn test_unmatched_renders_sentinel() {
        assert_eq!(ChemicalName::Unmatched.to_string(), "---");
        assert_eq!(ChemicalName::Matched("Water".into()).as_str(), "Water");
    }
}
