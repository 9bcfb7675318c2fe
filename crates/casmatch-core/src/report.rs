use std::io::Write;
use std::path::{Path, PathBuf};

use crate::error::CasMatchError;
use crate::model::{MatchResult, MatchedRecord, ReferenceEntry, REPORT_COLUMNS};
use crate::naming::OutputKey;
use crate::reference::{CAS_COLUMN, NAME_COLUMN};
use crate::xlsx::{Cell, Sheet, Workbook};

pub const TOTAL_SHEET: &str = "Total List";
pub const SUMMARY_SHEET: &str = "Summary";

/// Destination for finished match reports.
pub trait ReportSink {
    /// Persist one report under `key`. Either the whole report is stored or nothing is.
    fn write(&mut self, key: &OutputKey, result: &MatchResult) -> Result<(), CasMatchError>;
}

/// Build the output workbook: the full table, plus the summary when anything matched.
pub fn build_workbook(result: &MatchResult) -> Workbook {
    let mut workbook = Workbook::new();
    workbook.add_sheet(records_sheet(TOTAL_SHEET, &result.full_table));
    if result.match_count > 0 {
        workbook.add_sheet(records_sheet(SUMMARY_SHEET, &result.summary));
    }
    workbook
}

fn records_sheet(name: &str, records: &[MatchedRecord]) -> Sheet {
    let mut sheet = Sheet::new(name);
    sheet.push_row(REPORT_COLUMNS.iter().map(|h| Cell::from(*h)).collect());
    for r in records {
        sheet.push_row(vec![
            Cell::Number(f64::from(r.record.level)),
            r.record.substance_name.as_str().into(),
            r.record.cas_number.as_str().into(),
            r.chemical_name.as_str().into(),
        ]);
    }
    sheet
}

/// Workbook holding a normalized reference list, one CAS number per row.
pub fn reference_workbook(entries: &[ReferenceEntry]) -> Workbook {
    let mut sheet = Sheet::new("Sheet1");
    sheet.push_row(vec![CAS_COLUMN.into(), NAME_COLUMN.into()]);
    for entry in entries {
        sheet.push_row(vec![
            entry.cas_number.as_str().into(),
            entry.chemical_name.as_str().into(),
        ]);
    }
    let mut workbook = Workbook::new();
    workbook.add_sheet(sheet);
    workbook
}

/// Write `bytes` to `path` through a temporary file in the same directory.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<(), CasMatchError> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.persist(path)
        .map_err(|e| CasMatchError::ReportWrite(format!("{}: {}", path.display(), e.error)))?;
    Ok(())
}

/// Writes each report as `<dir>/<output key>`.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    /// Create the sink, creating `dir` if it does not exist.
    pub fn new(dir: impl Into<PathBuf>) -> Result<Self, CasMatchError> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(DirectorySink { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &OutputKey) -> PathBuf {
        self.dir.join(key.file_name())
    }

    /// Names of the files currently in the output directory, sorted.
    pub fn existing_keys(&self) -> Result<Vec<String>, CasMatchError> {
        let mut names = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                names.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        names.sort();
        Ok(names)
    }
}

impl ReportSink for DirectorySink {
    fn write(&mut self, key: &OutputKey, result: &MatchResult) -> Result<(), CasMatchError> {
        let bytes = build_workbook(result).to_bytes()?;
        write_atomic(&self.path_for(key), &bytes)
    }
}
