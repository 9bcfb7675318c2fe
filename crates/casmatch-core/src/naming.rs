//! Output key derivation and parsing.
//!
//! An output workbook is named `<standard>&<match count>&<document>.xlsx`.
//! Listing code splits the name on `&` to recover the triple, so `&` is
//! not allowed in reference list or document names.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CasMatchError;

pub const KEY_DELIMITER: char = '&';
pub const REPORT_EXTENSION: &str = ".xlsx";

/// Identity of one output workbook.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutputKey {
    pub standard: String,
    pub match_count: usize,
    pub document: String,
}

impl OutputKey {
    /// Build a key from a stored reference list name and a source document name.
    pub fn derive(
        reference_name: &str,
        match_count: usize,
        document_name: &str,
    ) -> Result<OutputKey, CasMatchError> {
        ensure_no_delimiter(reference_name)?;
        ensure_no_delimiter(document_name)?;
        Ok(OutputKey {
            standard: reference_short_name(reference_name).to_string(),
            match_count,
            document: document_base_name(document_name).to_string(),
        })
    }

    /// Filename of the output workbook.
    pub fn file_name(&self) -> String {
        format_key(&self.standard, self.match_count, &self.document)
    }
}

impl fmt::Display for OutputKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.file_name())
    }
}

/// One row of the "files with matching CAS numbers" listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListingEntry {
    #[serde(rename = "Standard")]
    pub standard: String,
    #[serde(rename = "Matching Number")]
    pub matching_number: String,
    #[serde(rename = "Filename")]
    pub filename: String,
}

pub fn format_key(standard: &str, match_count: usize, document: &str) -> String {
    format!("{standard}{KEY_DELIMITER}{match_count}{KEY_DELIMITER}{document}{REPORT_EXTENSION}")
}

/// Split an output key back into (standard, matching number, filename).
pub fn parse_key(key: &str) -> Result<ListingEntry, CasMatchError> {
    let parts: Vec<&str> = key.split(KEY_DELIMITER).collect();
    let [standard, matching_number, filename] = parts[..] else {
        return Err(CasMatchError::InvalidName(format!(
            "'{key}' is not an output key (expected 3 '&'-separated parts, found {})",
            parts.len()
        )));
    };
    Ok(ListingEntry {
        standard: standard.to_string(),
        matching_number: matching_number.to_string(),
        filename: filename
            .strip_suffix(REPORT_EXTENSION)
            .unwrap_or(filename)
            .to_string(),
    })
}

/// Listing of the keys with at least one match, in input order.
///
/// Names that are not output keys are skipped.
pub fn matching_listing<I, S>(keys: I) -> Vec<ListingEntry>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    keys.into_iter()
        .filter_map(|key| match parse_key(key.as_ref()) {
            Ok(entry) => Some(entry),
            Err(e) => {
                tracing::warn!(key = key.as_ref(), error = %e, "skipping unrecognised output name");
                None
            }
        })
        .filter(|entry| entry.matching_number != "0")
        .collect()
}

/// Short name of a stored reference list: the text after the last `_`, up to the first `.`.
///
/// `processed_REACH_SVHC.xlsx` becomes `SVHC`.
pub fn reference_short_name(stored_name: &str) -> &str {
    let tail = stored_name.rsplit('_').next().unwrap_or(stored_name);
    tail.split('.').next().unwrap_or(tail)
}

/// Document filename without directories and without anything after the first `.`.
pub fn document_base_name(name: &str) -> &str {
    let file = name.rsplit(['/', '\\']).next().unwrap_or(name);
    file.split('.').next().unwrap_or(file)
}

fn ensure_no_delimiter(name: &str) -> Result<(), CasMatchError> {
    if name.contains(KEY_DELIMITER) {
        return Err(CasMatchError::InvalidName(format!(
            "'{name}' contains '{KEY_DELIMITER}', which is reserved for output keys"
        )));
    }
    Ok(())
}
