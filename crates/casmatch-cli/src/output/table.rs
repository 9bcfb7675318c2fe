use std::fmt::Write;
use std::path::Path;

use casmatch_core::batch::BatchOutcome;
use casmatch_core::model::LeveledRecord;
use casmatch_core::naming::ListingEntry;

pub fn format_records(records: &[LeveledRecord]) -> String {
    let name_width = records
        .iter()
        .map(|r| r.substance_name.chars().count())
        .max()
        .unwrap_or(0)
        .max("Substance Name".len());

    let mut out = String::new();
    let _ = writeln!(out, "Level  {:<name_width$}  CAS Number", "Substance Name");
    for record in records {
        let name = record.substance_name.replace('\n', " ");
        let _ = writeln!(
            out,
            "{:<5}  {:<name_width$}  {}",
            record.level, name, record.cas_number
        );
    }
    let _ = writeln!(out, "\n{} record(s)", records.len());
    out
}

pub fn format_listing(listing: &[ListingEntry]) -> String {
    if listing.is_empty() {
        return "No output files with matching CAS numbers.\n".to_string();
    }

    let standard_width = listing
        .iter()
        .map(|e| e.standard.chars().count())
        .max()
        .unwrap_or(0)
        .max("Standard".len());

    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:<standard_width$}  Matching Number  Filename",
        "Standard"
    );
    for entry in listing {
        let _ = writeln!(
            out,
            "{:<standard_width$}  {:<15}  {}",
            entry.standard, entry.matching_number, entry.filename
        );
    }
    out
}

pub fn format_outcome(outcome: &BatchOutcome, out_dir: &Path) -> String {
    let mut out = String::new();

    if !outcome.index.is_empty() {
        let _ = writeln!(out, "Reports written to {}:\n", out_dir.display());
        for key in &outcome.index {
            let _ = writeln!(out, "  {key}  ({} match(es))", key.match_count);
        }
    }

    if !outcome.failures.is_empty() {
        if !out.is_empty() {
            out.push('\n');
        }
        let _ = writeln!(out, "Failed documents:\n");
        for failure in &outcome.failures {
            let _ = writeln!(out, "  {}: {}", failure.document, failure.error);
        }
    }

    if out.is_empty() {
        out.push_str("No documents processed.\n");
    }
    out
}
