use std::collections::HashMap;

use crate::model::{ChemicalName, LeveledRecord, MatchResult, MatchedRecord, ReferenceEntry};
use crate::validate::is_cas_shaped;

/// Left join records onto the reference list by exact CAS number.
///
/// Every record yields exactly one MatchedRecord, in input order. When the
/// reference list repeats a CAS number the first entry wins. Blank CAS
/// numbers never match, and neither do entries with an empty chemical
/// name. A whitespace-only name is still a name and counts as a match.
pub fn join(records: &[LeveledRecord], reference: &[ReferenceEntry]) -> Vec<MatchedRecord> {
    let mut by_cas: HashMap<&str, &str> = HashMap::with_capacity(reference.len());
    for entry in reference {
        if entry.cas_number.is_empty() {
            continue;
        }
        by_cas
            .entry(entry.cas_number.as_str())
            .or_insert(entry.chemical_name.as_str());
    }

    records
        .iter()
        .map(|record| {
            let chemical_name = match by_cas.get(record.cas_number.as_str()) {
                Some(name) if !name.is_empty() => ChemicalName::Matched(name.to_string()),
                _ => ChemicalName::Unmatched,
            };
            MatchedRecord {
                record: record.clone(),
                chemical_name,
            }
        })
        .collect()
}

pub fn match_count(records: &[MatchedRecord]) -> usize {
    records.iter().filter(|r| r.is_matched()).count()
}

/// Records whose CAS number is well formed, in document order.
pub fn full_table(records: &[MatchedRecord]) -> Vec<MatchedRecord> {
    records
        .iter()
        .filter(|r| is_cas_shaped(&r.record.cas_number))
        .cloned()
        .collect()
}

/// Keep every matched record plus the shallower rows above it.
///
/// Scans from the bottom of the document with a level cursor starting at
/// 0. A row is kept when it is matched or when the last kept row sat
/// deeper than it; keeping a row moves the cursor to its level. The
/// result is returned in document order.
pub fn roll_up(records: &[MatchedRecord]) -> Vec<MatchedRecord> {
    let mut level = 0u8;
    let mut kept = Vec::new();
    for record in records.iter().rev() {
        let current = record.level();
        if record.is_matched() || level > current {
            kept.push(record.clone());
            level = current;
        }
    }
    kept.reverse();
    kept
}

/// Join, count, filter and roll up in one pass over a document's records.
pub fn match_records(records: &[LeveledRecord], reference: &[ReferenceEntry]) -> MatchResult {
    let records = join(records, reference);
    MatchResult {
        match_count: match_count(&records),
        full_table: full_table(&records),
        summary: roll_up(&records),
        records,
    }
}
