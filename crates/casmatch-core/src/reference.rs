use std::io::Cursor;

use calamine::{Data, Reader, Xlsx};

use crate::error::CasMatchError;
use crate::model::ReferenceEntry;

pub const CAS_COLUMN: &str = "CAS Number";
pub const NAME_COLUMN: &str = "Chemical Name";

/// One data row of a reference list before expansion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceRow {
    pub cas_cell: String,
    pub chemical_name: String,
}

/// Read the `CAS Number` and `Chemical Name` columns from the first sheet of an xlsx file.
///
/// The first row is the header. Other columns are ignored, and data rows
/// where both cells are empty are skipped.
pub fn read_reference_rows(bytes: &[u8]) -> Result<Vec<ReferenceRow>, CasMatchError> {
    let cursor = Cursor::new(bytes);
    let mut workbook: Xlsx<_> = calamine::open_workbook_from_rs(cursor)
        .map_err(|e| CasMatchError::Schema(format!("failed to open xlsx: {e}")))?;

    let sheet = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| CasMatchError::Schema("workbook has no sheets".into()))?
        .map_err(|e| CasMatchError::Schema(format!("failed to read first sheet: {e}")))?;

    let mut rows = sheet.rows();
    let header: Vec<String> = rows
        .next()
        .map(|r| r.iter().map(|c| cell_text(c).trim().to_string()).collect())
        .unwrap_or_default();

    let column = |name: &str| header.iter().position(|h| h == name);
    let missing: Vec<&str> = [CAS_COLUMN, NAME_COLUMN]
        .into_iter()
        .filter(|&name| column(name).is_none())
        .collect();
    let (Some(cas_idx), Some(name_idx)) = (column(CAS_COLUMN), column(NAME_COLUMN)) else {
        return Err(CasMatchError::Schema(format!(
            "missing required column(s): {}",
            missing.join(", ")
        )));
    };

    Ok(rows
        .map(|r| ReferenceRow {
            cas_cell: r.get(cas_idx).map(cell_text).unwrap_or_default(),
            chemical_name: r.get(name_idx).map(cell_text).unwrap_or_default(),
        })
        .filter(|row| !row.cas_cell.trim().is_empty() || !row.chemical_name.trim().is_empty())
        .collect())
}

/// Expand rows holding several comma-separated CAS numbers into one entry per number.
///
/// The cell is trimmed of spaces and commas, split on commas, and each
/// candidate trimmed again. Every entry keeps its row's chemical name, so
/// the output is never shorter than the input.
pub fn normalize(rows: &[ReferenceRow]) -> Vec<ReferenceEntry> {
    rows.iter()
        .flat_map(|row| {
            row.cas_cell
                .trim_matches(|c: char| c == ' ' || c == ',')
                .split(',')
                .map(move |cas| ReferenceEntry::new(cas.trim(), row.chemical_name.clone()))
        })
        .collect()
}

/// Read and normalize a reference list in one step.
pub fn load_reference_entries(bytes: &[u8]) -> Result<Vec<ReferenceEntry>, CasMatchError> {
    let rows = read_reference_rows(bytes)?;
    Ok(normalize(&rows))
}

fn cell_text(cell: &Data) -> String {
    match cell {
        Data::String(s) => s.clone(),
        Data::Float(f) => f.to_string(),
        Data::Int(i) => i.to_string(),
        Data::Empty => String::new(),
        _ => format!("{cell}"),
    }
}
