use std::io::{Cursor, Read};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use zip::ZipArchive;

use crate::error::CasMatchError;

/// Rows of cell text, one entry per grid column.
pub type Table = Vec<Vec<String>>;

const DOCUMENT_PART: &str = "word/document.xml";

/// Read every body-level table of a DOCX file.
///
/// Cell text joins the cell's paragraphs with `\n`. Merged cells are
/// expanded so that every row has one entry per grid column it covers:
/// a `gridSpan` cell repeats its text, a `vMerge` continuation cell repeats
/// the text of the cell above. Nested tables are skipped.
pub fn read_tables(bytes: &[u8]) -> Result<Vec<Table>, CasMatchError> {
    let xml = read_document_xml(bytes)?;
    parse_tables(&xml)
}

fn read_document_xml(bytes: &[u8]) -> Result<String, CasMatchError> {
    let mut archive = ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| CasMatchError::DocumentRead(format!("not a docx container: {e}")))?;
    let mut entry = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| CasMatchError::DocumentRead(format!("{DOCUMENT_PART}: {e}")))?;
    let mut xml = String::new();
    entry
        .read_to_string(&mut xml)
        .map_err(|e| CasMatchError::DocumentRead(format!("{DOCUMENT_PART}: {e}")))?;
    Ok(xml)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum VMerge {
    #[default]
    None,
    Restart,
    Continue,
}

#[derive(Debug, Default)]
struct CellState {
    paragraphs: Vec<String>,
    span: usize,
    merge: VMerge,
}

#[derive(Debug, Default)]
struct TableBuilder {
    rows: Table,
    row: Option<Vec<String>>,
    cell: Option<CellState>,
}

impl TableBuilder {
    fn start_row(&mut self) {
        self.row = Some(Vec::new());
    }

    fn start_cell(&mut self) {
        self.cell = Some(CellState {
            span: 1,
            ..Default::default()
        });
    }

    fn start_paragraph(&mut self) {
        if let Some(cell) = self.cell.as_mut() {
            cell.paragraphs.push(String::new());
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(cell) = self.cell.as_mut() {
            match cell.paragraphs.last_mut() {
                Some(p) => p.push_str(text),
                None => cell.paragraphs.push(text.to_string()),
            }
        }
    }

    fn set_span(&mut self, span: usize) {
        if let Some(cell) = self.cell.as_mut() {
            cell.span = span.max(1);
        }
    }

    fn set_merge(&mut self, merge: VMerge) {
        if let Some(cell) = self.cell.as_mut() {
            cell.merge = merge;
        }
    }

    fn end_cell(&mut self) {
        let (Some(cell), Some(row)) = (self.cell.take(), self.row.as_mut()) else {
            return;
        };
        let column = row.len();
        let text = match cell.merge {
            VMerge::Continue => self
                .rows
                .last()
                .and_then(|above| above.get(column))
                .cloned()
                .unwrap_or_default(),
            VMerge::None | VMerge::Restart => cell.paragraphs.join("\n"),
        };
        for _ in 0..cell.span {
            row.push(text.clone());
        }
    }

    fn end_row(&mut self) {
        if let Some(row) = self.row.take() {
            self.rows.push(row);
        }
    }
}

/// Parse the tables out of a `word/document.xml` part.
pub fn parse_tables(xml: &str) -> Result<Vec<Table>, CasMatchError> {
    let mut reader = Reader::from_str(xml);
    let mut tables = Vec::new();
    let mut builder = TableBuilder::default();
    // Number of currently open w:tbl elements; only depth 1 is collected.
    let mut depth = 0usize;
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match e.local_name().as_ref() {
                b"tbl" => {
                    depth += 1;
                    if depth == 1 {
                        builder = TableBuilder::default();
                    }
                }
                b"tr" if depth == 1 => builder.start_row(),
                b"tc" if depth == 1 => builder.start_cell(),
                b"p" if depth == 1 => builder.start_paragraph(),
                b"r" => in_run = true,
                b"t" if depth == 1 => in_text = true,
                _ => {}
            },
            Ok(Event::Empty(e)) if depth == 1 => match e.local_name().as_ref() {
                b"p" => builder.start_paragraph(),
                b"tab" if in_run => builder.push_text("\t"),
                b"br" | b"cr" if in_run => builder.push_text("\n"),
                b"gridSpan" => {
                    if let Some(span) = val_attr(&e).and_then(|v| v.parse().ok()) {
                        builder.set_span(span);
                    }
                }
                b"vMerge" => {
                    let merge = match val_attr(&e).as_deref() {
                        Some("restart") => VMerge::Restart,
                        _ => VMerge::Continue,
                    };
                    builder.set_merge(merge);
                }
                _ => {}
            },
            Ok(Event::Text(t)) if in_text => {
                let text = t.unescape().map_err(|e| {
                    CasMatchError::DocumentRead(format!("{DOCUMENT_PART}: bad text: {e}"))
                })?;
                builder.push_text(&text);
            }
            Ok(Event::End(e)) => match e.local_name().as_ref() {
                b"t" => in_text = false,
                b"r" => in_run = false,
                b"tc" if depth == 1 => builder.end_cell(),
                b"tr" if depth == 1 => builder.end_row(),
                b"tbl" => {
                    if depth == 1 {
                        tables.push(std::mem::take(&mut builder.rows));
                    }
                    depth = depth.saturating_sub(1);
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(CasMatchError::DocumentRead(format!(
                    "{DOCUMENT_PART}: malformed XML at byte {}: {e}",
                    reader.buffer_position()
                )))
            }
            _ => {}
        }
    }

    Ok(tables)
}

fn val_attr(e: &BytesStart<'_>) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|a| a.key.local_name().as_ref() == b"val")
        .and_then(|a| a.unescape_value().ok().map(|v| v.into_owned()))
}
