//! Minimal SpreadsheetML writer.
//!
//! Produces a zip container with one worksheet part per sheet. Strings are
//! written inline so no shared string table is needed, and every column
//! gets a width fitted to its longest value.

use std::io::{Cursor, Write};

use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::error::CasMatchError;

const NS_MAIN: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_PKG_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const NS_CONTENT_TYPES: &str = "http://schemas.openxmlformats.org/package/2006/content-types";
const REL_DOCUMENT: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument";
const REL_WORKSHEET: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet";
const REL_STYLES: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles";
const CT_WORKBOOK: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml";
const CT_WORKSHEET: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml";
const CT_STYLES: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml";

const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><fonts count="1"><font><sz val="11"/><name val="Calibri"/></font></fonts><fills count="2"><fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill></fills><borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders><cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs><cellXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/></cellXfs><cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles></styleSheet>"#;

#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Text(String),
    Number(f64),
}

impl Cell {
    fn rendered(&self) -> String {
        match self {
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    pub fn new(name: impl Into<String>) -> Self {
        Sheet {
            name: name.into(),
            rows: Vec::new(),
        }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Width of each column: the character count of its longest rendered value.
    pub fn column_widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = Vec::new();
        for row in &self.rows {
            if widths.len() < row.len() {
                widths.resize(row.len(), 0);
            }
            for (i, cell) in row.iter().enumerate() {
                widths[i] = widths[i].max(cell.rendered().chars().count());
            }
        }
        widths
    }
}

#[derive(Debug, Clone, Default)]
pub struct Workbook {
    pub sheets: Vec<Sheet>,
}

impl Workbook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_sheet(&mut self, sheet: Sheet) {
        self.sheets.push(sheet);
    }

    /// Serialize the workbook to xlsx bytes.
    pub fn to_bytes(&self) -> Result<Vec<u8>, CasMatchError> {
        if self.sheets.is_empty() {
            return Err(CasMatchError::ReportWrite("workbook has no sheets".into()));
        }

        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        let mut parts = vec![
            ("[Content_Types].xml".to_string(), self.content_types_xml()?),
            ("_rels/.rels".to_string(), root_rels_xml()?),
            ("xl/workbook.xml".to_string(), self.workbook_xml()?),
            ("xl/_rels/workbook.xml.rels".to_string(), self.workbook_rels_xml()?),
            ("xl/styles.xml".to_string(), STYLES_XML.as_bytes().to_vec()),
        ];
        for (i, sheet) in self.sheets.iter().enumerate() {
            parts.push((format!("xl/worksheets/sheet{}.xml", i + 1), worksheet_xml(sheet)?));
        }

        for (name, data) in parts {
            zip.start_file(name, options).map_err(zip_error)?;
            zip.write_all(&data)?;
        }

        let cursor = zip.finish().map_err(zip_error)?;
        Ok(cursor.into_inner())
    }

    fn content_types_xml(&self) -> Result<Vec<u8>, CasMatchError> {
        let mut w = XmlOut::new()?;
        w.start("Types", &[("xmlns", NS_CONTENT_TYPES)])?;
        w.empty(
            "Default",
            &[
                ("Extension", "rels"),
                ("ContentType", "application/vnd.openxmlformats-package.relationships+xml"),
            ],
        )?;
        w.empty("Default", &[("Extension", "xml"), ("ContentType", "application/xml")])?;
        w.empty(
            "Override",
            &[("PartName", "/xl/workbook.xml"), ("ContentType", CT_WORKBOOK)],
        )?;
        w.empty(
            "Override",
            &[("PartName", "/xl/styles.xml"), ("ContentType", CT_STYLES)],
        )?;
        for i in 1..=self.sheets.len() {
            let part = format!("/xl/worksheets/sheet{i}.xml");
            w.empty("Override", &[("PartName", part.as_str()), ("ContentType", CT_WORKSHEET)])?;
        }
        w.end("Types")?;
        Ok(w.finish())
    }

    fn workbook_xml(&self) -> Result<Vec<u8>, CasMatchError> {
        let mut w = XmlOut::new()?;
        w.start("workbook", &[("xmlns", NS_MAIN), ("xmlns:r", NS_REL)])?;
        w.start("sheets", &[])?;
        for (i, sheet) in self.sheets.iter().enumerate() {
            let id = (i + 1).to_string();
            let rel = format!("rId{}", i + 1);
            w.empty(
                "sheet",
                &[("name", sheet.name.as_str()), ("sheetId", id.as_str()), ("r:id", rel.as_str())],
            )?;
        }
        w.end("sheets")?;
        w.end("workbook")?;
        Ok(w.finish())
    }

    fn workbook_rels_xml(&self) -> Result<Vec<u8>, CasMatchError> {
        let mut w = XmlOut::new()?;
        w.start("Relationships", &[("xmlns", NS_PKG_REL)])?;
        for i in 1..=self.sheets.len() {
            let id = format!("rId{i}");
            let target = format!("worksheets/sheet{i}.xml");
            w.empty(
                "Relationship",
                &[("Id", id.as_str()), ("Type", REL_WORKSHEET), ("Target", target.as_str())],
            )?;
        }
        let styles_id = format!("rId{}", self.sheets.len() + 1);
        w.empty(
            "Relationship",
            &[("Id", styles_id.as_str()), ("Type", REL_STYLES), ("Target", "styles.xml")],
        )?;
        w.end("Relationships")?;
        Ok(w.finish())
    }
}

fn root_rels_xml() -> Result<Vec<u8>, CasMatchError> {
    let mut w = XmlOut::new()?;
    w.start("Relationships", &[("xmlns", NS_PKG_REL)])?;
    w.empty(
        "Relationship",
        &[("Id", "rId1"), ("Type", REL_DOCUMENT), ("Target", "xl/workbook.xml")],
    )?;
    w.end("Relationships")?;
    Ok(w.finish())
}

fn worksheet_xml(sheet: &Sheet) -> Result<Vec<u8>, CasMatchError> {
    let widths = sheet.column_widths();
    let mut w = XmlOut::new()?;
    w.start("worksheet", &[("xmlns", NS_MAIN), ("xmlns:r", NS_REL)])?;

    let last_col = widths.len().max(1);
    let last_row = sheet.rows.len().max(1);
    let dimension = format!("A1:{}{}", column_name(last_col - 1), last_row);
    w.empty("dimension", &[("ref", dimension.as_str())])?;

    if !widths.is_empty() {
        w.start("cols", &[])?;
        for (i, width) in widths.iter().enumerate() {
            let index = (i + 1).to_string();
            let width = width.to_string();
            w.empty(
                "col",
                &[
                    ("min", index.as_str()),
                    ("max", index.as_str()),
                    ("width", width.as_str()),
                    ("customWidth", "1"),
                ],
            )?;
        }
        w.end("cols")?;
    }

    w.start("sheetData", &[])?;
    for (r, row) in sheet.rows.iter().enumerate() {
        let row_ref = (r + 1).to_string();
        w.start("row", &[("r", row_ref.as_str())])?;
        for (c, cell) in row.iter().enumerate() {
            let cell_ref = format!("{}{}", column_name(c), r + 1);
            match cell {
                Cell::Text(text) => {
                    w.start("c", &[("r", cell_ref.as_str()), ("t", "inlineStr")])?;
                    w.start("is", &[])?;
                    w.start("t", &[("xml:space", "preserve")])?;
                    w.text(text)?;
                    w.end("t")?;
                    w.end("is")?;
                }
                Cell::Number(n) => {
                    w.start("c", &[("r", cell_ref.as_str())])?;
                    w.start("v", &[])?;
                    w.text(&n.to_string())?;
                    w.end("v")?;
                }
            }
            w.end("c")?;
        }
        w.end("row")?;
    }
    w.end("sheetData")?;
    w.end("worksheet")?;
    Ok(w.finish())
}

/// Spreadsheet column letters for a zero-based index (0 → A, 26 → AA).
pub fn column_name(index: usize) -> String {
    let mut n = index + 1;
    let mut name = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        name.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    name.reverse();
    String::from_utf8_lossy(&name).into_owned()
}

struct XmlOut {
    writer: Writer<Cursor<Vec<u8>>>,
}

impl XmlOut {
    fn new() -> Result<Self, CasMatchError> {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))
            .map_err(xml_error)?;
        Ok(XmlOut { writer })
    }

    fn start(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), CasMatchError> {
        let mut tag = BytesStart::new(name);
        tag.extend_attributes(attrs.iter().copied());
        self.writer.write_event(Event::Start(tag)).map_err(xml_error)
    }

    fn empty(&mut self, name: &str, attrs: &[(&str, &str)]) -> Result<(), CasMatchError> {
        let mut tag = BytesStart::new(name);
        tag.extend_attributes(attrs.iter().copied());
        self.writer.write_event(Event::Empty(tag)).map_err(xml_error)
    }

    fn text(&mut self, text: &str) -> Result<(), CasMatchError> {
        self.writer
            .write_event(Event::Text(BytesText::new(text)))
            .map_err(xml_error)
    }

    fn end(&mut self, name: &str) -> Result<(), CasMatchError> {
        self.writer
            .write_event(Event::End(BytesEnd::new(name)))
            .map_err(xml_error)
    }

    fn finish(self) -> Vec<u8> {
        self.writer.into_inner().into_inner()
    }
}

fn xml_error(e: impl std::fmt::Display) -> CasMatchError {
    CasMatchError::ReportWrite(format!("xml: {e}"))
}

fn zip_error(e: zip::result::ZipError) -> CasMatchError {
    CasMatchError::ReportWrite(format!("zip: {e}"))
}
