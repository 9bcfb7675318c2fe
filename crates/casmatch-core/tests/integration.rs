//! Integration tests for the extract → match → report pipeline.
//!
//! Uses a MockExtractor that returns pre-built PageContent without
//! invoking pdftotext, and builds DOCX fixtures in memory.

use std::io::{Cursor, Write};

use calamine::{open_workbook, Data, Reader, Xlsx};
use casmatch_core::batch::process_batch;
use casmatch_core::error::CasMatchError;
use casmatch_core::extraction::pdftotext::PdftotextExtractor;
use casmatch_core::extraction::{PageContent, PdfExtractor};
use casmatch_core::match_document;
use casmatch_core::model::{
    ChemicalName, DocumentKind, LeveledRecord, MatchResult, ReferenceEntry, ReferenceList,
    SourceDocument,
};
use casmatch_core::naming::{matching_listing, OutputKey};
use casmatch_core::report::{DirectorySink, ReportSink, SUMMARY_SHEET, TOTAL_SHEET};
use casmatch_core::store::ReferenceStore;
use casmatch_core::xlsx::{Sheet, Workbook};
use zip::write::SimpleFileOptions;
use zip::ZipWriter;

struct MockExtractor {
    pages: Vec<PageContent>,
}

impl PdfExtractor for MockExtractor {
    fn extract_pages(&self, _pdf_bytes: &[u8]) -> Result<Vec<PageContent>, CasMatchError> {
        Ok(self.pages.clone())
    }

    fn backend_name(&self) -> &str {
        "mock"
    }
}

fn no_pdf() -> MockExtractor {
    MockExtractor { pages: vec![] }
}

fn page(number: usize, lines: &[&str]) -> PageContent {
    PageContent {
        page_number: number,
        lines: lines.iter().map(|s| s.to_string()).collect(),
    }
}

/// Build a .docx with one table per entry of `tables`.
fn docx(tables: &[&[&[&str]]]) -> Vec<u8> {
    let mut body = String::new();
    for table in tables {
        body.push_str("<w:tbl>");
        for row in table.iter() {
            body.push_str("<w:tr>");
            for cell in row.iter() {
                body.push_str(&format!(
                    "<w:tc><w:p><w:r><w:t xml:space=\"preserve\">{cell}</w:t></w:r></w:p></w:tc>"
                ));
            }
            body.push_str("</w:tr>");
        }
        body.push_str("</w:tbl><w:p/>");
    }
    let xml = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>{body}</w:body></w:document>"#
    );

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    zip.start_file("word/document.xml", SimpleFileOptions::default())
        .unwrap();
    zip.write_all(xml.as_bytes()).unwrap();
    zip.finish().unwrap().into_inner()
}

fn water_reference() -> ReferenceList {
    ReferenceList {
        name: "processed_Std.xlsx".into(),
        entries: vec![ReferenceEntry::new("7732-18-5", "Water")],
    }
}

/// Sink that keeps reports in memory.
#[derive(Default)]
struct MemorySink {
    written: Vec<(OutputKey, MatchResult)>,
}

impl ReportSink for MemorySink {
    fn write(&mut self, key: &OutputKey, result: &MatchResult) -> Result<(), CasMatchError> {
        self.written.push((key.clone(), result.clone()));
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Test 1: The water scenario: ancestor row kept above the single match
// ---------------------------------------------------------------------------
#[test]
fn docx_end_to_end_water() {
    let bytes = docx(&[&[
        &["Level", "Substance Name", "CAS Number"],
        &["1", "Group", "0-0-0"],
        &["|2|", "Water", " 7732-18-5 "],
    ]]);
    let doc = SourceDocument::new("report.docx", DocumentKind::Tabular, bytes);
    let reference = water_reference();

    let result = match_document(&doc, &reference.entries, &no_pdf()).unwrap();
    assert_eq!(result.full_table.len(), 2);
    assert_eq!(result.match_count, 1);
    assert_eq!(result.summary.len(), 2);
    assert_eq!(result.summary[0].record, LeveledRecord::new(1, "Group", "0-0-0"));
    assert_eq!(
        result.summary[1].chemical_name,
        ChemicalName::Matched("Water".into())
    );

    let key = OutputKey::derive(&reference.name, result.match_count, &doc.name).unwrap();
    assert_eq!(key.file_name(), "Std&1&report.xlsx");
}

// ---------------------------------------------------------------------------
// Test 2: Paginated document: tables concatenated across pages
// ---------------------------------------------------------------------------
#[test]
fn pdf_tables_concatenate_in_page_order() {
    let extractor = MockExtractor {
        pages: vec![
            page(
                1,
                &[
                    "Material Declaration",
                    "Level   Substance Name     CAS Number",
                    "1       Connector          ---",
                    "2       Brass              ---",
                    "",
                    "Page 1",
                ],
            ),
            page(2, &["No tables on this page"]),
            page(
                3,
                &[
                    "| 3 | Lead  | 7439-92-1 |",
                    "| 3 | Copper | 7440-50-8 |",
                    "",
                    "1   Cable   N/A",
                ],
            ),
        ],
    };
    let reference = ReferenceList {
        name: "processed_RoHS.xlsx".into(),
        entries: vec![
            ReferenceEntry::new("7439-92-1", "Lead"),
            ReferenceEntry::new("7439-92-1", "Lead (second listing)"),
        ],
    };
    let doc = SourceDocument::new("mds.pdf", DocumentKind::Paginated, vec![]);

    let result = match_document(&doc, &reference.entries, &extractor).unwrap();
    let names: Vec<&str> = result
        .records
        .iter()
        .map(|r| r.record.substance_name.as_str())
        .collect();
    assert_eq!(names, vec!["Connector", "Brass", "Lead", "Copper", "Cable"]);
    assert_eq!(result.match_count, 1);
    assert_eq!(
        result.records[2].chemical_name,
        ChemicalName::Matched("Lead".into())
    );
    // "---" and "N/A" are not CAS-shaped
    assert_eq!(result.full_table.len(), 2);
    let summary: Vec<&str> = result
        .summary
        .iter()
        .map(|r| r.record.substance_name.as_str())
        .collect();
    assert_eq!(summary, vec!["Connector", "Brass", "Lead"]);
}

// ---------------------------------------------------------------------------
// Test 3: No leveled rows is an extraction error, for both formats
// ---------------------------------------------------------------------------
#[test]
fn empty_extraction_is_an_error() {
    let doc = SourceDocument::new(
        "blank.docx",
        DocumentKind::Tabular,
        docx(&[&[&["Part", "Weight"]]]),
    );
    let err = match_document(&doc, &water_reference().entries, &no_pdf()).unwrap_err();
    assert!(matches!(err, CasMatchError::EmptyExtraction(_)));

    let pdf = SourceDocument::new("blank.pdf", DocumentKind::Paginated, vec![]);
    let extractor = MockExtractor {
        pages: vec![page(1, &["Cover page"])],
    };
    let err = match_document(&pdf, &water_reference().entries, &extractor).unwrap_err();
    assert!(matches!(err, CasMatchError::EmptyExtraction(_)));
}

// ---------------------------------------------------------------------------
// Test 4: Batch isolates per-document failures and collisions
// ---------------------------------------------------------------------------
#[test]
fn batch_continues_past_failures() {
    let good = docx(&[&[&["1", "Coolant", "7732-18-5"]]]);
    let documents = vec![
        SourceDocument::new("a.docx", DocumentKind::Tabular, good.clone()),
        SourceDocument::new("broken.docx", DocumentKind::Tabular, b"garbage".to_vec()),
        SourceDocument::new("a.v2.docx", DocumentKind::Tabular, good.clone()),
        SourceDocument::new("R&D.docx", DocumentKind::Tabular, good),
        SourceDocument::new(
            "b.docx",
            DocumentKind::Tabular,
            docx(&[&[&["1", "Steel", "12597-69-2"]]]),
        ),
    ];
    let mut sink = MemorySink::default();

    let outcome = process_batch(&water_reference(), &documents, &no_pdf(), &mut sink).unwrap();

    let keys: Vec<String> = outcome.index.iter().map(|k| k.file_name()).collect();
    assert_eq!(keys, vec!["Std&1&a.xlsx", "Std&0&b.xlsx"]);
    assert_eq!(sink.written.len(), 2);

    let failed: Vec<&str> = outcome.failures.iter().map(|f| f.document.as_str()).collect();
    assert_eq!(failed, vec!["broken.docx", "a.v2.docx", "R&D.docx"]);
    assert!(matches!(
        outcome.failures[0].error,
        CasMatchError::DocumentRead(_)
    ));
    assert!(matches!(
        outcome.failures[1].error,
        CasMatchError::OutputKeyCollision(_)
    ));
    assert!(matches!(
        outcome.failures[2].error,
        CasMatchError::InvalidName(_)
    ));

    let listing = matching_listing(keys.iter());
    assert_eq!(listing.len(), 1);
    assert_eq!(listing[0].filename, "a");
}

// ---------------------------------------------------------------------------
// Test 5: Empty reference list aborts the whole batch
// ---------------------------------------------------------------------------
#[test]
fn batch_aborts_on_empty_reference() {
    let reference = ReferenceList {
        name: "processed_Empty.xlsx".into(),
        entries: vec![],
    };
    let documents = vec![SourceDocument::new(
        "a.docx",
        DocumentKind::Tabular,
        docx(&[&[&["1", "Coolant", "7732-18-5"]]]),
    )];
    let mut sink = MemorySink::default();
    let err = process_batch(&reference, &documents, &no_pdf(), &mut sink).unwrap_err();
    assert!(matches!(err, CasMatchError::Schema(_)));
    assert!(sink.written.is_empty());
}

// ---------------------------------------------------------------------------
// Test 6: Reference store → batch → output directory, read back with calamine
// ---------------------------------------------------------------------------
#[test]
fn store_batch_and_directory_sink() {
    let tmp = tempfile::tempdir().unwrap();

    let mut sheet = Sheet::new("Candidates");
    sheet.push_row(vec!["Entry".into(), "Chemical Name".into(), "CAS Number".into()]);
    sheet.push_row(vec!["1".into(), "Lead".into(), "7439-92-1".into()]);
    sheet.push_row(vec!["2".into(), "Solvents".into(), "64-17-5, 67-56-1,".into()]);
    let mut upload = Workbook::new();
    upload.add_sheet(sheet);

    let store = ReferenceStore::open(tmp.path().join("standards")).unwrap();
    let added = store
        .add("SVHC.xlsx", &upload.to_bytes().unwrap())
        .unwrap();
    assert_eq!(added.name, "processed_SVHC.xlsx");
    assert_eq!(
        added.entries,
        vec![
            ReferenceEntry::new("7439-92-1", "Lead"),
            ReferenceEntry::new("64-17-5", "Solvents"),
            ReferenceEntry::new("67-56-1", "Solvents"),
        ]
    );
    assert_eq!(store.names().unwrap(), vec!["processed_SVHC.xlsx"]);

    let reference = store.load("processed_SVHC.xlsx").unwrap();
    assert_eq!(reference.entries, added.entries);

    let documents = vec![SourceDocument::new(
        "cable.docx",
        DocumentKind::Tabular,
        docx(&[
            &[&["1", "Cable", "---"], &["2", "Jacket", ""]],
            &[&["3", "Ethanol", "64-17-5"]],
        ]),
    )];
    let mut sink = DirectorySink::new(tmp.path().join("outputs")).unwrap();
    let outcome = process_batch(&reference, &documents, &no_pdf(), &mut sink).unwrap();
    assert!(outcome.failures.is_empty());
    assert_eq!(outcome.index[0].file_name(), "SVHC&1&cable.xlsx");

    let mut xlsx: Xlsx<_> = open_workbook(sink.path_for(&outcome.index[0])).unwrap();
    assert_eq!(xlsx.sheet_names(), vec![TOTAL_SHEET, SUMMARY_SHEET]);

    let total = xlsx.worksheet_range(TOTAL_SHEET).unwrap();
    assert_eq!(total.height(), 2);
    assert_eq!(
        total.get_value((1, 3)),
        Some(&Data::String("Solvents".into()))
    );

    let summary = xlsx.worksheet_range(SUMMARY_SHEET).unwrap();
    assert_eq!(summary.height(), 4);
    assert_eq!(
        summary.get_value((1, 1)),
        Some(&Data::String("Cable".into()))
    );
    assert_eq!(summary.get_value((2, 3)), Some(&Data::String("---".into())));
}

// ---------------------------------------------------------------------------
// Test 7: Reference list without the required columns
// ---------------------------------------------------------------------------
#[test]
fn reference_missing_column_is_schema_error() {
    let tmp = tempfile::tempdir().unwrap();
    let mut sheet = Sheet::new("Sheet1");
    sheet.push_row(vec!["CAS".into(), "Chemical Name".into()]);
    sheet.push_row(vec!["7439-92-1".into(), "Lead".into()]);
    let mut upload = Workbook::new();
    upload.add_sheet(sheet);

    let store = ReferenceStore::open(tmp.path()).unwrap();
    let err = store.add("Bad.xlsx", &upload.to_bytes().unwrap()).unwrap_err();
    match err {
        CasMatchError::Schema(msg) => assert!(msg.contains("CAS Number")),
        other => panic!("expected schema error, got {other:?}"),
    }
    assert!(store.names().unwrap().is_empty());
}

// ---------------------------------------------------------------------------
// Test 8: Corrupt PDF fails as a document read error, batch continues
// ---------------------------------------------------------------------------
#[test]
fn corrupt_pdf_is_a_per_document_read_failure() {
    let documents = vec![
        SourceDocument::new("scan.pdf", DocumentKind::Paginated, b"garbage".to_vec()),
        SourceDocument::new(
            "a.docx",
            DocumentKind::Tabular,
            docx(&[&[&["1", "Coolant", "7732-18-5"]]]),
        ),
    ];
    let mut sink = MemorySink::default();

    let outcome = process_batch(
        &water_reference(),
        &documents,
        &PdftotextExtractor::new(),
        &mut sink,
    )
    .unwrap();

    assert_eq!(outcome.index.len(), 1);
    assert_eq!(outcome.failures.len(), 1);
    assert_eq!(outcome.failures[0].document, "scan.pdf");
    assert!(matches!(
        outcome.failures[0].error,
        CasMatchError::DocumentRead(_)
    ));
}

// ---------------------------------------------------------------------------
// Test 9: Blank substance name in a laid-out PDF row still matches
// ---------------------------------------------------------------------------
#[test]
fn pdf_blank_name_cell_keeps_cas_column() {
    let pdf = SourceDocument::new("mds.pdf", DocumentKind::Paginated, vec![]);
    let extractor = MockExtractor {
        pages: vec![page(
            1,
            &[
                "1       Housing            ---",
                "2                          7439-92-1",
            ],
        )],
    };
    let reference = vec![ReferenceEntry::new("7439-92-1", "Lead")];

    let result = match_document(&pdf, &reference, &extractor).unwrap();
    assert_eq!(result.match_count, 1);
    assert_eq!(result.records[1].record, LeveledRecord::new(2, "", "7439-92-1"));
    assert_eq!(
        result.records[1].chemical_name,
        ChemicalName::Matched("Lead".into())
    );
}
