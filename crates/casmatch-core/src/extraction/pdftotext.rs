use crate::error::CasMatchError;
use crate::extraction::{PageContent, PdfExtractor};
use std::io::Write;
use std::process::Command;

const INSTALL_HINT: &str =
    "Install poppler: brew install poppler (macOS) or apt install poppler-utils (Linux)";

/// PDF extraction backend using pdftotext (from poppler-utils).
///
/// Uses `pdftotext -layout` so that table columns stay aligned with
/// whitespace, which is what table detection works from.
pub struct PdftotextExtractor;

impl PdftotextExtractor {
    pub fn new() -> Self {
        PdftotextExtractor
    }

    /// Check if pdftotext is available on the system.
    pub fn is_available() -> bool {
        Command::new("pdftotext")
            .arg("-v")
            .output()
            .map(|o| o.status.success() || !o.stderr.is_empty())
            .unwrap_or(false)
    }
}

impl Default for PdftotextExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfExtractor for PdftotextExtractor {
    fn extract_pages(&self, pdf_bytes: &[u8]) -> Result<Vec<PageContent>, CasMatchError> {
        // The temp file is removed when `tmpfile` drops at the end of this call.
        let mut tmpfile =
            tempfile::NamedTempFile::new().map_err(|e| CasMatchError::DocumentRead(e.to_string()))?;
        tmpfile
            .write_all(pdf_bytes)
            .map_err(|e| CasMatchError::DocumentRead(e.to_string()))?;

        let output = Command::new("pdftotext")
            .arg("-layout")
            .arg(tmpfile.path())
            .arg("-") // output to stdout
            .output()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    CasMatchError::DocumentRead(format!("pdftotext not found. {INSTALL_HINT}"))
                } else {
                    CasMatchError::DocumentRead(format!("pdftotext failed: {}", e))
                }
            })?;

        if !output.status.success() {
            let code = output.status.code().unwrap_or(-1);
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CasMatchError::DocumentRead(format!(
                "pdftotext failed with exit code {code}: {}",
                stderr.trim()
            )));
        }

        Ok(split_pages(&String::from_utf8_lossy(&output.stdout)))
    }

    fn backend_name(&self) -> &str {
        "pdftotext"
    }
}

/// Split pdftotext output into pages on the form feed separator.
///
/// pdftotext terminates every page with `\x0c`, so the empty trailing
/// chunk is dropped.
pub fn split_pages(text: &str) -> Vec<PageContent> {
    let mut chunks: Vec<&str> = text.split('\x0c').collect();
    if chunks.len() > 1 && chunks.last().is_some_and(|c| c.trim().is_empty()) {
        chunks.pop();
    }
    chunks
        .into_iter()
        .enumerate()
        .map(|(i, page_text)| PageContent {
            page_number: i + 1,
            lines: page_text.lines().map(|l| l.to_string()).collect(),
        })
        .collect()
}
