//! Text extraction for keyword scanning.
//!
//! Handles two file categories:
//! - plain text (`.txt`, `.csv`): lossy UTF-8 read
//! - PDF: PDFium native text layer (no rendering, no OCR)
//!
//! PDFium is a runtime-loaded library. When it cannot be found, or PDF
//! scanning is switched off in configuration, PDF input reports
//! `FeatureUnavailable`.

use std::path::Path;

use pdfium_render::prelude::*;
use thiserror::Error;
use tracing::debug;

use crate::keywords::extract_keywords;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unsupported format for extraction: {0}")]
    UnsupportedFormat(String),

    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("PDF is password-protected")]
    PdfEncrypted,

    #[error("{0} is unavailable")]
    FeatureUnavailable(String),

    #[error("No text could be extracted from {0}")]
    NoContent(String),
}

/// Turns a document on disk into plain text.
pub trait TextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, ExtractionError>;
}

/// Dispatches on file extension: `.txt`/`.csv` read directly, `.pdf` via PDFium.
pub struct FileTextExtractor {
    pdf_enabled: bool,
}

impl FileTextExtractor {
    pub fn new(pdf_enabled: bool) -> Self {
        Self { pdf_enabled }
    }
}

impl TextExtractor for FileTextExtractor {
    fn extract_text(&self, path: &Path) -> Result<String, ExtractionError> {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "txt" | "csv" => {
                let bytes = std::fs::read(path)?;
                debug!(path = %path.display(), bytes = bytes.len(), "Read plain text file");
                Ok(String::from_utf8_lossy(&bytes).into_owned())
            }
            "pdf" => {
                if !self.pdf_enabled {
                    return Err(ExtractionError::FeatureUnavailable(
                        "PDF scanning (disabled in configuration)".into(),
                    ));
                }
                let bytes = std::fs::read(path)?;
                extract_pdf_text_layer(&bytes)
            }
            _ => Err(ExtractionError::UnsupportedFormat(path.display().to_string())),
        }
    }
}

/// Extract text, then derive candidate product keywords from it.
///
/// Blank extracted text is an error; text without any candidates yields an
/// empty list.
pub fn scan_file(extractor: &dyn TextExtractor, path: &Path) -> Result<Vec<String>, ExtractionError> {
    let text = extractor.extract_text(path)?;
    if text.trim().is_empty() {
        return Err(ExtractionError::NoContent(path.display().to_string()));
    }
    let keywords = extract_keywords(&text);
    tracing::info!(path = %path.display(), keywords = keywords.len(), "File scanned for keywords");
    Ok(keywords)
}

fn extract_pdf_text_layer(pdf_bytes: &[u8]) -> Result<String, ExtractionError> {
    let pdfium = load_pdfium()?;
    let document = pdfium
        .load_pdf_from_byte_slice(pdf_bytes, None)
        .map_err(map_load_error)?;

    let mut text = String::new();
    for page in document.pages().iter() {
        if let Ok(page_text) = page.text() {
            text.push_str(&page_text.all());
            text.push('\n');
        }
    }
    debug!(pages = document.pages().len(), chars = text.len(), "Extracted PDF text layer");
    Ok(text)
}

/// Load the PDFium dynamic library.
///
/// Discovery order:
/// 1. `PDFIUM_DYNAMIC_LIB_PATH` env var (explicit path)
/// 2. Alongside the running executable
/// 3. System library search paths
fn load_pdfium() -> Result<Pdfium, ExtractionError> {
    if let Ok(path) = std::env::var("PDFIUM_DYNAMIC_LIB_PATH") {
        debug!(path = %path, "Loading PDFium from env var");
        let bindings = Pdfium::bind_to_library(&path).map_err(|e| {
            ExtractionError::FeatureUnavailable(format!("PDF scanning (cannot load PDFium from {path}: {e})"))
        })?;
        return Ok(Pdfium::new(bindings));
    }

    if let Some(exe_dir) = std::env::current_exe().ok().and_then(|exe| exe.parent().map(Path::to_path_buf)) {
        let lib_path = Pdfium::pdfium_platform_library_name_at_path(exe_dir.to_string_lossy().as_ref());
        if let Ok(bindings) = Pdfium::bind_to_library(&lib_path) {
            debug!(dir = %exe_dir.display(), "Loaded PDFium next to executable");
            return Ok(Pdfium::new(bindings));
        }
    }

    let bindings = Pdfium::bind_to_system_library().map_err(|e| {
        ExtractionError::FeatureUnavailable(format!(
            "PDF scanning (PDFium not found; set PDFIUM_DYNAMIC_LIB_PATH: {e})"
        ))
    })?;
    Ok(Pdfium::new(bindings))
}

/// Map PDF load errors: detect encrypted PDFs for a clearer message.
fn map_load_error(e: PdfiumError) -> ExtractionError {
    let msg = e.to_string();
    let lower = msg.to_lowercase();
    if lower.contains("password") || lower.contains("encrypt") {
        ExtractionError::PdfEncrypted
    } else {
        ExtractionError::PdfParsing(msg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_file(dir: &tempfile::TempDir, name: &str, content: &[u8]) -> PathBuf {
        let path = dir.path().join(name);
        std::fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn plain_text_read_lossily() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "notes.TXT", b"Model: Aurora X1\n\xff broken byte");
        let text = FileTextExtractor::new(true).extract_text(&path).unwrap();
        assert!(text.starts_with("Model: Aurora X1"));
        assert!(text.contains('\u{fffd}'));
    }

    #[test]
    fn csv_read_as_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "list.csv", b"name,products\nHelios,Panels\n");
        let text = FileTextExtractor::new(false).extract_text(&path).unwrap();
        assert!(text.contains("Helios"));
    }

    #[test]
    fn unsupported_extension_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "image.png", b"\x89PNG");
        let err = FileTextExtractor::new(true).extract_text(&path).unwrap_err();
        assert!(matches!(err, ExtractionError::UnsupportedFormat(_)));
    }

    #[test]
    fn pdf_disabled_is_feature_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "sheet.pdf", b"%PDF-1.4");
        let err = FileTextExtractor::new(false).extract_text(&path).unwrap_err();
        assert!(matches!(err, ExtractionError::FeatureUnavailable(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = FileTextExtractor::new(true)
            .extract_text(&dir.path().join("absent.txt"))
            .unwrap_err();
        assert!(matches!(err, ExtractionError::Io(_)));
    }

    #[test]
    fn scan_file_returns_keywords() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "datasheet.txt", b"Product: SolarMax 3000 (v2)\nmade by Helios");
        let kws = scan_file(&FileTextExtractor::new(false), &path).unwrap();
        assert!(kws.contains(&"SolarMax 3000".to_string()));
        assert!(kws.contains(&"Helios".to_string()));
    }

    #[test]
    fn scan_blank_file_is_no_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "blank.txt", b"  \n\t\n");
        let err = scan_file(&FileTextExtractor::new(false), &path).unwrap_err();
        assert!(matches!(err, ExtractionError::NoContent(_)));
    }

    struct FixedText(&'static str);

    impl TextExtractor for FixedText {
        fn extract_text(&self, _path: &Path) -> Result<String, ExtractionError> {
            Ok(self.0.to_string())
        }
    }

    #[test]
    fn scan_file_uses_any_extractor() {
        let kws = scan_file(&FixedText("Type: Flywheel Storage"), Path::new("virtual.pdf")).unwrap();
        assert_eq!(kws[0], "Flywheel Storage");
    }
}
