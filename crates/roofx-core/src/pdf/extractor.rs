//! In-process PDF text extraction using lopdf and pdf-extract.

use std::fs;
use std::panic::{self, AssertUnwindSafe};
use std::path::Path;

use lopdf::Document;
use tracing::{debug, trace, warn};

use super::{ensure_text, source_id, Result, TextExtractor};
use crate::error::{ExtractionCause, ExtractionFailure};

/// PDF text extractor.
///
/// lopdf validates the document (page count, encryption) before pdf-extract
/// produces the text layer.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfTextExtractor;

impl PdfTextExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self
    }

    /// Extract text from PDF bytes.
    pub fn extract_from_mem(&self, data: &[u8]) -> std::result::Result<String, ExtractionCause> {
        let raw_data = load_document(data)?;

        // pdf-extract unwraps on malformed fonts and content streams
        let result = panic::catch_unwind(AssertUnwindSafe(|| {
            pdf_extract::extract_text_from_mem(&raw_data)
        }));

        match result {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => Err(ExtractionCause::Text(e.to_string())),
            Err(payload) => {
                let message = panic_message(&*payload);
                warn!("pdf-extract panicked: {}", message);
                Err(ExtractionCause::Panicked(message))
            }
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Validate the document and return bytes pdf-extract can read.
fn load_document(data: &[u8]) -> std::result::Result<Vec<u8>, ExtractionCause> {
    let mut doc = Document::load_mem(data).map_err(|e| ExtractionCause::Parse(e.to_string()))?;

    let raw_data = if doc.is_encrypted() {
        // Reports are sometimes "protected" with an empty user password
        if doc.decrypt("").is_err() {
            return Err(ExtractionCause::Encrypted);
        }
        debug!("Decrypted PDF with empty password");

        let mut decrypted = Vec::new();
        doc.save_to(&mut decrypted)
            .map_err(|e| ExtractionCause::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
        decrypted
    } else {
        data.to_vec()
    };

    let page_count = doc.get_pages().len();
    if page_count == 0 {
        return Err(ExtractionCause::NoPages);
    }

    trace!("Loaded PDF with {} pages", page_count);
    Ok(raw_data)
}

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        let data = fs::read(path)
            .map_err(|e| ExtractionFailure::new(source_id(path), ExtractionCause::Io(e.to_string())))?;

        let text = self
            .extract_from_mem(&data)
            .map_err(|cause| ExtractionFailure::new(source_id(path), cause))?;

        debug!("Extracted {} chars from {}", text.len(), path.display());
        ensure_text(text, path)
    }

    fn name(&self) -> &'static str {
        "pdf-extract"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{dictionary, Dictionary, Object, Stream};
    use std::path::PathBuf;

    use crate::batch::BatchAggregator;
    use crate::report::ReportParser;

    /// Build a single-page PDF showing `text` in Helvetica.
    fn make_test_pdf(text: &str) -> Vec<u8> {
        make_pdf_with_font(
            dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => "Helvetica",
            },
            text,
        )
    }

    /// A font dictionary without `/Subtype`, which lopdf accepts but
    /// pdf-extract cannot handle.
    fn make_broken_font_pdf() -> Vec<u8> {
        make_pdf_with_font(
            dictionary! {
                "Type" => "Font",
                "BaseFont" => "Helvetica",
            },
            "Total Eaves =120 ft",
        )
    }

    fn make_pdf_with_font(font: Dictionary, text: &str) -> Vec<u8> {
        let mut doc = Document::with_version("1.4");

        let font_id = doc.add_object(font);

        let content = format!("BT /F1 12 Tf 100 700 Td ({text}) Tj ET");
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.into_bytes()));

        let resources = dictionary! {
            "Font" => dictionary! {
                "F1" => font_id,
            },
        };

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
            "Contents" => content_id,
            "Resources" => resources,
        });

        let pages_id = doc.add_object(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        });

        if let Ok(Object::Dictionary(dict)) = doc.get_object_mut(page_id) {
            dict.set("Parent", pages_id);
        }

        let catalog_id = doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        doc.trailer.set("Root", catalog_id);

        let mut buf = Vec::new();
        doc.save_to(&mut buf).unwrap();
        buf
    }

    #[test]
    fn test_extract_text_from_digital_pdf() {
        let pdf = make_test_pdf("Predominant Pitch =6/12");
        let text = PdfTextExtractor::new().extract_from_mem(&pdf).unwrap();

        assert!(
            text.contains("Predominant") || text.contains("Pitch"),
            "unexpected text: {text:?}"
        );
    }

    #[test]
    fn test_invalid_pdf_is_parse_failure() {
        let err = PdfTextExtractor::new().extract_from_mem(b"not a pdf").unwrap_err();
        assert!(matches!(err, ExtractionCause::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.pdf");

        let err = PdfTextExtractor::new().extract(&path).unwrap_err();
        assert_eq!(err.source_id, "missing.pdf");
        assert!(matches!(err.cause, ExtractionCause::Io(_)));
    }

    #[test]
    fn test_extract_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.pdf");
        std::fs::write(&path, make_test_pdf("Total Eaves =120 ft")).unwrap();

        let text = PdfTextExtractor::new().extract(&path).unwrap();
        assert!(text.contains("Eaves"), "unexpected text: {text:?}");
    }

    #[test]
    fn test_malformed_font_is_failure_not_panic() {
        let err = PdfTextExtractor::new()
            .extract_from_mem(&make_broken_font_pdf())
            .unwrap_err();
        assert!(
            matches!(err, ExtractionCause::Panicked(_) | ExtractionCause::Text(_)),
            "unexpected cause: {err:?}"
        );
    }

    #[test]
    fn test_malformed_pdf_does_not_stop_batch() {
        let dir = tempfile::tempdir().unwrap();
        let docs: [(&str, Vec<u8>); 3] = [
            ("a.pdf", make_test_pdf("Total Valleys =10 ft")),
            ("b.pdf", make_broken_font_pdf()),
            ("c.pdf", make_test_pdf("Total Valleys =30 ft")),
        ];
        let paths: Vec<PathBuf> = docs
            .iter()
            .map(|(name, data)| {
                let path = dir.path().join(name);
                std::fs::write(&path, data).unwrap();
                path
            })
            .collect();

        let aggregator = BatchAggregator::new(PdfTextExtractor::new(), ReportParser::new());
        let outcome = aggregator.run(&paths);

        let ids: Vec<&str> = outcome.dataset.iter().map(|r| r.source_id()).collect();
        assert_eq!(ids, vec!["a.pdf", "c.pdf"]);
        assert_eq!(outcome.summary.skipped, 1);
        assert_eq!(outcome.summary.failures[0].source_id, "b.pdf");
    }
}
