//! Document-to-text conversion.

mod command;
mod extractor;

pub use command::CommandExtractor;
pub use extractor::PdfTextExtractor;

use std::path::Path;

use crate::error::{ExtractionCause, ExtractionFailure};
use crate::models::config::{ExtractionConfig, ExtractorBackend};

/// Result type for text extraction.
pub type Result<T> = std::result::Result<T, ExtractionFailure>;

/// Converts one document into plain text.
///
/// Implementations report every failure as an [`ExtractionFailure`] and never
/// retry.
pub trait TextExtractor {
    /// Extract the full text of the document at `path`.
    fn extract(&self, path: &Path) -> Result<String>;

    /// Short backend name for logs.
    fn name(&self) -> &'static str;
}

impl<T: TextExtractor + ?Sized> TextExtractor for Box<T> {
    fn extract(&self, path: &Path) -> Result<String> {
        (**self).extract(path)
    }

    fn name(&self) -> &'static str {
        (**self).name()
    }
}

/// Build the extractor selected by the configuration.
pub fn create_extractor(config: &ExtractionConfig) -> Box<dyn TextExtractor> {
    match config.backend {
        ExtractorBackend::Pdf => Box::new(PdfTextExtractor::new()),
        ExtractorBackend::Command => Box::new(
            CommandExtractor::new(config.command.clone()).with_timeout(config.timeout_secs),
        ),
    }
}

/// Identifier used for a document in records and failure reports: its file
/// name, or the whole path when it has none.
pub fn source_id(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Reject conversions that produced no text at all.
///
/// Whitespace-only output (a lone form feed for an image-only page) is kept,
/// so the document still yields a row of not-found fields.
fn ensure_text(text: String, path: &Path) -> Result<String> {
    if text.is_empty() {
        Err(ExtractionFailure::new(source_id(path), ExtractionCause::EmptyText))
    } else {
        Ok(text)
    }
}
