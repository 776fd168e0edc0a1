//! Error types for the roofx-core library.

use serde::Serialize;
use thiserror::Error;

/// Main error type for the roofx library.
#[derive(Error, Debug)]
pub enum RoofError {
    /// A document could not be converted to text.
    #[error("extraction error: {0}")]
    Extraction(#[from] ExtractionFailure),

    /// The output artifact could not be written.
    #[error("write error: {0}")]
    Write(#[from] WriteError),

    /// Input discovery failed (bad glob pattern, unreadable directory).
    #[error("discovery error: {0}")]
    Discover(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<glob::PatternError> for RoofError {
    fn from(err: glob::PatternError) -> Self {
        Self::Discover(err.to_string())
    }
}

/// A document that could not be turned into text.
///
/// Carries the identifier of the document so a batch can report which file
/// was skipped without keeping the path around.
#[derive(Error, Debug, Clone, Serialize)]
#[error("{source_id}: {cause}")]
pub struct ExtractionFailure {
    /// Identifier of the document (file name).
    pub source_id: String,
    /// Underlying reason.
    pub cause: ExtractionCause,
}

impl ExtractionFailure {
    pub fn new(source_id: impl Into<String>, cause: ExtractionCause) -> Self {
        Self {
            source_id: source_id.into(),
            cause,
        }
    }
}

/// Why a document produced no text.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum ExtractionCause {
    /// File missing or unreadable.
    #[error("failed to read document: {0}")]
    Io(String),

    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    Text(String),

    /// pdf-extract panicked on a malformed document.
    #[error("pdf-extract panicked: {0}")]
    Panicked(String),

    /// The external converter could not be started.
    #[error("failed to run converter: {0}")]
    Spawn(String),

    /// The external converter exited unsuccessfully.
    #[error("converter failed ({status}): {stderr}")]
    ExitStatus { status: String, stderr: String },

    /// The external converter did not finish in time.
    #[error("converter timed out after {0}s")]
    Timeout(u64),

    /// Conversion succeeded but produced no text.
    #[error("no text extracted")]
    EmptyText,
}

/// Errors related to writing (or re-reading) the output table.
#[derive(Error, Debug)]
pub enum WriteError {
    /// Nothing to write; an empty dataset never produces an artifact.
    #[error("dataset is empty, nothing to write")]
    EmptyDataset,

    /// CSV serialization failed.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A table being read back lacks an expected column.
    #[error("missing column: {0}")]
    MissingColumn(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for the roofx library.
pub type Result<T> = std::result::Result<T, RoofError>;
