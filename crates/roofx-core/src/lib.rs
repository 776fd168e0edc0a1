//! Core library for roof measurement report extraction.
//!
//! This crate provides:
//! - Document-to-text conversion (in-process PDF extraction or an external converter)
//! - Rule-based extraction of roof measurement fields
//! - Batch aggregation that skips unreadable documents without aborting
//! - CSV/JSON output with a fixed column order

pub mod batch;
pub mod error;
pub mod models;
pub mod pdf;
pub mod report;
pub mod table;

pub use batch::{discover, duplicate_names, BatchAggregator, BatchObserver, BatchOutcome, BatchSummary, DocumentStatus};
pub use error::{ExtractionCause, ExtractionFailure, Result, RoofError, WriteError};
pub use models::config::RoofConfig;
pub use models::record::{Dataset, FieldName, FieldValue, Record};
pub use pdf::{create_extractor, CommandExtractor, PdfTextExtractor, TextExtractor};
pub use report::{FieldParser, ParseResult, ReportParser};
pub use table::{TableOptions, TableWriter};
