//! Measurement field extraction.

mod parser;
pub mod rules;

pub use parser::{ParseResult, ReportParser};

use crate::models::record::Record;

/// Trait for report parsers.
///
/// Parsing never fails: a field no rule recognizes is recorded as
/// [`FieldValue::NotFound`](crate::models::record::FieldValue::NotFound).
pub trait FieldParser {
    /// Parse report text into a full-schema record.
    fn parse(&self, text: &str, source_id: &str) -> Record;
}
