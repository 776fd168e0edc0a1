//! Data models.

pub mod config;
pub mod record;

pub use config::{ExtractionConfig, ExtractorBackend, InputConfig, OutputConfig, OutputFormat, RoofConfig};
pub use record::{Dataset, FieldName, FieldValue, Record};
