//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration for the roofx pipeline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoofConfig {
    /// Where reports are read from.
    pub input: InputConfig,

    /// Where and how the aggregated table is written.
    pub output: OutputConfig,

    /// Text extraction backend configuration.
    pub extraction: ExtractionConfig,
}

/// Input discovery configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Directory (or glob pattern) holding the reports.
    pub dir: String,

    /// Recognized document extensions, matched case-insensitively.
    pub extensions: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dir: ".".to_string(),
            extensions: vec!["pdf".to_string()],
        }
    }
}

/// Output table format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Comma-separated values.
    #[default]
    Csv,
    /// JSON array of objects keyed by column header.
    Json,
}

/// Output configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Destination file.
    pub path: PathBuf,

    /// Table format.
    pub format: OutputFormat,

    /// Cell text written for a field that was not found.
    pub placeholder: String,

    /// Append units to column headers, e.g. `Total Eaves (ft)`.
    pub units_in_header: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("measurements.csv"),
            format: OutputFormat::Csv,
            placeholder: "N/A".to_string(),
            units_in_header: false,
        }
    }
}

/// Which text extraction backend to use.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractorBackend {
    /// In-process extraction with lopdf + pdf-extract.
    #[default]
    Pdf,
    /// External converter command (pdftotext by default).
    Command,
}

/// Text extraction configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Backend used to turn documents into text.
    pub backend: ExtractorBackend,

    /// Argument vector for the command backend. `{input}` is replaced by the
    /// document path; the converter must print text to stdout.
    pub command: Vec<String>,

    /// Kill the converter after this many seconds (command backend only).
    pub timeout_secs: Option<u64>,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            backend: ExtractorBackend::Pdf,
            command: vec![
                "pdftotext".to_string(),
                "{input}".to_string(),
                "-".to_string(),
            ],
            timeout_secs: None,
        }
    }
}

impl RoofConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &std::path::Path) -> Result<Self, std::io::Error> {
        let content = std::fs::read_to_string(path)?;
        serde_json::from_str(&content).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &std::path::Path) -> Result<(), std::io::Error> {
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })?;
        std::fs::write(path, content)
    }
}
