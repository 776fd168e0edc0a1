//! Subcommands.

pub mod config;
pub mod extract;
pub mod parse;

use std::path::{Path, PathBuf};

use clap::{ArgAction, Args, ValueEnum};
use tracing::debug;

use roofx_core::models::config::{ExtractionConfig, ExtractorBackend, RoofConfig};

/// Text extraction backend selectable on the command line.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum BackendArg {
    /// Built-in PDF text extraction
    Pdf,
    /// External converter command (pdftotext by default)
    Command,
}

impl From<BackendArg> for ExtractorBackend {
    fn from(arg: BackendArg) -> Self {
        match arg {
            BackendArg::Pdf => ExtractorBackend::Pdf,
            BackendArg::Command => ExtractorBackend::Command,
        }
    }
}

/// Extraction options shared by `extract` and `parse`.
#[derive(Args, Debug)]
pub struct ExtractorArgs {
    /// Text extraction backend
    #[arg(long, value_enum)]
    backend: Option<BackendArg>,

    /// Converter command for the command backend, e.g. "pdftotext {input} -".
    /// Given once, it is split on whitespace; repeat the flag to pass each
    /// argument verbatim (arguments containing spaces).
    #[arg(long, action = ArgAction::Append, allow_hyphen_values = true)]
    command: Vec<String>,

    /// Kill the converter after this many seconds
    #[arg(long)]
    timeout: Option<u64>,
}

impl ExtractorArgs {
    /// Override configuration values with the ones given on the command line.
    pub fn apply(&self, config: &mut ExtractionConfig) {
        if let Some(backend) = self.backend {
            config.backend = backend.into();
        }
        if !self.command.is_empty() {
            config.command = converter_argv(&self.command);
            // A converter command implies the command backend unless one was named
            if self.backend.is_none() {
                config.backend = ExtractorBackend::Command;
            }
        }
        if self.timeout.is_some() {
            config.timeout_secs = self.timeout;
        }
    }
}

fn converter_argv(values: &[String]) -> Vec<String> {
    match values {
        [single] => single.split_whitespace().map(str::to_string).collect(),
        many => many.to_vec(),
    }
}

/// Default location of the configuration file.
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("roofx")
        .join("config.json")
}

/// Load the configuration from `--config`, the default location, or defaults.
pub fn load_config(config_path: Option<&str>) -> anyhow::Result<RoofConfig> {
    if let Some(path) = config_path {
        debug!("Loading config from {}", path);
        return RoofConfig::from_file(Path::new(path))
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {}", path, e));
    }

    let default_path = default_config_path();
    if default_path.exists() {
        debug!("Loading config from {}", default_path.display());
        return Ok(RoofConfig::from_file(&default_path)?);
    }

    Ok(RoofConfig::default())
}
