//! Extract command - aggregate measurements from many reports into one table.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Args, ValueEnum};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::debug;

use roofx_core::batch::{discover, duplicate_names, BatchAggregator, BatchObserver, BatchSummary, DocumentStatus};
use roofx_core::models::config::{OutputFormat, RoofConfig};
use roofx_core::models::record::FieldName;
use roofx_core::pdf::create_extractor;
use roofx_core::report::ReportParser;
use roofx_core::table::{TableOptions, TableWriter};

use super::{load_config, ExtractorArgs};

/// Arguments for the extract command.
#[derive(Args)]
pub struct ExtractArgs {
    /// Directory or glob pattern with the reports (default: from config)
    input: Option<String>,

    /// Output file (default: from config)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Output format
    #[arg(short, long, value_enum)]
    format: Option<FormatArg>,

    /// Recognized document extensions, comma-separated
    #[arg(long, value_delimiter = ',')]
    extensions: Option<Vec<String>>,

    /// Text written for fields that were not found
    #[arg(long)]
    placeholder: Option<String>,

    /// Add units to column headers, e.g. "Total Eaves (ft)"
    #[arg(long)]
    units_in_header: bool,

    /// Also write a JSON run summary to this file
    #[arg(long)]
    summary: Option<PathBuf>,

    #[command(flatten)]
    extractor: ExtractorArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum FormatArg {
    /// Comma-separated values
    Csv,
    /// JSON array
    Json,
}

impl From<FormatArg> for OutputFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Csv => OutputFormat::Csv,
            FormatArg::Json => OutputFormat::Json,
        }
    }
}

impl ExtractArgs {
    fn apply(&self, config: &mut RoofConfig) {
        if let Some(input) = &self.input {
            config.input.dir = input.clone();
        }
        if let Some(extensions) = &self.extensions {
            config.input.extensions = extensions.clone();
        }
        if let Some(output) = &self.output {
            config.output.path = output.clone();
        }
        if let Some(format) = self.format {
            config.output.format = format.into();
        }
        if let Some(placeholder) = &self.placeholder {
            config.output.placeholder = placeholder.clone();
        }
        if self.units_in_header {
            config.output.units_in_header = true;
        }
        self.extractor.apply(&mut config.extraction);
    }
}

/// Drives the progress bar and prints one status line per document.
struct ProgressObserver {
    pb: ProgressBar,
}

impl ProgressObserver {
    fn new() -> Self {
        let pb = ProgressBar::new(0);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=>-"),
        );
        Self { pb }
    }
}

impl BatchObserver for ProgressObserver {
    fn on_start(&self, total: usize) {
        self.pb.set_length(total as u64);
    }

    fn on_document(&self, _index: usize, path: &Path, status: DocumentStatus<'_>) {
        let line = match status {
            DocumentStatus::Processed(record) => format!(
                "{} {} ({}/{} fields)",
                style("✓").green(),
                record.source_id(),
                record.found_count(),
                FieldName::COUNT
            ),
            DocumentStatus::Skipped(failure) => format!(
                "{} Skipping {}: {}",
                style("✗").red(),
                failure.source_id,
                failure.cause
            ),
        };
        self.pb.suspend(|| println!("{}", line));
        self.pb.set_message(path.display().to_string());
        self.pb.inc(1);
    }

    fn on_finish(&self, summary: &BatchSummary) {
        if summary.cancelled {
            self.pb.abandon_with_message("Cancelled");
        } else {
            self.pb.finish_and_clear();
        }
    }
}

pub fn run(args: ExtractArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    args.apply(&mut config);
    debug!("Effective configuration: {:?}", config);

    let files = discover(&config.input.dir, &config.input.extensions)?;

    println!(
        "{} Found {} files to process",
        style("ℹ").blue(),
        files.len()
    );
    for name in duplicate_names(&files) {
        println!(
            "{} Several files are named {}; their rows will share that name",
            style("!").yellow(),
            name
        );
    }

    let extractor = create_extractor(&config.extraction);
    let aggregator = BatchAggregator::new(extractor, ReportParser::new());
    let observer = ProgressObserver::new();

    let outcome = aggregator.run_with_observer(&files, &observer);
    let summary = &outcome.summary;

    if outcome.dataset.is_empty() {
        println!("{} No data extracted.", style("!").yellow());
    } else {
        let writer = TableWriter::new(TableOptions::from(&config.output));
        writer
            .write_to_path(&outcome.dataset, &config.output.path, config.output.format)
            .with_context(|| format!("Failed to write {}", config.output.path.display()))?;

        println!(
            "{} Successfully created {}",
            style("✓").green(),
            config.output.path.display()
        );
    }

    if let Some(summary_path) = &args.summary {
        write_summary(summary_path, summary)?;
        println!(
            "{} Summary written to {}",
            style("✓").green(),
            summary_path.display()
        );
    }

    // Print summary
    println!();
    println!(
        "{} Processed {} files in {:?}",
        style("✓").green(),
        summary.processed + summary.skipped,
        summary.elapsed
    );
    println!(
        "   {} processed, {} skipped",
        style(summary.processed).green(),
        style(summary.skipped).red()
    );

    if !summary.failures.is_empty() {
        println!();
        println!("{}", style("Skipped files:").red());
        for failure in &summary.failures {
            println!("  - {}: {}", failure.source_id, failure.cause);
        }
    }

    Ok(())
}

fn write_summary(path: &Path, summary: &BatchSummary) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    let content = serde_json::to_string_pretty(summary)?;
    fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))?;
    Ok(())
}
