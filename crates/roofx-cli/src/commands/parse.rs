//! Parse command - extract measurements from a single report.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use console::style;
use serde_json::{Map, Value};
use tracing::info;

use roofx_core::models::record::{FieldName, Record};
use roofx_core::pdf::{create_extractor, source_id, TextExtractor};
use roofx_core::report::ReportParser;
use roofx_core::table::SOURCE_COLUMN;

use super::{load_config, ExtractorArgs};

/// Arguments for the parse command.
#[derive(Args)]
pub struct ParseArgs {
    /// Input report
    #[arg(required = true)]
    input: PathBuf,

    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    format: PrintFormat,

    /// Print the extracted text before the fields
    #[arg(long)]
    raw: bool,

    #[command(flatten)]
    extractor: ExtractorArgs,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum PrintFormat {
    /// JSON object
    Json,
    /// Plain text summary
    Text,
}

pub fn run(args: ParseArgs, config_path: Option<&str>) -> anyhow::Result<()> {
    let mut config = load_config(config_path)?;
    args.extractor.apply(&mut config.extraction);

    info!("Processing file: {}", args.input.display());

    let extractor = create_extractor(&config.extraction);
    let text = extractor
        .extract(&args.input)
        .map_err(|failure| anyhow::anyhow!("Extraction failed for {}", failure))?;

    if args.raw {
        println!("{}", text);
        println!("{}", style("-".repeat(40)).dim());
    }

    let result = ReportParser::new().parse_detailed(&text, &source_id(&args.input));
    let placeholder = &config.output.placeholder;

    match args.format {
        PrintFormat::Json => println!("{}", format_json(&result.record, placeholder)?),
        PrintFormat::Text => print!("{}", format_text(&result.record, placeholder)),
    }

    for warning in &result.warnings {
        eprintln!("{} {}", style("!").yellow(), warning);
    }

    Ok(())
}

fn format_json(record: &Record, placeholder: &str) -> anyhow::Result<String> {
    let mut object = Map::new();
    object.insert(
        SOURCE_COLUMN.to_string(),
        Value::String(record.source_id().to_string()),
    );
    for (field, value) in record.iter() {
        object.insert(
            field.to_string(),
            Value::String(value.display_or(placeholder).to_string()),
        );
    }
    Ok(serde_json::to_string_pretty(&Value::Object(object))?)
}

fn format_text(record: &Record, placeholder: &str) -> String {
    let width = FieldName::ALL
        .iter()
        .map(|f| f.header(true).len())
        .max()
        .unwrap_or(0);

    let mut output = String::new();
    output.push_str(&format!("File: {}\n", record.source_id()));
    for (field, value) in record.iter() {
        output.push_str(&format!(
            "  {:<width$}  {}\n",
            field.header(true),
            value.display_or(placeholder),
            width = width
        ));
    }
    output
}
