//! Tabular output of a dataset.
//!
//! Column order is fixed: the source file name, then every
//! [`FieldName`] in schema order. Fields that were not found are written as
//! a placeholder (default `N/A`) so a missing value never looks like a blank
//! cell.

use std::fs::{self, File};
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use serde_json::{Map, Value};
use tracing::{debug, info};

use crate::error::WriteError;
use crate::models::config::{OutputConfig, OutputFormat};
use crate::models::record::{Dataset, FieldName, FieldValue, Record};

/// Header of the source identifier column.
pub const SOURCE_COLUMN: &str = "File Name";

/// Result type for table operations.
pub type Result<T> = std::result::Result<T, WriteError>;

/// Rendering options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableOptions {
    /// Text written for [`FieldValue::NotFound`].
    pub placeholder: String,
    /// Suffix field headers with their unit, e.g. `Total Eaves (ft)`.
    pub units_in_header: bool,
}

impl Default for TableOptions {
    fn default() -> Self {
        Self {
            placeholder: "N/A".to_string(),
            units_in_header: false,
        }
    }
}

impl From<&OutputConfig> for TableOptions {
    fn from(config: &OutputConfig) -> Self {
        Self {
            placeholder: config.placeholder.clone(),
            units_in_header: config.units_in_header,
        }
    }
}

/// Serializes datasets to CSV or JSON.
#[derive(Debug, Clone, Default)]
pub struct TableWriter {
    options: TableOptions,
}

impl TableWriter {
    /// Create a writer with the given options.
    pub fn new(options: TableOptions) -> Self {
        Self { options }
    }

    /// Column headers in output order.
    pub fn headers(&self) -> Vec<String> {
        std::iter::once(SOURCE_COLUMN.to_string())
            .chain(
                FieldName::ALL
                    .iter()
                    .map(|f| f.header(self.options.units_in_header)),
            )
            .collect()
    }

    fn row<'a>(&'a self, record: &'a Record) -> Vec<&'a str> {
        std::iter::once(record.source_id())
            .chain(
                record
                    .iter()
                    .map(|(_, value)| value.display_or(&self.options.placeholder)),
            )
            .collect()
    }

    /// Write the dataset as CSV: one header row, then one row per record.
    pub fn write_csv<W: Write>(&self, dataset: &[Record], writer: W) -> Result<()> {
        let mut wtr = csv::Writer::from_writer(writer);

        wtr.write_record(self.headers())?;
        for record in dataset {
            wtr.write_record(self.row(record))?;
        }

        wtr.flush()?;
        Ok(())
    }

    /// Write the dataset as a JSON array of objects keyed by column header.
    pub fn write_json<W: Write>(&self, dataset: &[Record], writer: W) -> Result<()> {
        let headers = self.headers();
        let rows: Vec<Value> = dataset
            .iter()
            .map(|record| {
                let object: Map<String, Value> = headers
                    .iter()
                    .zip(self.row(record))
                    .map(|(h, v)| (h.clone(), Value::String(v.to_string())))
                    .collect();
                Value::Object(object)
            })
            .collect();

        serde_json::to_writer_pretty(writer, &rows)?;
        Ok(())
    }

    /// Write the dataset to `path`, creating parent directories.
    ///
    /// An empty dataset is refused: a header-only file would look like a
    /// valid result of a run in which every document failed.
    pub fn write_to_path(&self, dataset: &[Record], path: &Path, format: OutputFormat) -> Result<()> {
        if dataset.is_empty() {
            return Err(WriteError::EmptyDataset);
        }

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut file = BufWriter::new(File::create(path)?);
        match format {
            OutputFormat::Csv => self.write_csv(dataset, &mut file)?,
            OutputFormat::Json => self.write_json(dataset, &mut file)?,
        }
        file.flush()?;

        info!("Wrote {} rows to {}", dataset.len(), path.display());
        Ok(())
    }

    /// Read a CSV table produced by [`write_csv`](Self::write_csv).
    ///
    /// Cells equal to the placeholder become [`FieldValue::NotFound`]; a
    /// blank cell is kept as a found, empty value so the two stay
    /// distinguishable.
    pub fn read_csv<R: Read>(&self, reader: R) -> Result<Dataset> {
        let mut rdr = csv::Reader::from_reader(reader);
        let headers = rdr.headers()?.clone();

        let source_idx = headers
            .iter()
            .position(|h| h == SOURCE_COLUMN)
            .ok_or_else(|| WriteError::MissingColumn(SOURCE_COLUMN.to_string()))?;

        let mut field_idx = [0usize; FieldName::COUNT];
        for field in FieldName::ALL {
            field_idx[field.index()] = headers
                .iter()
                .position(|h| FieldName::from_header(h) == Some(field))
                .ok_or_else(|| WriteError::MissingColumn(field.to_string()))?;
        }

        let mut dataset = Dataset::new();
        for row in rdr.records() {
            let row = row?;
            let values: [FieldValue; FieldName::COUNT] = std::array::from_fn(|i| {
                match row.get(field_idx[i]).unwrap_or_default() {
                    cell if cell == self.options.placeholder => FieldValue::NotFound,
                    cell => FieldValue::Found(cell.to_string()),
                }
            });
            let source_id = row.get(source_idx).unwrap_or_default();
            dataset.push(Record::from_values(source_id, values));
        }

        debug!("Read {} rows", dataset.len());
        Ok(dataset)
    }
}
