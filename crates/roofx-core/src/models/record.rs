//! Roof measurement record model.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Fields recovered from a measurement report, in output column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldName {
    /// Property address, taken from the line carrying the report number.
    #[serde(rename = "Address")]
    Address,
    /// Total roof area (sq ft).
    #[serde(rename = "Total Roof Area")]
    TotalRoofArea,
    /// Combined length of ridges and hips (ft).
    #[serde(rename = "Total Ridges/Hips")]
    TotalRidgesHips,
    /// Total valley length (ft).
    #[serde(rename = "Total Valleys")]
    TotalValleys,
    /// Total rake length (ft).
    #[serde(rename = "Total Rakes")]
    TotalRakes,
    /// Total eave length (ft).
    #[serde(rename = "Total Eaves")]
    TotalEaves,
    /// Predominant pitch as a rise/run ratio, e.g. `6/12`.
    #[serde(rename = "Predominant Pitch")]
    PredominantPitch,
}

impl FieldName {
    /// Every field, in schema order.
    pub const ALL: [FieldName; 7] = [
        FieldName::Address,
        FieldName::TotalRoofArea,
        FieldName::TotalRidgesHips,
        FieldName::TotalValleys,
        FieldName::TotalRakes,
        FieldName::TotalEaves,
        FieldName::PredominantPitch,
    ];

    /// Number of fields in the schema.
    pub const COUNT: usize = Self::ALL.len();

    /// Schema name of the field.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Address => "Address",
            Self::TotalRoofArea => "Total Roof Area",
            Self::TotalRidgesHips => "Total Ridges/Hips",
            Self::TotalValleys => "Total Valleys",
            Self::TotalRakes => "Total Rakes",
            Self::TotalEaves => "Total Eaves",
            Self::PredominantPitch => "Predominant Pitch",
        }
    }

    /// Unit the value is expressed in, if any.
    pub fn unit(&self) -> Option<&'static str> {
        match self {
            Self::Address | Self::PredominantPitch => None,
            Self::TotalRoofArea => Some("sq ft"),
            Self::TotalRidgesHips | Self::TotalValleys | Self::TotalRakes | Self::TotalEaves => {
                Some("ft")
            }
        }
    }

    /// Column header, optionally suffixed with the unit (`Total Eaves (ft)`).
    pub fn header(&self, with_unit: bool) -> String {
        match self.unit() {
            Some(unit) if with_unit => format!("{} ({})", self.as_str(), unit),
            _ => self.as_str().to_string(),
        }
    }

    /// Position of the field in schema order.
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// Parse a schema name or a unit-suffixed header.
    pub fn from_header(header: &str) -> Option<Self> {
        let header = header.trim();
        Self::ALL
            .into_iter()
            .find(|f| f.as_str() == header || f.header(true) == header)
    }
}

impl fmt::Display for FieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a single extraction rule.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    /// The rule matched; the value is normalized and never empty.
    Found(String),
    /// The rule did not match.
    NotFound,
}

impl FieldValue {
    /// Build a value from an optional match, treating empty strings as a miss.
    pub fn from_match(value: Option<String>) -> Self {
        match value {
            Some(v) if !v.is_empty() => Self::Found(v),
            _ => Self::NotFound,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn as_deref(&self) -> Option<&str> {
        match self {
            Self::Found(v) => Some(v),
            Self::NotFound => None,
        }
    }

    /// Render for a table cell, using `placeholder` for a miss.
    pub fn display_or<'a>(&'a self, placeholder: &'a str) -> &'a str {
        self.as_deref().unwrap_or(placeholder)
    }
}

/// Measurements extracted from one report.
///
/// Holds exactly one value per [`FieldName`], so every record has the same
/// shape regardless of how much of the report was recognized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    source_id: String,
    fields: [FieldValue; FieldName::COUNT],
}

impl Record {
    /// Create a record from values given in schema order.
    pub fn from_values(source_id: impl Into<String>, fields: [FieldValue; FieldName::COUNT]) -> Self {
        Self {
            source_id: source_id.into(),
            fields,
        }
    }

    /// Identifier of the originating document.
    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    /// Value for a field.
    pub fn get(&self, field: FieldName) -> &FieldValue {
        &self.fields[field.index()]
    }

    /// Iterate `(field, value)` pairs in schema order.
    pub fn iter(&self) -> impl Iterator<Item = (FieldName, &FieldValue)> {
        FieldName::ALL.into_iter().zip(self.fields.iter())
    }

    /// Fields whose rule did not match.
    pub fn missing_fields(&self) -> Vec<FieldName> {
        self.iter()
            .filter(|(_, v)| !v.is_found())
            .map(|(f, _)| f)
            .collect()
    }

    /// Number of fields that were found.
    pub fn found_count(&self) -> usize {
        self.fields.iter().filter(|v| v.is_found()).count()
    }
}

/// Records from a batch, in input order.
pub type Dataset = Vec<Record>;
