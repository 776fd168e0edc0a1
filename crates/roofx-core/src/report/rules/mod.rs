//! Declarative extraction rules for measurement reports.
//!
//! Each field is described by one [`FieldRule`]: the pattern whose first
//! capture group holds the value, and a normalizer applied to that capture.
//! Rules are evaluated independently, so one field's absence never affects
//! another.

pub mod normalize;
pub mod patterns;

use regex::Regex;

use crate::models::record::{FieldName, FieldValue};
use patterns::*;

/// Cleans up a raw capture. Returning `None` marks the field as not found.
pub type Normalizer = fn(&str) -> Option<String>;

/// A single (field, pattern, normalizer) extraction rule.
#[derive(Clone, Copy)]
pub struct FieldRule {
    /// Field this rule fills.
    pub field: FieldName,
    /// Pattern with the value in capture group 1.
    pub pattern: &'static Regex,
    /// Applied to capture group 1.
    pub normalize: Normalizer,
}

impl FieldRule {
    /// Apply the rule. The first match in reading order wins.
    pub fn apply(&self, text: &str) -> FieldValue {
        let value = self
            .pattern
            .captures(text)
            .and_then(|caps| caps.get(1))
            .and_then(|m| (self.normalize)(m.as_str()));

        FieldValue::from_match(value)
    }
}

impl std::fmt::Debug for FieldRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FieldRule")
            .field("field", &self.field)
            .field("pattern", &self.pattern.as_str())
            .finish()
    }
}

/// The rule table, one rule per field in schema order.
pub fn default_rules() -> [FieldRule; FieldName::COUNT] {
    [
        FieldRule {
            field: FieldName::Address,
            pattern: &ADDRESS,
            normalize: normalize::trimmed,
        },
        FieldRule {
            field: FieldName::TotalRoofArea,
            pattern: &TOTAL_ROOF_AREA,
            normalize: normalize::strip_thousands,
        },
        FieldRule {
            field: FieldName::TotalRidgesHips,
            pattern: &TOTAL_RIDGES_HIPS,
            normalize: normalize::verbatim,
        },
        FieldRule {
            field: FieldName::TotalValleys,
            pattern: &TOTAL_VALLEYS,
            normalize: normalize::verbatim,
        },
        FieldRule {
            field: FieldName::TotalRakes,
            pattern: &TOTAL_RAKES,
            normalize: normalize::verbatim,
        },
        FieldRule {
            field: FieldName::TotalEaves,
            pattern: &TOTAL_EAVES,
            normalize: normalize::verbatim,
        },
        FieldRule {
            field: FieldName::PredominantPitch,
            pattern: &PREDOMINANT_PITCH,
            normalize: normalize::verbatim,
        },
    ]
}
