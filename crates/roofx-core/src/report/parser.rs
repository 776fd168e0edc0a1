//! Rule-driven measurement report parser.

use tracing::{debug, trace};

use crate::models::record::{FieldName, FieldValue, Record};

use super::rules::{default_rules, FieldRule};
use super::FieldParser;

/// Result of parsing one report, with diagnostics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseResult {
    /// The extracted record.
    pub record: Record,
    /// Fields no rule matched.
    pub missing: Vec<FieldName>,
    /// Human-readable extraction warnings.
    pub warnings: Vec<String>,
}

/// Parser applying the measurement rule table to report text.
#[derive(Debug, Clone)]
pub struct ReportParser {
    rules: [FieldRule; FieldName::COUNT],
}

impl ReportParser {
    /// Create a parser with the standard rule table.
    pub fn new() -> Self {
        Self {
            rules: default_rules(),
        }
    }

    /// Parse and report which fields were missing.
    pub fn parse_detailed(&self, text: &str, source_id: &str) -> ParseResult {
        let record = self.parse(text, source_id);
        let missing = record.missing_fields();

        let warnings = missing
            .iter()
            .map(|field| format!("Could not extract {}", field))
            .collect();

        ParseResult {
            record,
            missing,
            warnings,
        }
    }
}

impl Default for ReportParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FieldParser for ReportParser {
    fn parse(&self, text: &str, source_id: &str) -> Record {
        let values: [FieldValue; FieldName::COUNT] = std::array::from_fn(|i| {
            let rule = &self.rules[i];
            let value = rule.apply(text);
            if !value.is_found() {
                trace!("{}: no match for {}", source_id, rule.field);
            }
            value
        });

        let record = Record::from_values(source_id, values);

        debug!(
            "Parsed {} from {} chars: {}/{} fields found",
            source_id,
            text.len(),
            record.found_count(),
            FieldName::COUNT
        );

        record
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const REPORT: &str = r#"
PREPARED FOR
Contact: Jane Doe
Company: Acme Roofing
1234 Elm Street, Springfield, IL 62704   Report: 41234567

ROOF MEASUREMENTS
Total Roof Area =3,456 sq ft
Total Roof Facets =14
Predominant Pitch =6/12
Number of Stories <=1
Total Ridges/Hips =142 ft
Total Valleys =38 ft
Total Rakes =96 ft
Total Eaves =168 ft

Areas per Pitch
Total Roof Area =3,456 sq ft
"#;

    fn found(value: &str) -> FieldValue {
        FieldValue::Found(value.to_string())
    }

    #[test]
    fn test_parse_full_report() {
        let record = ReportParser::new().parse(REPORT, "elm.pdf");

        assert_eq!(record.source_id(), "elm.pdf");
        assert_eq!(
            record.get(FieldName::Address),
            &found("1234 Elm Street, Springfield, IL 62704")
        );
        assert_eq!(record.get(FieldName::TotalRoofArea), &found("3456"));
        assert_eq!(record.get(FieldName::TotalRidgesHips), &found("142"));
        assert_eq!(record.get(FieldName::TotalValleys), &found("38"));
        assert_eq!(record.get(FieldName::TotalRakes), &found("96"));
        assert_eq!(record.get(FieldName::TotalEaves), &found("168"));
        assert_eq!(record.get(FieldName::PredominantPitch), &found("6/12"));
        assert!(record.missing_fields().is_empty());
    }

    #[test]
    fn test_parse_is_idempotent() {
        let parser = ReportParser::new();
        assert_eq!(parser.parse(REPORT, "a.pdf"), parser.parse(REPORT, "a.pdf"));
    }

    #[test]
    fn test_missing_marker_only_affects_its_field() {
        let text = REPORT.replace("Total Eaves =168 ft", "");
        let result = ReportParser::new().parse_detailed(&text, "a.pdf");

        assert_eq!(result.missing, vec![FieldName::TotalEaves]);
        assert_eq!(result.warnings, vec!["Could not extract Total Eaves".to_string()]);
        assert_eq!(result.record.get(FieldName::TotalEaves), &FieldValue::NotFound);
        assert_eq!(result.record.get(FieldName::TotalRakes), &found("96"));
        assert_eq!(result.record.found_count(), FieldName::COUNT - 1);
    }

    #[test]
    fn test_duplicate_markers_first_wins() {
        let text = "Total Valleys =100 ft\nsome boilerplate\nTotal Valleys =200 ft\n";
        let record = ReportParser::new().parse(text, "a.pdf");
        assert_eq!(record.get(FieldName::TotalValleys), &found("100"));
    }

    #[test]
    fn test_unrelated_text_yields_full_schema_of_misses() {
        let record = ReportParser::new().parse("Gutter quote #42\nThank you!", "x.pdf");

        assert_eq!(record.iter().count(), FieldName::COUNT);
        assert!(record.iter().all(|(_, v)| *v == FieldValue::NotFound));
    }

    #[test]
    fn test_found_values_are_never_empty() {
        let text = "   Report: 1\nTotal Roof Area =, sq ft\n";
        let record = ReportParser::new().parse(text, "a.pdf");

        assert_eq!(record.get(FieldName::Address), &FieldValue::NotFound);
        assert_eq!(record.get(FieldName::TotalRoofArea), &FieldValue::NotFound);
        for (_, value) in record.iter() {
            if let FieldValue::Found(v) = value {
                assert!(!v.is_empty());
            }
        }
    }
}
