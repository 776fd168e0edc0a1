//! Regex patterns for roof measurement report fields.
//!
//! Literals are case- and whitespace-sensitive, matching the report text as
//! emitted by the converters. None of the patterns is anchored to the start
//! of the document.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    // Address: the text before "Report: <digits>" on the same line
    pub static ref ADDRESS: Regex = Regex::new(
        r"(?m)^(.*?)[ \t]+Report:[ \t]+\d+"
    ).unwrap();

    // Area, may carry thousands separators ("2,345")
    pub static ref TOTAL_ROOF_AREA: Regex = Regex::new(
        r"Total Roof Area =([\d,]+)\s+sq ft"
    ).unwrap();

    // Linear totals in whole feet
    pub static ref TOTAL_RIDGES_HIPS: Regex = Regex::new(
        r"Total Ridges/Hips =(\d+)\s+ft"
    ).unwrap();

    pub static ref TOTAL_VALLEYS: Regex = Regex::new(
        r"Total Valleys =(\d+)\s+ft"
    ).unwrap();

    pub static ref TOTAL_RAKES: Regex = Regex::new(
        r"Total Rakes =(\d+)\s+ft"
    ).unwrap();

    pub static ref TOTAL_EAVES: Regex = Regex::new(
        r"Total Eaves =(\d+)\s+ft"
    ).unwrap();

    // Rise/run ratio, e.g. "6/12"
    pub static ref PREDOMINANT_PITCH: Regex = Regex::new(
        r"Predominant Pitch =([\d/]+)"
    ).unwrap();
}
