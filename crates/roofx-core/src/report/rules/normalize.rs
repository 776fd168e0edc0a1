//! Value normalizers used by the rule table.

/// Leading and trailing whitespace removed.
pub fn trimmed(raw: &str) -> Option<String> {
    Some(raw.trim().to_string())
}

/// Thousands separators removed: `"12,345"` becomes `"12345"`.
pub fn strip_thousands(raw: &str) -> Option<String> {
    Some(raw.chars().filter(|c| *c != ',').collect())
}

/// The capture as-is.
pub fn verbatim(raw: &str) -> Option<String> {
    Some(raw.to_string())
}
