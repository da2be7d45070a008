use once_cell::sync::Lazy;
use regex::Regex;

static INNER_WS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("static regex"));
static HEADER_SEP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s_]+").expect("static regex"));
static NON_DIGIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^0-9]").expect("static regex"));

/// Trim whitespace + strip outer quotes if present.
pub fn clean_str(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.starts_with('"') && trimmed.ends_with('"') && trimmed.len() >= 2 {
        trimmed[1..trimmed.len() - 1].trim().to_string()
    } else {
        trimmed.to_string()
    }
}

/// `clean_str`, then collapse inner whitespace runs to one space.
/// Empty results become `None`.
pub fn clean_text(raw: &str) -> Option<String> {
    let cleaned = clean_str(raw);
    if cleaned.is_empty() {
        None
    } else {
        Some(INNER_WS.replace_all(&cleaned, " ").into_owned())
    }
}

/// Lookup key for a header: trimmed, lowercased, whitespace/underscore runs
/// folded into a single `_`.
pub fn header_key(raw: &str) -> String {
    HEADER_SEP
        .replace_all(clean_str(raw).as_str(), "_")
        .trim_matches('_')
        .to_lowercase()
}

/// Keep only ASCII digits.
pub fn digits_only(raw: &str) -> String {
    NON_DIGIT.replace_all(raw, "").into_owned()
}
