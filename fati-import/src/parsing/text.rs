//! Label normalization for spreadsheet-derived text

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

static NON_ALNUM_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("static pattern"));

/// Comparison form of a free-text label
///
/// NFKD decomposition, combining marks dropped, every run of characters
/// outside `[A-Za-z0-9]` replaced by one space, trimmed and uppercased.
/// `"Saint-Louis (région)"` becomes `"SAINT LOUIS REGION"`.
pub fn normalize(label: &str) -> String {
    let stripped: String = label.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    NON_ALNUM_RUN
        .replace_all(&stripped, " ")
        .trim()
        .to_uppercase()
}

/// [`normalize`] for optional labels; `None` normalizes to `""`
pub fn normalize_opt(label: Option<&str>) -> String {
    label.map(normalize).unwrap_or_default()
}

/// Split on whitespace and rejoin with single spaces
pub fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Indicator name as written to the database
///
/// Drops `(*)` footnote markers, collapses whitespace and strips leading and
/// trailing separators (` -:;`).
pub fn clean_indicator_name(s: &str) -> String {
    let without_markers = s.trim().replace("(*)", "");
    collapse_whitespace(&without_markers)
        .trim_matches(|c| matches!(c, ' ' | '-' | ':' | ';'))
        .to_string()
}

/// Key used for case-insensitive name equality (`name_key` columns)
pub fn fold_name(s: &str) -> String {
    s.trim().to_lowercase()
}
