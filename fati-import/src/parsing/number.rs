//! Number parsing for spreadsheet cells
//!
//! Cells arrive as JSON numbers, booleans or text in French or English
//! notation (`"1 234,5"`, `"1,234.5"`, `"87,3 %"`). Placeholders such as
//! `"-"` or `"N/A"` mean "no value".

use serde_json::Value;

const PLACEHOLDERS: &[&str] = &["-", "--", "...", "NA", "N/A"];

/// Parse a JSON cell into a finite number
pub fn parse_number(value: &Value) -> Option<f64> {
    match value {
        Value::Null => None,
        Value::Bool(b) => Some(if *b { 1.0 } else { 0.0 }),
        Value::Number(n) => n.as_f64().filter(|f| f.is_finite()),
        Value::String(s) => parse_number_str(s),
        Value::Array(_) | Value::Object(_) => None,
    }
}

/// Parse number text
///
/// When both `,` and `.` appear, the last one is the decimal mark. A single
/// `,` alone is a decimal comma; several are thousands separators.
pub fn parse_number_str(raw: &str) -> Option<f64> {
    let text = raw.trim();
    if text.is_empty() || PLACEHOLDERS.contains(&text) {
        return None;
    }

    let mut text: String = text
        .chars()
        .filter(|c| *c != '%' && !c.is_whitespace())
        .collect();

    let commas = text.matches(',').count();
    match (text.rfind(','), text.rfind('.')) {
        (Some(comma), Some(dot)) => {
            text = if comma > dot {
                text.replace('.', "").replace(',', ".")
            } else {
                text.replace(',', "")
            };
        }
        (Some(_), None) if commas == 1 => text = text.replace(',', "."),
        (Some(_), None) => text = text.replace(',', ""),
        _ => {}
    }

    text.parse::<f64>().ok().filter(|f| f.is_finite())
}

/// [`parse_number`] truncated toward zero
pub fn parse_int(value: &Value) -> Option<i64> {
    parse_number(value).map(|f| f.trunc() as i64)
}

/// [`parse_number_str`] truncated toward zero
pub fn parse_int_str(raw: &str) -> Option<i64> {
    parse_number_str(raw).map(|f| f.trunc() as i64)
}
