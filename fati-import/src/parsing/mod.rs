//! Parsing of spreadsheet-derived cells and labels

pub mod number;
pub mod text;
pub mod years;

pub use number::{parse_int, parse_int_str, parse_number, parse_number_str};
pub use text::{clean_indicator_name, collapse_whitespace, fold_name, normalize, normalize_opt};
pub use years::{extract_year_map, extract_year_values, parse_education_indicator_line};

use serde_json::Value;

/// Text of a cell, empty for null, `false`, zero and containers
pub fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) if n.as_f64() != Some(0.0) => n.to_string(),
        Value::Bool(true) => "true".to_string(),
        _ => String::new(),
    }
}
