//! Spreadsheet-derived JSON documents
//!
//! Shape: `{group: {sheet: [row, ...]}}` where each row maps column name to
//! cell. Key order of the file is preserved.

use crate::error::{ImportError, ImportResult};
use serde_json::{Map, Value};
use std::path::Path;

pub type Row = Map<String, Value>;

/// One sheet of a loaded document
pub struct Sheet<'a> {
    pub group: &'a str,
    pub name: &'a str,
    pub rows: &'a [Value],
}

/// Read and parse a document
///
/// Missing or unreadable files and malformed JSON are reported as warnings
/// and yield `None`; the caller falls back to generated data.
pub fn load_document(path: &Path, sector_label: &str) -> Option<Map<String, Value>> {
    if !path.exists() {
        tracing::warn!("{} JSON not found: {}", sector_label, path.display());
        return None;
    }

    match read_document(path) {
        Ok(document) => Some(document),
        Err(e) => {
            tracing::warn!("Failed to load {} JSON {}: {}", sector_label, path.display(), e);
            None
        }
    }
}

fn read_document(path: &Path) -> ImportResult<Map<String, Value>> {
    let content = std::fs::read_to_string(path)?;
    parse_document(&content)
}

/// Parse document text; the top level must be an object
pub fn parse_document(content: &str) -> ImportResult<Map<String, Value>> {
    match serde_json::from_str::<Value>(content)? {
        Value::Object(document) => Ok(document),
        _ => Err(ImportError::InvalidDocument("top level is not an object".to_string())),
    }
}

/// Sheets in document order; non-object groups and non-array sheets are skipped
pub fn sheets(document: &Map<String, Value>) -> Vec<Sheet<'_>> {
    document
        .iter()
        .filter_map(|(group, sheets)| sheets.as_object().map(|s| (group, s)))
        .flat_map(|(group, sheets)| {
            sheets.iter().filter_map(move |(name, rows)| {
                rows.as_array().map(|rows| Sheet {
                    group: group.as_str(),
                    name: name.as_str(),
                    rows: rows.as_slice(),
                })
            })
        })
        .collect()
}

/// `json:{file name}` source tag for imported values
pub fn source_tag(path: &Path) -> String {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    format!("json:{}", name)
}
