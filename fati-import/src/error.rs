//! Error types for fati-import

use thiserror::Error;

/// Result alias for import operations
pub type ImportResult<T> = std::result::Result<T, ImportError>;

/// Import pipeline error
#[derive(Debug, Error)]
pub enum ImportError {
    /// Conflicting or out-of-range populate options
    #[error("Invalid options: {0}")]
    InvalidOptions(String),

    /// fati-common error
    #[error("Common error: {0}")]
    Common(#[from] fati_common::Error),

    /// Database error
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Malformed JSON document
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Well-formed JSON with an unexpected shape
    #[error("Invalid document: {0}")]
    InvalidDocument(String),

    /// Malformed CSV file
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
