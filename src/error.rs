//! Error types for report generation
//!
//! Schema, parse and I/O problems are fatal: any malformed input stops the
//! run instead of producing a silently wrong table.

use thiserror::Error;

/// Errors raised while loading, transforming or writing a report
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Missing field '{field}' in {input}")]
    MissingField { field: String, input: String },

    #[error("Unknown column '{0}'")]
    UnknownColumn(String),

    #[error("Cannot parse '{value}' in field '{field}' (row {row}) as {expected}")]
    Parse {
        field: String,
        row: usize,
        value: String,
        expected: &'static str,
    },

    #[error("Key '{key}' of field '{field}' is missing from the merged input")]
    MissingKey { field: String, key: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for report operations
pub type Result<T> = std::result::Result<T, ReportError>;
