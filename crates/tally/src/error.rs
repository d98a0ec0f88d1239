//! Error types for the Tally library.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for Tally operations.
///
/// Formula evaluation never produces this type; failures there are reported
/// through [`crate::FormulaResult::Error`].
#[derive(Debug, Error)]
pub enum TallyError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Invalid delimiter detected or specified.
    #[error("Invalid delimiter: {0}")]
    InvalidDelimiter(String),

    /// Empty file or no data to analyze.
    #[error("Empty data: {0}")]
    EmptyData(String),

    /// A requested column is absent, or not of the kind the operation needs.
    #[error("Invalid column '{column}': {reason}")]
    InvalidColumn { column: String, reason: String },

    /// A chart request is missing a required selection.
    #[error("Invalid chart request: {0}")]
    InvalidChart(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Error saving an export.
    #[error("Persistence error: {0}")]
    Persistence(String),

    /// Usage event delivery failed.
    #[error("Telemetry error: {0}")]
    Telemetry(String),
}

impl TallyError {
    /// Column is not present in the table.
    pub fn missing_column(column: impl Into<String>) -> Self {
        TallyError::InvalidColumn {
            column: column.into(),
            reason: "column not found in table".to_string(),
        }
    }

    /// Column is present but is not numeric.
    pub fn not_numeric(column: impl Into<String>) -> Self {
        TallyError::InvalidColumn {
            column: column.into(),
            reason: "column is not numeric".to_string(),
        }
    }
}

/// Result type alias for Tally operations.
pub type Result<T> = std::result::Result<T, TallyError>;
