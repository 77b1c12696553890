//! Error types for the framebridge library.

use std::path::PathBuf;
use thiserror::Error;

use crate::validation::SchemaViolation;

/// Main error type for framebridge operations.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// Raw value is neither a mapping nor a recognised table or wrapper.
    #[error("Expected a column mapping, row list, table or validated table, got {kind}")]
    UnsupportedInputType { kind: String },

    /// Raw value is absent where a table was required.
    #[error("Value cannot be null")]
    MissingValue,

    /// The table violates a constraint of its schema.
    #[error("Schema validation error: {0}")]
    SchemaViolation(#[from] SchemaViolation),

    /// No schema is registered for a bridged field.
    #[error("No schema registered for {model}.{field}")]
    NotRegistered { model: String, field: String },

    /// Reserved-looking name requested from a validated table.
    #[error("Validated table has no attribute '{name}'")]
    AttributeNotFound { name: String },

    /// Column does not exist in the table.
    #[error("Column not found: {name}")]
    ColumnNotFound { name: String },

    /// Input could be read but does not form a valid table.
    #[error("Invalid table: {0}")]
    InvalidTable(String),

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

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl BridgeError {
    /// Short machine-readable label for the error kind.
    pub fn kind(&self) -> &'static str {
        match self {
            BridgeError::UnsupportedInputType { .. } => "unsupported_input_type",
            BridgeError::MissingValue => "missing_value",
            BridgeError::SchemaViolation(_) => "schema_violation",
            BridgeError::NotRegistered { .. } => "not_registered",
            BridgeError::AttributeNotFound { .. } => "attribute_not_found",
            BridgeError::ColumnNotFound { .. } => "column_not_found",
            BridgeError::InvalidTable(_) => "invalid_table",
            BridgeError::Io { .. } => "io",
            BridgeError::Csv(_) => "csv",
            BridgeError::Json(_) => "json",
        }
    }
}

/// Result type alias for framebridge operations.
pub type Result<T> = std::result::Result<T, BridgeError>;
