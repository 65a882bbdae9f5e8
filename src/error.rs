//! Error types for MonkeLogger Core

use rusqlite::ErrorCode;
use thiserror::Error;

/// Main error type for storage operations
#[derive(Error, Debug)]
pub enum StorageError {
    /// The database file could not be opened or reached
    #[error("Connection error: {0}")]
    Connection(String),

    /// Uniqueness or foreign-key violation
    #[error("Constraint violation: {0}")]
    Constraint(String),

    /// Caller-supplied value rejected before reaching storage
    #[error("Validation error: {0}")]
    Validation(String),

    /// Any other database failure
    #[error("Database error: {0}")]
    Database(String),

    /// Theme not found
    #[error("Theme not found: {0}")]
    ThemeNotFound(String),

    /// Data type not found
    #[error("Data type not found: {0}")]
    DataTypeNotFound(i64),

    /// Database was written by a newer schema than this build knows
    #[error("Invalid database version: {0}")]
    InvalidVersion(String),

    /// Configuration could not be loaded
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding or decoding failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::ConstraintViolation) => StorageError::Constraint(err.to_string()),
            Some(ErrorCode::CannotOpen) | Some(ErrorCode::NotADatabase) => {
                StorageError::Connection(err.to_string())
            }
            _ => StorageError::Database(err.to_string()),
        }
    }
}

/// Result type alias for storage operations
pub type Result<T> = std::result::Result<T, StorageError>;
