//! Error types for the record store

use thiserror::Error;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors specific to database operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    /// A lookup that expected rows found none
    #[error("{0}")]
    NotFound(String),

    /// A bulk import row could not be used
    #[error("Import failed: {0}")]
    Import(String),

    /// The blocking task running the query panicked or was cancelled
    #[error("Database task failed: {0}")]
    Blocking(#[from] tokio::task::JoinError),

    #[error("Failed to create database directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid CSV: {0}")]
    Csv(#[from] csv::Error),
}

impl StoreError {
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }
}

impl From<StoreError> for sentiscope_core::Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound(msg) => Self::NotFound(msg),
            StoreError::Import(msg) => Self::Validation(msg),
            StoreError::Io(e) => Self::Io(e),
            StoreError::Json(e) => Self::Serialization(e),
            other => Self::Internal(other.to_string()),
        }
    }
}
