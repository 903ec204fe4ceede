//! Error types for SentiScope

/// Result type alias using SentiScope's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for SentiScope operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing or malformed request input
    #[error("validation error: {0}")]
    Validation(String),

    /// A lookup that expected at least one row found none
    #[error("not found: {0}")]
    NotFound(String),

    /// Configuration and startup errors (missing model files, bad head size, ...)
    #[error("configuration error: {0}")]
    Config(String),

    /// Model execution errors
    #[error("inference error: {0}")]
    Inference(String),

    /// Network/IO errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic internal errors
    #[error("internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a new validation error
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Create a new not-found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new inference error
    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }

    /// Create a new internal error
    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    /// Whether this error should stop the process instead of failing one request
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::Config(_))
    }
}
