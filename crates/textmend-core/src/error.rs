//! Error types for textmend

use thiserror::Error;

/// Result type alias for textmend operations
pub type MendResult<T> = Result<T, MendError>;

/// Main error type for textmend
///
/// The enum is `Clone` so a single result can be fanned out to every
/// caller waiting on a deduplicated in-flight request.
#[derive(Error, Debug, Clone)]
pub enum MendError {
    /// Configuration related errors (missing or invalid credential)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Transient correction-service errors (empty body, rate limit, network)
    #[error("Correction service error: {0}")]
    Service(String),

    /// Malformed structured payload from a detailed correction request
    #[error("Parse error: {0}")]
    Parse(String),

    /// Cache errors
    #[error("Cache error: {0}")]
    Cache(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(String),

    /// HTTP request errors
    #[error("HTTP error: {0}")]
    Http(String),

    /// No document, editor, or selection available for the operation
    #[error("No active document or selection")]
    NoActiveTarget,

    /// Top of the undo stack does not correspond to the active document
    #[error("Undo entry does not match the active document")]
    UndoMismatch,

    /// Operation was cancelled
    #[error("Operation was cancelled")]
    Cancelled,

    /// Generic error with context
    #[error("Error: {0}")]
    Other(String),
}

impl MendError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a new correction-service error
    pub fn service(message: impl Into<String>) -> Self {
        Self::Service(message.into())
    }

    /// Create a new parse error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Create a new cache error
    pub fn cache(message: impl Into<String>) -> Self {
        Self::Cache(message.into())
    }

    /// Create a new generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }

    /// Whether a failed request is worth retrying.
    ///
    /// Configuration problems and cancellation never are; service and
    /// transport failures are assumed transient.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Service(_) | Self::Http(_))
    }
}

impl From<anyhow::Error> for MendError {
    fn from(error: anyhow::Error) -> Self {
        Self::Other(error.to_string())
    }
}

impl From<serde_json::Error> for MendError {
    fn from(error: serde_json::Error) -> Self {
        Self::Json(error.to_string())
    }
}

impl From<reqwest::Error> for MendError {
    fn from(error: reqwest::Error) -> Self {
        Self::Http(error.to_string())
    }
}
