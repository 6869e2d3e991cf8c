//! Munin error types

use std::time::Duration;

/// Munin error types.
///
/// `Clone` is required: a single in-flight failure fans out to every caller
/// attached to the same query hash, and each waiter gets its own copy.
#[derive(Debug, Clone, thiserror::Error)]
pub enum MuninError {
    // Adapter/network errors
    #[error("adapter error: {0}")]
    Adapter(String),

    #[error("backend error ({status}): {message}")]
    Backend { status: u16, message: String },

    #[error("query timed out after {0:?}")]
    Timeout(Duration),

    // Data errors
    #[error("JSON error: {0}")]
    Json(String),

    #[error("invalid query: {0}")]
    InvalidQuery(String),

    // Configuration errors
    #[error("no adapter configured")]
    NoAdapter,

    #[error("configuration error: {0}")]
    Configuration(String),

    /// The execution task dropped its completion channel without settling.
    /// Not expected in normal operation.
    #[error("query execution was canceled")]
    Canceled,
}

impl From<serde_json::Error> for MuninError {
    fn from(err: serde_json::Error) -> Self {
        MuninError::Json(err.to_string())
    }
}

/// Result type alias for Munin operations
pub type Result<T> = std::result::Result<T, MuninError>;
