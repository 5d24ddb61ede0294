//! Error types for newsrelay.

use thiserror::Error;

/// Common error type for newsrelay.
#[derive(Error, Debug)]
pub enum RelayError {
    /// Database error.
    ///
    /// Errors from sqlx are converted into this variant.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP fetch of a source failed.
    #[error("fetch error: {0}")]
    Fetch(String),

    /// RSS/Atom payload could not be parsed.
    #[error("feed error: {0}")]
    Feed(String),

    /// A topic pattern failed to compile.
    #[error("filter error: {0}")]
    Filter(String),

    /// Message delivery to a destination failed.
    #[error("delivery error: {0}")]
    Delivery(String),

    /// Translation request failed.
    #[error("translation error: {0}")]
    Translation(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Validation error.
    #[error("validation error: {0}")]
    Validation(String),
}

impl From<sqlx::Error> for RelayError {
    fn from(e: sqlx::Error) -> Self {
        RelayError::Database(e.to_string())
    }
}

/// Result type alias for newsrelay operations.
pub type Result<T> = std::result::Result<T, RelayError>;
