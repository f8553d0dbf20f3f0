//! Error types for the campus server.

use thiserror::Error;

/// Common error type for campus operations.
#[derive(Error, Debug)]
pub enum CampusError {
    /// Database error.
    ///
    /// Wraps errors from the sqlx backend as strings so callers do not
    /// depend on driver-specific error types.
    #[error("database error: {0}")]
    Database(String),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Authentication error (bad credentials, invalid session).
    #[error("authentication error: {0}")]
    Auth(String),

    /// Permission denied error.
    #[error("permission denied: {0}")]
    Permission(String),

    /// Validation error for user input.
    #[error("validation error: {0}")]
    Validation(String),

    /// Resource not found.
    #[error("{0} not found")]
    NotFound(String),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

impl From<sqlx::Error> for CampusError {
    fn from(e: sqlx::Error) -> Self {
        CampusError::Database(e.to_string())
    }
}

/// Result type alias for campus operations.
pub type Result<T> = std::result::Result<T, CampusError>;
