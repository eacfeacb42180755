use std::io;
use thiserror::Error;

use crate::classifier::ClassificationError;

/// Application-wide error type, consolidating all possible errors into a single enum.
#[derive(Debug, Error)]
pub enum AppError {
    /// The complaint store failed to read or write a record, typically from `sqlx`.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Filesystem failures outside photo uploads (e.g. creating the data directories).
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The classifier could not produce an analysis.
    #[error("Classification failed: {0}")]
    Classification(#[from] ClassificationError),

    /// Represents data validation errors (e.g., complaint text too short).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Represents configuration-related errors (e.g., malformed environment variables).
    #[error("Configuration error: {0}")]
    Config(String),

    /// The request carries no caller identity.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The caller is known but may not perform the operation.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// Represents unexpected internal errors that indicate a bug.
    #[error("Internal error: {0}")]
    Internal(String),

    /// Represents an error indicating that a rate limit has been exceeded.
    #[error("Rate limit exceeded")]
    RateLimited,
}

impl From<url::ParseError> for AppError {
    fn from(err: url::ParseError) -> Self {
        AppError::Config(format!("URL parse error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::Validation(format!("Validation errors: {}", err))
    }
}

impl From<base64::DecodeError> for AppError {
    fn from(err: base64::DecodeError) -> Self {
        AppError::Validation(format!("Invalid base64 image data: {}", err))
    }
}
