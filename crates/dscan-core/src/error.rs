//! Error types module
//!
//! This module provides the core error types used throughout DScan.
//! All errors are unified under the `AppError` enum, which covers the metadata
//! store, the file-storage collaborator, and input validation.
//!
//! The `Database` variant wraps `sqlx::Error` only when the `sqlx` feature is enabled.
//! With `default-features = false` it carries the rendered message instead.

use std::io;

#[cfg(feature = "sqlx")]
use sqlx::Error as SqlxError;

use crate::constants::DEFAULT_ERROR_MESSAGE;

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata describing how an error should be presented to the user
pub trait ErrorMetadata {
    /// Machine-readable error code (e.g., "STORAGE_WRITE_FAILURE")
    fn error_code(&self) -> &'static str;

    /// User-facing message (may differ from the internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[cfg(feature = "sqlx")]
    #[error("Database error: {0}")]
    Database(#[source] SqlxError),

    #[cfg(not(feature = "sqlx"))]
    #[error("Database error: {0}")]
    Database(String),

    /// An insert, update, or delete affected no rows.
    #[error("Storage write failure: {0}")]
    StorageWrite(String),

    /// The live query failed.
    #[error("Storage read failure: {0}")]
    StorageRead(String),

    /// A rename or delete on the file-storage collaborator did not succeed.
    #[error("File operation failure: {0}")]
    FileOperation(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

#[cfg(feature = "sqlx")]
impl From<SqlxError> for AppError {
    fn from(err: SqlxError) -> Self {
        AppError::Database(err)
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::migrate::MigrateError> for AppError {
    fn from(err: sqlx::migrate::MigrateError) -> Self {
        AppError::Internal(format!("Migration error: {}", err))
    }
}

impl From<io::Error> for AppError {
    fn from(err: io::Error) -> Self {
        AppError::Internal(format!("IO error: {}", err))
    }
}

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        AppError::InvalidInput(format!("Validation error: {}", err))
    }
}

/// Static metadata for each variant: (error_code, log_level).
fn app_error_static_metadata(err: &AppError) -> (&'static str, LogLevel) {
    match err {
        AppError::Database(_) => ("DATABASE_ERROR", LogLevel::Error),
        AppError::StorageWrite(_) => ("STORAGE_WRITE_FAILURE", LogLevel::Warn),
        AppError::StorageRead(_) => ("STORAGE_READ_FAILURE", LogLevel::Error),
        AppError::FileOperation(_) => ("FILE_OPERATION_FAILURE", LogLevel::Warn),
        AppError::InvalidInput(_) => ("INVALID_INPUT", LogLevel::Debug),
        AppError::NotFound(_) => ("NOT_FOUND", LogLevel::Debug),
        AppError::Internal(_) => ("INTERNAL_ERROR", LogLevel::Error),
    }
}

impl AppError {
    /// Get detailed error information including error chain
    pub fn detailed_message(&self) -> String {
        use std::error::Error;

        let mut details = self.to_string();

        let mut source = self.source();
        let mut depth = 0;
        while let Some(err) = source {
            depth += 1;
            if depth > 5 {
                details.push_str("\n  ... (truncated)");
                break;
            }
            details.push_str(&format!("\n  Caused by: {}", err));
            source = err.source();
        }

        details
    }
}

impl ErrorMetadata for AppError {
    fn error_code(&self) -> &'static str {
        app_error_static_metadata(self).0
    }

    fn log_level(&self) -> LogLevel {
        app_error_static_metadata(self).1
    }

    fn client_message(&self) -> String {
        let message = match self {
            AppError::Database(_) => "Failed to access the document database".to_string(),
            AppError::StorageWrite(ref msg) => msg.clone(),
            AppError::StorageRead(ref msg) => msg.clone(),
            AppError::FileOperation(ref msg) => msg.clone(),
            AppError::InvalidInput(ref msg) => msg.clone(),
            AppError::NotFound(ref msg) => msg.clone(),
            AppError::Internal(_) => DEFAULT_ERROR_MESSAGE.to_string(),
        };
        if message.trim().is_empty() {
            DEFAULT_ERROR_MESSAGE.to_string()
        } else {
            message
        }
    }
}
