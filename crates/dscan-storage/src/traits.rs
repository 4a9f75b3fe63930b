//! File storage abstraction trait
//!
//! This module defines the contract of the file-storage collaborator the
//! metadata layer relies on: copying scans in, renaming, deleting, sizing,
//! and producing shareable references.

use async_trait::async_trait;
use dscan_core::AppError;
use std::path::Path;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Copy failed: {0}")]
    CopyFailed(String),

    #[error("Rename failed: {0}")]
    RenameFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("File already exists: {0}")]
    AlreadyExists(String),

    #[error("Invalid file name: {0}")]
    InvalidName(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

impl From<StorageError> for AppError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::InvalidName(msg) => AppError::InvalidInput(msg),
            StorageError::NotFound(name) => AppError::NotFound(format!("File not found: {}", name)),
            other => AppError::FileOperation(other.to_string()),
        }
    }
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Managed file storage
///
/// Files are addressed by name. `rename` and `delete` report a missing source
/// (or an occupied rename target) as `Ok(false)` rather than an error, so
/// callers can decide whether that is fatal.
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Copy an external file (e.g. a finished scan) into managed storage as `dest_name`.
    async fn copy_into_managed(&self, source: &Path, dest_name: &str) -> StorageResult<()>;

    /// Rename a managed file. Never overwrites an existing file.
    async fn rename(&self, old_name: &str, new_name: &str) -> StorageResult<bool>;

    /// Delete a managed file.
    async fn delete(&self, name: &str) -> StorageResult<bool>;

    /// Size in bytes of a managed file.
    async fn size_of(&self, name: &str) -> StorageResult<u64>;

    /// Check if a managed file exists
    async fn exists(&self, name: &str) -> StorageResult<bool>;

    /// Shareable reference to a managed file.
    fn uri_for(&self, name: &str) -> StorageResult<String>;
}
