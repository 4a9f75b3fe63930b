//! DScan Core Library
//!
//! This crate provides the document metadata model, the tri-state result type
//! published to the display layer, error types, and configuration shared by
//! every DScan component.

pub mod config;
pub mod constants;
pub mod error;
pub mod models;
pub mod validation;

// Re-export commonly used types
pub use config::Config;
pub use error::{AppError, ErrorMetadata, LogLevel};
pub use models::{DocumentRecord, Notice, RenameRequest, Resource};
