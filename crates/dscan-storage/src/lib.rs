//! DScan Storage Library
//!
//! This crate provides the file-storage abstraction for managed PDF files and
//! its local filesystem implementation.
//!
//! # File names
//!
//! Managed files live flat in a single directory and are addressed by their
//! display name. Names must not be empty and must not contain `/`, `\` or `..`.
//! Name checks are centralized in the `names` module so every operation agrees.

pub mod factory;
pub(crate) mod names;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
pub use local::LocalStorage;
pub use traits::{FileStorage, StorageError, StorageResult};
