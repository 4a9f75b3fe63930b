//! Shared name checks for managed files.

use crate::traits::{StorageError, StorageResult};

/// Reject names that would resolve outside the managed directory.
pub fn check_name(name: &str) -> StorageResult<()> {
    if name.is_empty() || name == "." {
        return Err(StorageError::InvalidName("File name is empty".to_string()));
    }
    if name.contains("..") || name.contains('/') || name.contains('\\') {
        return Err(StorageError::InvalidName(format!(
            "File name contains path components: {}",
            name
        )));
    }
    Ok(())
}
