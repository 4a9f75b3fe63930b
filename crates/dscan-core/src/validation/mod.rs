//! Validation helpers for user-supplied document names

use validator::ValidationError;

/// Validate a document display name.
///
/// Rules:
/// - Not blank
/// - No path separators (`/`, `\`) and no `..`
/// - Must not start with `.` (hidden names are reserved for in-flight deletions)
pub fn validate_document_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        return Err(ValidationError::new("blank_name")
            .with_message("Document name cannot be empty".into()));
    }

    if name.contains('/') || name.contains('\\') || name.contains("..") {
        return Err(ValidationError::new("path_in_name")
            .with_message("Document name cannot contain path separators".into()));
    }

    if name.starts_with('.') {
        return Err(ValidationError::new("hidden_name")
            .with_message("Document name cannot start with '.'".into()));
    }

    Ok(())
}
