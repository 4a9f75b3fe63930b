use chrono::{DateTime, Duration, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

use crate::validation::validate_document_name;

/// Metadata of one stored PDF document.
///
/// `id` is assigned once at creation and never reused. Only `name` and
/// `last_modified` change afterwards (on rename); `size_bytes` is taken from
/// the managed file at creation and not recomputed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: String,
    pub name: String,
    pub size_bytes: i64,
    pub last_modified: DateTime<Utc>,
}

impl DocumentRecord {
    /// Create a record with a fresh random id, stamped with the current time.
    pub fn new(name: impl Into<String>, size_bytes: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            size_bytes,
            last_modified: now_millis(),
        }
    }

    /// Copy of this record carrying `new_name` and a fresh modification time.
    pub fn renamed(&self, new_name: impl Into<String>) -> Self {
        Self {
            id: self.id.clone(),
            name: new_name.into(),
            size_bytes: self.size_bytes,
            last_modified: now_millis(),
        }
    }

    /// True when `candidate` differs from the current name ignoring case.
    pub fn name_differs(&self, candidate: &str) -> bool {
        self.name.to_lowercase() != candidate.to_lowercase()
    }
}

/// Current time truncated to whole milliseconds, the precision the store keeps.
pub fn now_millis() -> DateTime<Utc> {
    let now = Utc::now();
    let sub_millis = i64::from(now.timestamp_subsec_nanos() % 1_000_000);
    now - Duration::nanoseconds(sub_millis)
}

/// Default display name of a freshly scanned document, e.g. `19-Oct-26 14:03:27.pdf`.
pub fn scan_file_name<Tz>(at: &DateTime<Tz>) -> String
where
    Tz: TimeZone,
    Tz::Offset: fmt::Display,
{
    at.format("%d-%b-%y %H:%M:%S.pdf").to_string()
}

/// Rename input as typed by the user
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RenameRequest {
    #[validate(
        length(
            min = 1,
            max = 255,
            message = "Document name must be between 1 and 255 characters"
        ),
        custom(function = "validate_document_name")
    )]
    pub name: String,
}

impl RenameRequest {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;

    #[test]
    fn test_new_record_has_unique_ids() {
        let a = DocumentRecord::new("a.pdf", 10);
        let b = DocumentRecord::new("a.pdf", 10);
        assert_ne!(a.id, b.id);
        assert!(Uuid::parse_str(&a.id).is_ok());
    }

    #[test]
    fn test_now_millis_has_no_sub_millisecond_part() {
        let ts = now_millis();
        assert_eq!(ts.timestamp_subsec_nanos() % 1_000_000, 0);
    }

    #[test]
    fn test_renamed_keeps_id_and_size() {
        let original = DocumentRecord {
            id: "a1".to_string(),
            name: "x.pdf".to_string(),
            size_bytes: 1024,
            last_modified: DateTime::from_timestamp_millis(0).unwrap(),
        };
        let renamed = original.renamed("y.pdf");
        assert_eq!(renamed.id, "a1");
        assert_eq!(renamed.size_bytes, 1024);
        assert_eq!(renamed.name, "y.pdf");
        assert!(renamed.last_modified > original.last_modified);
    }

    #[test]
    fn test_name_differs_ignores_case() {
        let record = DocumentRecord::new("Invoice.PDF", 1);
        assert!(!record.name_differs("invoice.pdf"));
        assert!(record.name_differs("invoice-2.pdf"));
    }

    #[test]
    fn test_scan_file_name_format() {
        let offset = FixedOffset::east_opt(0).unwrap();
        let at = offset.with_ymd_and_hms(2026, 10, 19, 14, 3, 27).unwrap();
        assert_eq!(scan_file_name(&at), "19-Oct-26 14:03:27.pdf");
    }

    #[test]
    fn test_rename_request_validation() {
        assert!(RenameRequest::new("report.pdf").validate().is_ok());
        assert!(RenameRequest::new("").validate().is_err());
        assert!(RenameRequest::new("   ").validate().is_err());
        assert!(RenameRequest::new("../escape.pdf").validate().is_err());
        assert!(RenameRequest::new("a".repeat(256)).validate().is_err());
    }
}
