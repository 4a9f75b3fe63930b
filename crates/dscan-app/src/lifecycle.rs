//! Document lifecycle: keeping managed files and metadata rows in step.
//!
//! Every operation touches the file first and the metadata row second. When
//! the row write fails, the file change is rolled back so the two never
//! disagree about a document that still shows up in the list.

use chrono::Local;
use dscan_core::models::{now_millis, scan_file_name};
use dscan_core::{AppError, DocumentRecord, RenameRequest};
use dscan_db::INSERT_FAILED;
use dscan_storage::{FileStorage, StorageError};
use std::path::Path;
use std::sync::Arc;
use validator::Validate;

use crate::repository::DocumentRepository;

/// How many numbered variants of a scan name are tried before giving up.
const MAX_NAME_ATTEMPTS: u32 = 100;

/// Name a file is moved to while its row is being deleted.
fn parked_name(id: &str) -> String {
    format!(".trash-{}", id)
}

/// `"scan.pdf"` with `n = 2` becomes `"scan (2).pdf"`.
fn numbered_name(name: &str, n: u32) -> String {
    match name.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() => format!("{} ({}).{}", stem, n, ext),
        _ => format!("{} ({})", name, n),
    }
}

#[derive(Clone)]
pub struct DocumentLifecycle {
    repository: DocumentRepository,
    storage: Arc<dyn FileStorage>,
}

impl DocumentLifecycle {
    pub fn new(repository: DocumentRepository, storage: Arc<dyn FileStorage>) -> Self {
        Self {
            repository,
            storage,
        }
    }

    pub fn repository(&self) -> &DocumentRepository {
        &self.repository
    }

    /// Copy a finished scan into managed storage and record it.
    ///
    /// The managed file is named after the local time of the import, with a
    /// ` (n)` suffix when that name is already taken. If the record cannot be
    /// inserted the copied file is removed again.
    #[tracing::instrument(skip(self, source), fields(source = %source.display()))]
    pub async fn import_scan(&self, source: &Path) -> Result<DocumentRecord, AppError> {
        let last_modified = now_millis();
        let base_name = scan_file_name(&last_modified.with_timezone(&Local));
        let name = self.copy_under_free_name(source, &base_name).await?;

        let size_bytes = match self.storage.size_of(&name).await {
            Ok(size) => i64::try_from(size).unwrap_or(i64::MAX),
            Err(e) => {
                self.discard(&name).await;
                return Err(e.into());
            }
        };
        let mut record = DocumentRecord::new(name.clone(), size_bytes);
        record.last_modified = last_modified;

        match self.repository.insert(record.clone()).await {
            Ok(INSERT_FAILED) => {
                self.discard(&name).await;
                Err(AppError::StorageWrite(format!(
                    "Document {} already exists",
                    record.id
                )))
            }
            Ok(_) => {
                tracing::info!(record_id = %record.id, name = %record.name, "Imported scan");
                Ok(record)
            }
            Err(e) => {
                self.discard(&name).await;
                Err(e)
            }
        }
    }

    /// Rename the managed file, then the record.
    ///
    /// Surrounding whitespace is dropped from `new_name`. A name equal to the
    /// current one ignoring case is a no-op and returns `Ok(None)`. Invalid
    /// names are rejected before anything is touched.
    #[tracing::instrument(skip(self, record), fields(record_id = %record.id))]
    pub async fn rename(
        &self,
        record: &DocumentRecord,
        new_name: &str,
    ) -> Result<Option<DocumentRecord>, AppError> {
        let new_name = new_name.trim();
        if !record.name_differs(new_name) {
            tracing::debug!(name = %record.name, "Rename skipped, name unchanged");
            return Ok(None);
        }
        RenameRequest::new(new_name).validate()?;

        if !self.storage.rename(&record.name, new_name).await? {
            return Err(AppError::FileOperation(format!(
                "Could not rename {} to {}",
                record.name, new_name
            )));
        }

        let updated = record.renamed(new_name);
        let outcome = match self.repository.update(updated.clone()).await {
            Ok(0) => Err(AppError::StorageWrite(format!(
                "Document {} no longer exists",
                record.id
            ))),
            Ok(_) => return Ok(Some(updated)),
            Err(e) => Err(e),
        };

        self.restore(new_name, &record.name).await;
        outcome
    }

    /// Remove the managed file and the record.
    ///
    /// The file is first moved aside under a hidden name; it is purged only
    /// once the row is gone, and moved back otherwise.
    #[tracing::instrument(skip(self, record), fields(record_id = %record.id))]
    pub async fn delete(&self, record: &DocumentRecord) -> Result<(), AppError> {
        let parked = parked_name(&record.id);

        if !self.storage.rename(&record.name, &parked).await? {
            return Err(AppError::FileOperation(format!(
                "Could not delete {}",
                record.name
            )));
        }

        let outcome = match self.repository.delete(record.clone()).await {
            Ok(0) => Err(AppError::StorageWrite(format!(
                "Document {} no longer exists",
                record.id
            ))),
            Ok(_) => {
                self.discard(&parked).await;
                return Ok(());
            }
            Err(e) => Err(e),
        };

        self.restore(&parked, &record.name).await;
        outcome
    }

    /// Shareable reference to the document's managed file.
    pub fn share_uri(&self, record: &DocumentRecord) -> Result<String, AppError> {
        Ok(self.storage.uri_for(&record.name)?)
    }

    async fn copy_under_free_name(&self, source: &Path, base_name: &str) -> Result<String, AppError> {
        let mut name = base_name.to_string();
        for attempt in 1..=MAX_NAME_ATTEMPTS {
            match self.storage.copy_into_managed(source, &name).await {
                Ok(()) => return Ok(name),
                Err(StorageError::AlreadyExists(taken)) => {
                    tracing::debug!(name = %taken, "Scan name taken, trying the next one");
                    name = numbered_name(base_name, attempt);
                }
                Err(e) => return Err(e.into()),
            }
        }
        Err(AppError::FileOperation(format!(
            "No free file name for {} after {} attempts",
            base_name, MAX_NAME_ATTEMPTS
        )))
    }

    /// Best-effort removal of a managed file.
    async fn discard(&self, name: &str) {
        match self.storage.delete(name).await {
            Ok(true) => {}
            Ok(false) => tracing::debug!(name = %name, "File already gone"),
            Err(e) => tracing::error!(error = %e, name = %name, "Failed to remove managed file"),
        }
    }

    /// Best-effort rollback of a file rename.
    async fn restore(&self, from: &str, to: &str) {
        match self.storage.rename(from, to).await {
            Ok(true) => tracing::info!(from = %from, to = %to, "Rolled back file rename"),
            Ok(false) => {
                tracing::error!(from = %from, to = %to, "Could not roll back file rename")
            }
            Err(e) => tracing::error!(
                error = %e,
                from = %from,
                to = %to,
                "Could not roll back file rename"
            ),
        }
    }
}
