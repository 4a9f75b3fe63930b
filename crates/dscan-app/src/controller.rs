//! Application state controller
//!
//! Owns everything the display layer observes:
//!
//! - the document list as a [`Resource`], starting at `Idle`, moving to
//!   `Loading` when [`AppStateController::start`] is called and then tracking
//!   the store's live query;
//! - the [`ViewState`] (theme, rename dialog, loading indicators);
//! - a queue of one-shot [`Notice`]s, one per finished mutation.
//!
//! Mutations are fire-and-forget from the caller's point of view. Each one
//! runs as its own task, raises the loading indicator for its own duration,
//! and reports its outcome as exactly one notice. Store work is moved to the
//! background executor by the repository.

use dscan_core::constants::{MSG_DELETED, MSG_INSERTED, MSG_UPDATED};
use dscan_core::{AppError, DocumentRecord, ErrorMetadata, LogLevel, Notice, Resource};
use dscan_db::INSERT_FAILED;
use futures::StreamExt;
use std::future::Future;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::lifecycle::DocumentLifecycle;
use crate::notices::{notice_channel, NoticeReceiver, NoticeSender};
use crate::repository::DocumentRepository;
use crate::scanner::ScanOutcome;
use crate::state::{Action, ViewState};

pub type DocumentList = Resource<Vec<DocumentRecord>>;

pub struct AppStateController {
    lifecycle: DocumentLifecycle,
    documents: Arc<watch::Sender<DocumentList>>,
    view: Arc<watch::Sender<ViewState>>,
    notices: NoticeSender,
    notice_receiver: Mutex<Option<NoticeReceiver>>,
    started: AtomicBool,
    cancel: CancellationToken,
}

impl AppStateController {
    pub fn new(lifecycle: DocumentLifecycle, notice_capacity: usize, dark_mode: bool) -> Arc<Self> {
        let (documents, _) = watch::channel(Resource::Idle);
        let (view, _) = watch::channel(ViewState::with_dark_mode(dark_mode));
        let (notices, notice_receiver) = notice_channel(notice_capacity);

        Arc::new(Self {
            lifecycle,
            documents: Arc::new(documents),
            view: Arc::new(view),
            notices,
            notice_receiver: Mutex::new(Some(notice_receiver)),
            started: AtomicBool::new(false),
            cancel: CancellationToken::new(),
        })
    }

    fn repository(&self) -> &DocumentRepository {
        self.lifecycle.repository()
    }

    /// Subscribe to the store's live document list.
    ///
    /// Publishes `Loading`, then `Success` with every snapshot. A failure is
    /// published as `Error` and ends the subscription. Calling this again
    /// has no effect.
    pub fn start(&self) {
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::debug!("Document subscription already started");
            return;
        }

        self.documents.send_replace(Resource::Loading);
        apply(&self.view, Action::ListLoading(true));

        let mut stream = self.repository().documents();
        let documents = Arc::clone(&self.documents);
        let view = Arc::clone(&self.view);
        let cancel = self.cancel.clone();

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        tracing::debug!("Document subscription cancelled");
                        break;
                    }
                    item = stream.next() => match item {
                        Some(Ok(records)) => {
                            tracing::debug!(count = records.len(), "Document list updated");
                            documents.send_replace(Resource::Success(records));
                            apply(&view, Action::ListLoading(false));
                        }
                        Some(Err(e)) => {
                            tracing::error!(error = %e, "Document list subscription failed");
                            documents.send_replace(Resource::Error(e.client_message()));
                            apply(&view, Action::ListLoading(false));
                            break;
                        }
                        None => {
                            tracing::warn!("Document list subscription ended");
                            apply(&view, Action::ListLoading(false));
                            break;
                        }
                    }
                }
            }
        });
    }

    /// Stop the live subscription. The last published list stays visible.
    pub fn shutdown(&self) {
        self.cancel.cancel();
    }

    pub fn documents(&self) -> watch::Receiver<DocumentList> {
        self.documents.subscribe()
    }

    pub fn current_documents(&self) -> DocumentList {
        self.documents.borrow().clone()
    }

    pub fn view_state(&self) -> watch::Receiver<ViewState> {
        self.view.subscribe()
    }

    pub fn current_view_state(&self) -> ViewState {
        self.view.borrow().clone()
    }

    /// Hand out the notice queue. Only the first caller gets it.
    pub fn take_notices(&self) -> Option<NoticeReceiver> {
        match self.notice_receiver.lock() {
            Ok(mut slot) => slot.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        }
    }

    pub fn set_dark_mode(&self, enabled: bool) {
        apply(&self.view, Action::SetDarkMode(enabled));
    }

    pub fn open_rename_dialog(&self, record: DocumentRecord) {
        apply(&self.view, Action::OpenRenameDialog(record));
    }

    pub fn dismiss_rename_dialog(&self) {
        apply(&self.view, Action::DismissRenameDialog);
    }

    /// Insert a record. An id that is already taken is reported as an error notice.
    pub fn insert_document(self: &Arc<Self>, record: DocumentRecord) -> JoinHandle<()> {
        let repository = self.repository().clone();
        self.run_mutation("insert", async move {
            let record_id = record.id.clone();
            match repository.insert(record).await? {
                INSERT_FAILED => Err(AppError::StorageWrite(format!(
                    "Document {} already exists",
                    record_id
                ))),
                _ => Ok(MSG_INSERTED),
            }
        })
    }

    /// Replace the stored record with the same id.
    pub fn update_document(self: &Arc<Self>, record: DocumentRecord) -> JoinHandle<()> {
        let repository = self.repository().clone();
        self.run_mutation("update", async move {
            let record_id = record.id.clone();
            match repository.update(record).await? {
                0 => Err(AppError::StorageWrite(format!(
                    "Document {} does not exist",
                    record_id
                ))),
                _ => Ok(MSG_UPDATED),
            }
        })
    }

    /// Delete the stored record with the same id. The managed file is left alone.
    pub fn delete_document(self: &Arc<Self>, record: DocumentRecord) -> JoinHandle<()> {
        let repository = self.repository().clone();
        self.run_mutation("delete", async move {
            let record_id = record.id.clone();
            match repository.delete(record).await? {
                0 => Err(AppError::StorageWrite(format!(
                    "Document {} does not exist",
                    record_id
                ))),
                _ => Ok(MSG_DELETED),
            }
        })
    }

    /// Import the result of a scan. A cancelled scan does nothing.
    pub fn import_scan(self: &Arc<Self>, outcome: ScanOutcome) -> Option<JoinHandle<()>> {
        let pdf: PathBuf = match outcome {
            ScanOutcome::Completed { pdf } => pdf,
            ScanOutcome::Cancelled => {
                tracing::debug!("Scan cancelled, nothing to import");
                return None;
            }
        };

        let lifecycle = self.lifecycle.clone();
        Some(self.run_mutation("import", async move {
            lifecycle.import_scan(&pdf).await?;
            Ok::<_, AppError>(MSG_INSERTED)
        }))
    }

    /// Rename a document's file and record, closing the rename dialog.
    ///
    /// Returns `None` without touching anything when the trimmed new name
    /// equals the current one ignoring case.
    pub fn rename_document(
        self: &Arc<Self>,
        record: DocumentRecord,
        new_name: impl Into<String>,
    ) -> Option<JoinHandle<()>> {
        let new_name = new_name.into().trim().to_string();
        self.dismiss_rename_dialog();

        if !record.name_differs(&new_name) {
            tracing::debug!(record_id = %record.id, "Rename skipped, name unchanged");
            return None;
        }

        let lifecycle = self.lifecycle.clone();
        Some(self.run_mutation("rename", async move {
            lifecycle.rename(&record, &new_name).await?;
            Ok::<_, AppError>(MSG_UPDATED)
        }))
    }

    /// Delete a document's managed file together with its record.
    pub fn delete_document_with_file(self: &Arc<Self>, record: DocumentRecord) -> JoinHandle<()> {
        self.dismiss_rename_dialog();
        let lifecycle = self.lifecycle.clone();
        self.run_mutation("delete", async move {
            lifecycle.delete(&record).await?;
            Ok::<_, AppError>(MSG_DELETED)
        })
    }

    pub fn share_uri(&self, record: &DocumentRecord) -> Result<String, AppError> {
        self.lifecycle.share_uri(record)
    }

    fn run_mutation<F>(self: &Arc<Self>, operation: &'static str, mutation: F) -> JoinHandle<()>
    where
        F: Future<Output = Result<&'static str, AppError>> + Send + 'static,
    {
        apply(&self.view, Action::MutationStarted);
        let this = Arc::clone(self);

        tokio::spawn(async move {
            let notice = match mutation.await {
                Ok(message) => {
                    tracing::info!(operation, "Mutation succeeded");
                    Notice::Success(message.to_string())
                }
                Err(e) => {
                    log_mutation_error(operation, &e);
                    Notice::Error(e.client_message())
                }
            };
            this.notices.send(notice);
            apply(&this.view, Action::MutationFinished);
        })
    }
}

impl Drop for AppStateController {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

fn apply(view: &watch::Sender<ViewState>, action: Action) {
    view.send_modify(|state| {
        let current = std::mem::take(state);
        *state = current.reduce(action);
    });
}

fn log_mutation_error(operation: &'static str, error: &AppError) {
    match error.log_level() {
        LogLevel::Debug => tracing::debug!(
            operation,
            error = %error,
            error_code = error.error_code(),
            "Mutation rejected"
        ),
        LogLevel::Warn => tracing::warn!(
            operation,
            error = %error,
            error_code = error.error_code(),
            "Mutation failed"
        ),
        LogLevel::Error => tracing::error!(
            operation,
            error = %error.detailed_message(),
            error_code = error.error_code(),
            "Mutation failed"
        ),
    }
}
