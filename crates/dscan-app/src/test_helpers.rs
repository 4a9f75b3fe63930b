//! Test helpers for application-layer unit tests
//!
//! Real SQLite stores (in memory) for the happy path, plus stores that fail
//! on demand so error paths can be exercised without breaking a database.

use async_trait::async_trait;
use chrono::DateTime;
use dscan_core::{AppError, DocumentRecord};
use dscan_db::{Database, DocumentStore, DocumentStream, SqliteDocumentStore};
use futures::future;
use futures::stream::{self, StreamExt};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Notify;

pub fn record(id: &str, name: &str, millis: i64) -> DocumentRecord {
    DocumentRecord {
        id: id.to_string(),
        name: name.to_string(),
        size_bytes: 2048,
        last_modified: DateTime::from_timestamp_millis(millis).unwrap(),
    }
}

pub async fn sqlite_store() -> Arc<dyn DocumentStore> {
    let db = Database::connect_in_memory().await.unwrap();
    Arc::new(SqliteDocumentStore::new(&db))
}

/// Store where every operation fails.
pub struct FailingStore;

impl FailingStore {
    pub fn shared() -> Arc<dyn DocumentStore> {
        Arc::new(FailingStore)
    }
}

#[async_trait]
impl DocumentStore for FailingStore {
    async fn insert(&self, _record: &DocumentRecord) -> Result<i64, AppError> {
        Err(AppError::StorageWrite("disk full".to_string()))
    }

    async fn update(&self, _record: &DocumentRecord) -> Result<u64, AppError> {
        Err(AppError::StorageWrite("disk full".to_string()))
    }

    async fn delete(&self, _record: &DocumentRecord) -> Result<u64, AppError> {
        Err(AppError::StorageWrite("disk full".to_string()))
    }

    fn observe_all(&self) -> DocumentStream {
        stream::once(async {
            Err::<Vec<DocumentRecord>, _>(AppError::StorageRead("database is locked".to_string()))
        })
        .boxed()
    }
}

/// SQLite store with switchable write failures.
#[derive(Clone)]
pub struct FaultyStore {
    inner: SqliteDocumentStore,
    fail_writes: Arc<AtomicBool>,
}

impl FaultyStore {
    pub async fn new() -> Self {
        let db = Database::connect_in_memory().await.unwrap();
        Self {
            inner: SqliteDocumentStore::new(&db),
            fail_writes: Arc::new(AtomicBool::new(false)),
        }
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub async fn all(&self) -> Vec<DocumentRecord> {
        self.inner.fetch_all().await.unwrap()
    }

    fn check(&self) -> Result<(), AppError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            Err(AppError::StorageWrite("injected write failure".to_string()))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl DocumentStore for FaultyStore {
    async fn insert(&self, record: &DocumentRecord) -> Result<i64, AppError> {
        self.check()?;
        self.inner.insert(record).await
    }

    async fn update(&self, record: &DocumentRecord) -> Result<u64, AppError> {
        self.check()?;
        self.inner.update(record).await
    }

    async fn delete(&self, record: &DocumentRecord) -> Result<u64, AppError> {
        self.check()?;
        self.inner.delete(record).await
    }

    fn observe_all(&self) -> DocumentStream {
        self.inner.observe_all()
    }
}

/// What a [`GatedStore`] live query does once released.
#[derive(Clone, Debug)]
pub enum GatedOutcome {
    /// Yield one snapshot, then stay open without further changes.
    Snapshot(Vec<DocumentRecord>),
    /// Yield one read error.
    Failure,
    /// End without yielding anything.
    Ended,
}

/// Read-only store whose live query holds its first result until [`GatedStore::release`].
pub struct GatedStore {
    release: Arc<Notify>,
    outcome: GatedOutcome,
}

impl GatedStore {
    pub fn new(outcome: GatedOutcome) -> Arc<Self> {
        Arc::new(Self {
            release: Arc::new(Notify::new()),
            outcome,
        })
    }

    pub fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl DocumentStore for GatedStore {
    async fn insert(&self, _record: &DocumentRecord) -> Result<i64, AppError> {
        Err(AppError::StorageWrite("read-only store".to_string()))
    }

    async fn update(&self, _record: &DocumentRecord) -> Result<u64, AppError> {
        Err(AppError::StorageWrite("read-only store".to_string()))
    }

    async fn delete(&self, _record: &DocumentRecord) -> Result<u64, AppError> {
        Err(AppError::StorageWrite("read-only store".to_string()))
    }

    fn observe_all(&self) -> DocumentStream {
        let release = Arc::clone(&self.release);
        let held = async move { release.notified().await };

        match self.outcome.clone() {
            GatedOutcome::Snapshot(records) => stream::once(async move {
                held.await;
                Ok(records)
            })
            .chain(stream::pending())
            .boxed(),
            GatedOutcome::Failure => stream::once(async move {
                held.await;
                Err(AppError::StorageRead("database is locked".to_string()))
            })
            .boxed(),
            GatedOutcome::Ended => stream::once(held)
                .filter_map(|()| future::ready(None::<Result<Vec<DocumentRecord>, AppError>>))
                .boxed(),
        }
    }
}
