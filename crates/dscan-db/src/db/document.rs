//! Document metadata store: CRUD for the documents table plus a live query.

use async_trait::async_trait;
use chrono::DateTime;
use dscan_core::{AppError, DocumentRecord};
use futures::stream::{self, BoxStream, StreamExt};
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection};
use sqlx::{ConnectOptions, Sqlite, SqlitePool};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

use super::pool::Database;

/// Returned by [`DocumentStore::insert`] when a row with the same id already exists.
pub const INSERT_FAILED: i64 = -1;

/// How often a live query over a database file checks for commits made by
/// other connections or processes.
pub const EXTERNAL_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Unbounded sequence of full snapshots, most recently modified first.
pub type DocumentStream = BoxStream<'static, Result<Vec<DocumentRecord>, AppError>>;

/// Persistent store of document metadata, keyed by record id.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Add a new record and return its row id, or [`INSERT_FAILED`] if the id is taken.
    async fn insert(&self, record: &DocumentRecord) -> Result<i64, AppError>;

    /// Replace the row matching `record.id`; returns the number of rows affected.
    async fn update(&self, record: &DocumentRecord) -> Result<u64, AppError>;

    /// Remove the row matching `record.id`; returns the number of rows affected.
    async fn delete(&self, record: &DocumentRecord) -> Result<u64, AppError>;

    /// Live query over all records ordered by `last_modified` descending.
    ///
    /// The current snapshot is yielded first, then a new one after every change.
    /// The sequence only ends after yielding an error, or when the consumer drops it.
    fn observe_all(&self) -> DocumentStream;
}

/// Row type for the documents table (for FromRow).
#[derive(Debug, sqlx::FromRow)]
pub struct DocumentRow {
    pub id: String,
    pub name: String,
    pub size_bytes: i64,
    /// Unix epoch milliseconds.
    pub last_modified: i64,
}

impl DocumentRow {
    pub fn into_record(self) -> Result<DocumentRecord, AppError> {
        let last_modified = DateTime::from_timestamp_millis(self.last_modified).ok_or_else(|| {
            AppError::StorageRead(format!(
                "Document {} has an out-of-range timestamp {}",
                self.id, self.last_modified
            ))
        })?;
        Ok(DocumentRecord {
            id: self.id,
            name: self.name,
            size_bytes: self.size_bytes,
            last_modified,
        })
    }
}

/// SQLite-backed [`DocumentStore`].
///
/// Every write that touches at least one row bumps a version counter; live
/// queries re-read the table when they observe a new version. Versions bumped
/// while a snapshot is being read collapse into a single re-read.
///
/// On a database file, live queries also poll `PRAGMA data_version` on a
/// connection of their own, so commits from other stores or processes wake
/// them too.
#[derive(Clone)]
pub struct SqliteDocumentStore {
    pool: SqlitePool,
    version: Arc<watch::Sender<u64>>,
    file_options: Option<SqliteConnectOptions>,
}

impl SqliteDocumentStore {
    pub fn new(database: &Database) -> Self {
        let (version, _) = watch::channel(0);
        Self {
            pool: database.pool().clone(),
            version: Arc::new(version),
            file_options: database.file_options().cloned(),
        }
    }

    /// Fetch every record, most recently modified first.
    #[tracing::instrument(skip(self), fields(db.table = "documents", db.operation = "select"))]
    pub async fn fetch_all(&self) -> Result<Vec<DocumentRecord>, AppError> {
        let rows: Vec<DocumentRow> = sqlx::query_as::<Sqlite, DocumentRow>(
            r#"
            SELECT id, name, size_bytes, last_modified
            FROM documents
            ORDER BY last_modified DESC, rowid DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::StorageRead(format!("Failed to load documents: {}", e)))?;

        rows.into_iter().map(DocumentRow::into_record).collect()
    }

    fn notify_changed(&self) {
        self.version.send_modify(|v| *v = v.wrapping_add(1));
    }
}

#[async_trait]
impl DocumentStore for SqliteDocumentStore {
    #[tracing::instrument(skip(self, record), fields(db.table = "documents", db.operation = "insert", db.record_id = %record.id))]
    async fn insert(&self, record: &DocumentRecord) -> Result<i64, AppError> {
        let result = sqlx::query(
            r#"
            INSERT INTO documents (id, name, size_bytes, last_modified)
            VALUES (?1, ?2, ?3, ?4)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(&record.id)
        .bind(&record.name)
        .bind(record.size_bytes)
        .bind(record.last_modified.timestamp_millis())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            tracing::warn!(record_id = %record.id, "Document id already exists, insert skipped");
            return Ok(INSERT_FAILED);
        }

        self.notify_changed();
        Ok(result.last_insert_rowid())
    }

    #[tracing::instrument(skip(self, record), fields(db.table = "documents", db.operation = "update", db.record_id = %record.id))]
    async fn update(&self, record: &DocumentRecord) -> Result<u64, AppError> {
        let rows_affected = sqlx::query(
            r#"
            UPDATE documents
            SET name = ?1, size_bytes = ?2, last_modified = ?3
            WHERE id = ?4
            "#,
        )
        .bind(&record.name)
        .bind(record.size_bytes)
        .bind(record.last_modified.timestamp_millis())
        .bind(&record.id)
        .execute(&self.pool)
        .await?
        .rows_affected();

        if rows_affected > 0 {
            self.notify_changed();
        }
        Ok(rows_affected)
    }

    #[tracing::instrument(skip(self, record), fields(db.table = "documents", db.operation = "delete", db.record_id = %record.id))]
    async fn delete(&self, record: &DocumentRecord) -> Result<u64, AppError> {
        let rows_affected = sqlx::query("DELETE FROM documents WHERE id = ?1")
            .bind(&record.id)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if rows_affected > 0 {
            self.notify_changed();
        }
        Ok(rows_affected)
    }

    fn observe_all(&self) -> DocumentStream {
        let mut changes = self.version.subscribe();
        changes.mark_changed();

        let state = Some(LiveQuery {
            store: self.clone(),
            changes,
            external: self.file_options.clone().map(ExternalCommits::new),
        });
        stream::unfold(state, |state| async move {
            let mut live = state?;
            tokio::select! {
                biased;
                // The sender lives inside `store`, so this only fails if the
                // receiver is closed, which cannot happen while we hold it.
                changed = live.changes.changed() => changed.ok()?,
                _ = ExternalCommits::next(&mut live.external) => {}
            }
            live.changes.mark_unchanged();
            if let Some(external) = live.external.as_mut() {
                external.sync().await;
            }

            match live.store.fetch_all().await {
                Ok(records) => Some((Ok(records), Some(live))),
                Err(e) => {
                    tracing::error!(error = %e, "Live document query failed");
                    Some((Err(e), None))
                }
            }
        })
        .boxed()
    }
}

struct LiveQuery {
    store: SqliteDocumentStore,
    changes: watch::Receiver<u64>,
    external: Option<ExternalCommits>,
}

/// Watches a database file for commits made through any other connection.
///
/// `PRAGMA data_version` only changes for commits from other connections, so
/// the watcher keeps one connection to itself and never writes through it.
struct ExternalCommits {
    options: SqliteConnectOptions,
    conn: Option<SqliteConnection>,
    last_seen: Option<i64>,
}

impl ExternalCommits {
    fn new(options: SqliteConnectOptions) -> Self {
        Self {
            options,
            conn: None,
            last_seen: None,
        }
    }

    /// Resolves once a commit newer than the last sync is seen. Never
    /// resolves when there is nothing to watch.
    async fn next(external: &mut Option<Self>) {
        let Some(external) = external else {
            return std::future::pending().await;
        };
        loop {
            tokio::time::sleep(EXTERNAL_POLL_INTERVAL).await;
            match external.poll().await {
                Ok(true) => return,
                Ok(false) => {}
                Err(e) => external.reset(e),
            }
        }
    }

    /// Record the current data version so only later commits count.
    async fn sync(&mut self) {
        if let Err(e) = self.poll().await {
            self.reset(e);
        }
    }

    async fn poll(&mut self) -> Result<bool, sqlx::Error> {
        if self.conn.is_none() {
            self.conn = Some(self.options.connect().await?);
        }
        let Some(conn) = self.conn.as_mut() else {
            return Ok(false);
        };

        let version: i64 = sqlx::query_scalar("PRAGMA data_version")
            .fetch_one(&mut *conn)
            .await?;
        let changed = self.last_seen.is_some_and(|seen| seen != version);
        self.last_seen = Some(version);
        Ok(changed)
    }

    /// A fresh connection starts its own data_version sequence.
    fn reset(&mut self, error: sqlx::Error) {
        tracing::warn!(error = %error, "Polling for external document changes failed");
        self.conn = None;
        self.last_seen = None;
    }
}
