//! SQLite connection setup and migrations.

use dscan_core::AppError;
use sqlx::sqlite::{
    SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous,
};
use sqlx::SqlitePool;
use std::path::Path;
use std::str::FromStr;
use std::time::Duration;

const MAX_CONNECTIONS: u32 = 4;
const ACQUIRE_TIMEOUT_SECS: u64 = 10;
const BUSY_TIMEOUT_SECS: u64 = 5;

/// Handle to the metadata database.
#[derive(Clone, Debug)]
pub struct Database {
    pool: SqlitePool,
    /// Options for opening extra connections to the same file. `None` for
    /// in-memory databases, which no other connection can see.
    file_options: Option<SqliteConnectOptions>,
}

impl Database {
    /// Open (creating if missing) the database file at `path` and run migrations.
    #[tracing::instrument(skip(path), fields(db.path = %path.display()))]
    pub async fn connect(path: &Path) -> Result<Self, AppError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }

        let opts = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .busy_timeout(Duration::from_secs(BUSY_TIMEOUT_SECS));

        let pool = SqlitePoolOptions::new()
            .max_connections(MAX_CONNECTIONS)
            .acquire_timeout(Duration::from_secs(ACQUIRE_TIMEOUT_SECS))
            .connect_with(opts.clone())
            .await?;

        let db = Self {
            pool,
            file_options: Some(opts),
        };
        db.migrate().await?;

        tracing::info!(path = %path.display(), "Document database ready");
        Ok(db)
    }

    /// Private in-memory database. A single connection is pinned for the
    /// lifetime of the pool, otherwise every new connection would see an
    /// empty database.
    pub async fn connect_in_memory() -> Result<Self, AppError> {
        let opts = SqliteConnectOptions::from_str("sqlite::memory:")?;

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .connect_with(opts)
            .await?;

        let db = Self {
            pool,
            file_options: None,
        };
        db.migrate().await?;
        Ok(db)
    }

    async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Connect options for the database file, if other connections or
    /// processes can write to it.
    pub fn file_options(&self) -> Option<&SqliteConnectOptions> {
        self.file_options.as_ref()
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}
