//! Shared setup for application integration tests: a file-backed database and
//! managed storage in a temporary directory, wired the way the CLI wires them.

use dscan_app::{AppStateController, BackgroundExecutor, DocumentLifecycle, DocumentRepository};
use dscan_core::{Config, DocumentRecord, Resource};
use dscan_db::{Database, SqliteDocumentStore};
use dscan_storage::create_storage;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::watch;
use tokio::time::timeout;

pub struct TestApp {
    pub dir: TempDir,
    pub config: Config,
    pub database: Database,
    pub controller: Arc<AppStateController>,
}

impl TestApp {
    pub async fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = Config::with_data_dir(dir.path());
        let database = Database::connect(&config.database_path).await.unwrap();
        let store = Arc::new(SqliteDocumentStore::new(&database));
        let storage = create_storage(&config).await.unwrap();
        let repository = DocumentRepository::new(store, BackgroundExecutor::current().unwrap());
        let controller = AppStateController::new(
            DocumentLifecycle::new(repository, storage),
            config.notice_capacity,
            config.dark_mode,
        );

        Self {
            dir,
            config,
            database,
            controller,
        }
    }

    /// Write a fake scan outside managed storage.
    pub fn scan_file(&self, file_name: &str, contents: &[u8]) -> PathBuf {
        let path = self.dir.path().join(file_name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    pub fn managed_files(&self) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(&self.config.storage_dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}

/// Wait until the published list is a `Success` satisfying `pred`.
pub async fn wait_for_list<F>(
    rx: &mut watch::Receiver<Resource<Vec<DocumentRecord>>>,
    pred: F,
) -> Vec<DocumentRecord>
where
    F: Fn(&[DocumentRecord]) -> bool,
{
    let value = timeout(
        Duration::from_secs(5),
        rx.wait_for(|v| v.data().map(|docs| pred(docs)).unwrap_or(false)),
    )
    .await
    .expect("timed out waiting for document list")
    .expect("controller dropped");
    value.data().cloned().unwrap_or_default()
}
