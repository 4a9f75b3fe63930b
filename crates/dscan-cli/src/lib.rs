//! Wiring and output helpers for the `dscan` command-line front end.

use anyhow::Context;
use dscan_app::{
    AppStateController, BackgroundExecutor, DocumentLifecycle, DocumentRepository, NoticeReceiver,
};
use dscan_core::{Config, DocumentRecord, Notice, Resource};
use dscan_db::{Database, SqliteDocumentStore};
use dscan_storage::create_storage;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Everything a command needs, built from [`Config`].
pub struct App {
    pub config: Config,
    pub database: Database,
    pub controller: Arc<AppStateController>,
    pub notices: NoticeReceiver,
}

impl App {
    pub async fn bootstrap(config: Config) -> anyhow::Result<Self> {
        let database = Database::connect(&config.database_path)
            .await
            .with_context(|| {
                format!("Failed to open database at {}", config.database_path.display())
            })?;
        let storage = create_storage(&config)
            .await
            .context("Failed to initialize managed storage")?;
        let executor = BackgroundExecutor::new(config.background_threads)?;

        let store = Arc::new(SqliteDocumentStore::new(&database));
        let repository = DocumentRepository::new(store, executor);
        let controller = AppStateController::new(
            DocumentLifecycle::new(repository, storage),
            config.notice_capacity,
            config.dark_mode,
        );
        let notices = controller
            .take_notices()
            .context("Notice queue already taken")?;

        tracing::debug!(
            database = %config.database_path.display(),
            storage = %config.storage_dir.display(),
            "DScan initialized"
        );

        Ok(Self {
            config,
            database,
            controller,
            notices,
        })
    }

    /// Start the live list and wait for its first result.
    pub async fn load_documents(&self) -> anyhow::Result<Vec<DocumentRecord>> {
        self.controller.start();
        let mut rx = self.controller.documents();
        let current = rx
            .wait_for(|list| !list.is_idle() && !list.is_loading())
            .await
            .context("Document list closed")?
            .clone();

        match current {
            Resource::Success(docs) => Ok(docs),
            Resource::Error(message) => Err(anyhow::anyhow!(message)),
            Resource::Idle | Resource::Loading => Ok(Vec::new()),
        }
    }

    /// Look a document up by id, id prefix, or exact name.
    pub async fn find_document(&self, key: &str) -> anyhow::Result<DocumentRecord> {
        let docs = self.load_documents().await?;
        find_document(&docs, key)
            .cloned()
            .with_context(|| format!("No document matches '{}'", key))
    }

    /// Wait for a mutation to finish and turn its notice into a result.
    pub async fn finish(&mut self, mutation: JoinHandle<()>) -> anyhow::Result<String> {
        mutation.await.context("Mutation task failed")?;
        match self.notices.recv().await {
            Some(Notice::Success(message)) => Ok(message),
            Some(Notice::Error(message)) => Err(anyhow::anyhow!(message)),
            None => Err(anyhow::anyhow!("No outcome reported")),
        }
    }

    pub async fn close(self) {
        self.controller.shutdown();
        self.database.close().await;
    }
}

pub fn find_document<'a>(docs: &'a [DocumentRecord], key: &str) -> Option<&'a DocumentRecord> {
    docs.iter()
        .find(|d| d.id == key)
        .or_else(|| docs.iter().find(|d| d.name == key))
        .or_else(|| {
            let mut matches = docs.iter().filter(|d| d.id.starts_with(key));
            match (matches.next(), matches.next()) {
                (Some(only), None) if !key.is_empty() => Some(only),
                _ => None,
            }
        })
}

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// Human-readable file size.
pub fn format_size(bytes: i64) -> String {
    const KB: f64 = 1024.0;
    let bytes_f = bytes as f64;
    if bytes_f < KB {
        format!("{} B", bytes)
    } else if bytes_f < KB * KB {
        format!("{:.1} KB", bytes_f / KB)
    } else {
        format!("{:.2} MB", bytes_f / (KB * KB))
    }
}

pub fn print_documents_table(docs: &[DocumentRecord]) {
    if docs.is_empty() {
        println!("No documents.");
        return;
    }

    println!(
        "{:<36} {:<32} {:>10} {:>20}",
        "ID", "Name", "Size", "Last Modified"
    );
    println!("{}", "-".repeat(101));

    for doc in docs {
        println!(
            "{:<36} {:<32} {:>10} {:>20}",
            doc.id,
            truncate_string(&doc.name, 32),
            format_size(doc.size_bytes),
            doc.last_modified
                .with_timezone(&chrono::Local)
                .format("%Y-%m-%d %H:%M:%S")
        );
    }
}
