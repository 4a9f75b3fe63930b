//! Document repository: the metadata store as seen by the rest of the app.
//!
//! Pass-through over a [`DocumentStore`] whose only extra duty is to run every
//! store operation on the [`BackgroundExecutor`]. Results and failures are
//! returned unchanged.

use dscan_core::{AppError, DocumentRecord};
use dscan_db::{DocumentStore, DocumentStream};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use tokio::sync::mpsc;

use crate::executor::BackgroundExecutor;

#[derive(Clone)]
pub struct DocumentRepository {
    store: Arc<dyn DocumentStore>,
    executor: BackgroundExecutor,
}

impl DocumentRepository {
    pub fn new(store: Arc<dyn DocumentStore>, executor: BackgroundExecutor) -> Self {
        Self { store, executor }
    }

    /// Live list of all documents, most recently modified first.
    ///
    /// The store's live query is polled on the background executor and each
    /// snapshot is handed over, in order, through a one-slot channel. While
    /// the consumer is busy at most two snapshots wait for it: one in the
    /// slot and one held by the forwarder. Changes after those are coalesced
    /// by the store into the single snapshot that follows, so a slow consumer
    /// may see up to two stale lists before the newest. Dropping the returned
    /// stream stops the forwarding task.
    pub fn documents(&self) -> DocumentStream {
        let (tx, rx) = mpsc::channel(1);
        let mut source = self.store.observe_all();

        self.executor.spawn(async move {
            loop {
                tokio::select! {
                    _ = tx.closed() => {
                        tracing::debug!("Document list subscriber went away");
                        break;
                    }
                    item = source.next() => {
                        let Some(item) = item else { break };
                        let failed = item.is_err();
                        if tx.send(item).await.is_err() || failed {
                            break;
                        }
                    }
                }
            }
        });

        stream::unfold(rx, |mut rx| async move {
            let item = rx.recv().await?;
            Some((item, rx))
        })
        .boxed()
    }

    #[tracing::instrument(skip(self, record), fields(record_id = %record.id))]
    pub async fn insert(&self, record: DocumentRecord) -> Result<i64, AppError> {
        let store = Arc::clone(&self.store);
        self.executor
            .run(async move { store.insert(&record).await })
            .await
    }

    #[tracing::instrument(skip(self, record), fields(record_id = %record.id))]
    pub async fn update(&self, record: DocumentRecord) -> Result<u64, AppError> {
        let store = Arc::clone(&self.store);
        self.executor
            .run(async move { store.update(&record).await })
            .await
    }

    #[tracing::instrument(skip(self, record), fields(record_id = %record.id))]
    pub async fn delete(&self, record: DocumentRecord) -> Result<u64, AppError> {
        let store = Arc::clone(&self.store);
        self.executor
            .run(async move { store.delete(&record).await })
            .await
    }
}
