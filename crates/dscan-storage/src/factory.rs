use crate::{FileStorage, LocalStorage, StorageResult};
use dscan_core::Config;
use std::sync::Arc;

/// Create the managed file storage described by the configuration
pub async fn create_storage(config: &Config) -> StorageResult<Arc<dyn FileStorage>> {
    let storage = LocalStorage::new(&config.storage_dir).await?;
    tracing::info!(
        storage_dir = %config.storage_dir.display(),
        "Managed file storage initialized"
    );
    Ok(Arc::new(storage))
}
