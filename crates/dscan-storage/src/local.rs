use crate::names::check_name;
use crate::traits::{FileStorage, StorageError, StorageResult};
use async_trait::async_trait;
use std::path::{Component, Path, PathBuf};
use tokio::fs;

/// Local filesystem storage implementation
#[derive(Clone, Debug)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_uri: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Directory holding the managed files (created if missing)
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        let canonical = fs::canonicalize(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
        })?;

        Ok(LocalStorage {
            base_uri: file_uri(&canonical),
            base_path: canonical,
        })
    }

    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn name_to_path(&self, name: &str) -> StorageResult<PathBuf> {
        check_name(name)?;
        Ok(self.base_path.join(name))
    }
}

/// `file://` URI for an absolute path, each component percent-encoded.
fn file_uri(path: &Path) -> String {
    let encoded: Vec<String> = path
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => {
                Some(urlencoding::encode(&part.to_string_lossy()).into_owned())
            }
            _ => None,
        })
        .collect();
    format!("file:///{}", encoded.join("/"))
}

#[async_trait]
impl FileStorage for LocalStorage {
    async fn copy_into_managed(&self, source: &Path, dest_name: &str) -> StorageResult<()> {
        let dest = self.name_to_path(dest_name)?;
        let start = std::time::Instant::now();

        if !fs::try_exists(source).await.unwrap_or(false) {
            return Err(StorageError::NotFound(source.display().to_string()));
        }
        if fs::try_exists(&dest).await.unwrap_or(false) {
            return Err(StorageError::AlreadyExists(dest_name.to_string()));
        }

        let bytes = fs::copy(source, &dest).await.map_err(|e| {
            StorageError::CopyFailed(format!(
                "Failed to copy {} to {}: {}",
                source.display(),
                dest.display(),
                e
            ))
        })?;

        tracing::info!(
            source = %source.display(),
            path = %dest.display(),
            size_bytes = bytes,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Copied file into managed storage"
        );

        Ok(())
    }

    async fn rename(&self, old_name: &str, new_name: &str) -> StorageResult<bool> {
        let from = self.name_to_path(old_name)?;
        let to = self.name_to_path(new_name)?;

        if !fs::try_exists(&from).await.unwrap_or(false) {
            tracing::warn!(name = %old_name, "Rename source does not exist");
            return Ok(false);
        }
        if fs::try_exists(&to).await.unwrap_or(false) {
            tracing::warn!(name = %new_name, "Rename target already exists");
            return Ok(false);
        }

        fs::rename(&from, &to).await.map_err(|e| {
            StorageError::RenameFailed(format!(
                "Failed to rename {} to {}: {}",
                from.display(),
                to.display(),
                e
            ))
        })?;

        tracing::info!(from = %old_name, to = %new_name, "Renamed managed file");
        Ok(true)
    }

    async fn delete(&self, name: &str) -> StorageResult<bool> {
        let path = self.name_to_path(name)?;

        if !fs::try_exists(&path).await.unwrap_or(false) {
            return Ok(false);
        }

        fs::remove_file(&path).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", path.display(), e))
        })?;

        tracing::info!(path = %path.display(), "Deleted managed file");
        Ok(true)
    }

    async fn size_of(&self, name: &str) -> StorageResult<u64> {
        let path = self.name_to_path(name)?;
        let meta = fs::metadata(&path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => StorageError::NotFound(name.to_string()),
            _ => StorageError::IoError(e),
        })?;
        Ok(meta.len())
    }

    async fn exists(&self, name: &str) -> StorageResult<bool> {
        let path = self.name_to_path(name)?;
        Ok(fs::try_exists(&path).await.unwrap_or(false))
    }

    fn uri_for(&self, name: &str) -> StorageResult<String> {
        check_name(name)?;
        Ok(format!("{}/{}", self.base_uri, urlencoding::encode(name)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn storage_with_source(
        contents: &[u8],
    ) -> (tempfile::TempDir, LocalStorage, PathBuf) {
        let dir = tempdir().unwrap();
        let storage = LocalStorage::new(dir.path().join("pdfs")).await.unwrap();
        let source = dir.path().join("scan.pdf");
        std::fs::write(&source, contents).unwrap();
        (dir, storage, source)
    }

    #[tokio::test]
    async fn test_copy_into_managed_and_size() {
        let (_dir, storage, source) = storage_with_source(b"%PDF-1.7 test").await;

        storage.copy_into_managed(&source, "a.pdf").await.unwrap();

        assert!(storage.exists("a.pdf").await.unwrap());
        assert_eq!(storage.size_of("a.pdf").await.unwrap(), 13);
        // The source is left untouched.
        assert!(source.exists());
    }

    #[tokio::test]
    async fn test_copy_refuses_to_overwrite() {
        let (_dir, storage, source) = storage_with_source(b"one").await;
        storage.copy_into_managed(&source, "a.pdf").await.unwrap();

        let result = storage.copy_into_managed(&source, "a.pdf").await;
        assert!(matches!(result, Err(StorageError::AlreadyExists(_))));
    }

    #[tokio::test]
    async fn test_copy_missing_source() {
        let (dir, storage, _source) = storage_with_source(b"one").await;
        let result = storage
            .copy_into_managed(&dir.path().join("nope.pdf"), "a.pdf")
            .await;
        assert!(matches!(result, Err(StorageError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_rename() {
        let (_dir, storage, source) = storage_with_source(b"data").await;
        storage.copy_into_managed(&source, "x.pdf").await.unwrap();
        storage.copy_into_managed(&source, "taken.pdf").await.unwrap();

        assert!(storage.rename("x.pdf", "y.pdf").await.unwrap());
        assert!(!storage.exists("x.pdf").await.unwrap());
        assert!(storage.exists("y.pdf").await.unwrap());

        assert!(!storage.rename("y.pdf", "taken.pdf").await.unwrap());
        assert!(!storage.rename("missing.pdf", "z.pdf").await.unwrap());
        assert!(storage.exists("y.pdf").await.unwrap());
    }

    #[tokio::test]
    async fn test_delete() {
        let (_dir, storage, source) = storage_with_source(b"data").await;
        storage.copy_into_managed(&source, "x.pdf").await.unwrap();

        assert!(storage.delete("x.pdf").await.unwrap());
        assert!(!storage.exists("x.pdf").await.unwrap());
        assert!(!storage.delete("x.pdf").await.unwrap());
    }

    #[tokio::test]
    async fn test_path_traversal_rejected() {
        let (_dir, storage, _source) = storage_with_source(b"data").await;

        let result = storage.delete("../scan.pdf").await;
        assert!(matches!(result, Err(StorageError::InvalidName(_))));

        let result = storage.size_of("/etc/passwd").await;
        assert!(matches!(result, Err(StorageError::InvalidName(_))));

        let result = storage.uri_for("..");
        assert!(matches!(result, Err(StorageError::InvalidName(_))));
    }

    #[tokio::test]
    async fn test_uri_for_percent_encodes_name() {
        let (_dir, storage, _source) = storage_with_source(b"data").await;

        let uri = storage.uri_for("19-Oct-26 14:03:27.pdf").unwrap();
        assert!(uri.starts_with("file:///"));
        assert!(uri.ends_with("/19-Oct-26%2014%3A03%3A27.pdf"));
        assert!(!uri.contains(' '));
    }
}
