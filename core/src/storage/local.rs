use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;

use super::{Storage, StorageError, StorageResult};

/// Local filesystem storage. The container is ignored.
///
/// Uploads land under `base_path`. Downloads and deletes resolve against
/// `source_root`, which defaults to `base_path`.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    source_root: PathBuf,
}

impl LocalStorage {
    /// Create the storage root if it does not exist yet.
    pub async fn new(base_path: impl Into<PathBuf>) -> StorageResult<Self> {
        let base_path = base_path.into();
        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::UploadFailed(format!(
                "could not create base path {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(Self {
            source_root: base_path.clone(),
            base_path,
        })
    }

    /// Read (and delete) sources relative to a different directory.
    pub fn with_source_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.source_root = root.into();
        self
    }

    /// Reject keys that could escape the root.
    fn resolve(root: &Path, key: &str) -> StorageResult<PathBuf> {
        let relative = Path::new(key);
        let escapes = relative.components().any(|c| {
            matches!(
                c,
                Component::ParentDir | Component::RootDir | Component::Prefix(_)
            )
        });
        if key.is_empty() || escapes {
            return Err(StorageError::InvalidKey(key.to_string()));
        }
        Ok(root.join(relative))
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn download(&self, _container: &str, key: &str) -> StorageResult<Vec<u8>> {
        let path = Self::resolve(&self.source_root, key)?;

        match fs::read(&path).await {
            Ok(data) => {
                log::debug!("Read {} ({} bytes)", path.display(), data.len());
                Ok(data)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::DownloadFailed(format!(
                "failed to read {}: {}",
                path.display(),
                e
            ))),
        }
    }

    async fn upload(&self, _container: &str, key: &str, data: Vec<u8>) -> StorageResult<()> {
        let path = Self::resolve(&self.base_path, key)?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::UploadFailed(format!(
                    "could not create directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let size = data.len();
        fs::write(&path, data).await.map_err(|e| {
            StorageError::UploadFailed(format!("failed to write {}: {}", path.display(), e))
        })?;

        log::debug!("Wrote {} ({} bytes)", path.display(), size);
        Ok(())
    }

    async fn delete(&self, _container: &str, key: &str) -> StorageResult<()> {
        let path = Self::resolve(&self.source_root, key)?;

        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(StorageError::NotFound(key.to_string()))
            }
            Err(e) => Err(StorageError::DeleteFailed(format!(
                "failed to remove {}: {}",
                path.display(),
                e
            ))),
        }
    }
}
