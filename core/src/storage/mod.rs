//! Storage port consumed by the processor.
//!
//! Keys are opaque path-like strings. Backends decide what a container means;
//! the local filesystem backend ignores it.

pub mod local;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use local::LocalStorage;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("object not found: {0}")]
    NotFound(String),

    #[error("invalid storage key: {0}")]
    InvalidKey(String),

    #[error("download failed: {0}")]
    DownloadFailed(String),

    #[error("upload failed: {0}")]
    UploadFailed(String),

    #[error("delete failed: {0}")]
    DeleteFailed(String),

    #[error("storage call timed out after {0:?}")]
    Timeout(Duration),
}

pub type StorageResult<T> = Result<T, StorageError>;

/// Download/upload/delete by object key.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn download(&self, container: &str, key: &str) -> StorageResult<Vec<u8>>;

    async fn upload(&self, container: &str, key: &str, data: Vec<u8>) -> StorageResult<()>;

    async fn delete(&self, container: &str, key: &str) -> StorageResult<()>;
}
