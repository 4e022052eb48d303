//! Storage abstraction trait

use async_trait::async_trait;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Download failed: {0}")]
    DownloadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Where uploads and pipeline artifacts are kept.
///
/// Keys are relative, slash separated and never escape the backend root. See the crate root
/// documentation for the key layout.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Store a new upload under a generated key and return `(storage_key, public_url)`.
    async fn upload(
        &self,
        original_name: &str,
        content_type: &str,
        data: Vec<u8>,
    ) -> StorageResult<(String, String)>;

    /// Write `data` at an exact key (pipeline artifacts). Returns the public URL.
    async fn upload_with_key(
        &self,
        storage_key: &str,
        data: Vec<u8>,
        content_type: &str,
    ) -> StorageResult<String>;

    async fn download(&self, storage_key: &str) -> StorageResult<Vec<u8>>;

    /// Deleting a missing key is not an error.
    async fn delete(&self, storage_key: &str) -> StorageResult<()>;

    /// Remove everything under `prefix`. Returns the number of files removed.
    async fn delete_prefix(&self, prefix: &str) -> StorageResult<usize>;

    async fn exists(&self, storage_key: &str) -> StorageResult<bool>;

    /// URL clients use to fetch the file.
    fn public_url(&self, storage_key: &str) -> String;
}
