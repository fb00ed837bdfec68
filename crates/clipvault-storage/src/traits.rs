//! Storage abstraction trait

use async_trait::async_trait;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("Presign failed: {0}")]
    PresignFailed(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// Object keys are chosen by the caller. None of these operations retry;
/// retry policy, if any, belongs to the caller.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Stream a local file's bytes to the remote bucket under `key`.
    async fn upload_file(
        &self,
        key: &str,
        local_path: &Path,
        content_type: &str,
    ) -> StorageResult<()>;

    /// Generate a presigned URL granting time-limited GET access to `key`.
    async fn presigned_url(&self, key: &str, expires_in: Duration) -> StorageResult<String>;

    /// The publicly accessible URL for `key`, assuming a public-read bucket.
    fn public_url(&self, key: &str) -> String;

    /// Delete the object at `key`. Used as compensating cleanup when the
    /// metadata update fails after a successful upload.
    async fn delete(&self, key: &str) -> StorageResult<()>;
}
