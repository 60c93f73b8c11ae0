//! Storage abstraction trait
//!
//! This module defines the Storage trait that all storage backends must
//! implement.

use async_trait::async_trait;
use thiserror::Error;
use vitrine_core::StorageBackend;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Write failed: {0}")]
    WriteFailed(String),

    #[error("Read failed: {0}")]
    ReadFailed(String),

    #[error("Delete failed: {0}")]
    DeleteFailed(String),

    #[error("File not found: {0}")]
    NotFound(String),

    #[error("Invalid storage path: {0}")]
    InvalidPath(String),

    #[error("Storage backend error: {0}")]
    BackendError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    ConfigError(String),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Storage abstraction trait
///
/// All storage backends (S3, local filesystem) must implement this trait.
/// The image pipeline and deletion coordinator work against this trait
/// without coupling to a specific backend.
///
/// **Path format:** slash-separated relative keys
/// `{namespace}/{size_label}/{filename}.webp`; see the crate root
/// documentation.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Check if a blob exists at `path`
    async fn exists(&self, path: &str) -> StorageResult<bool>;

    /// Write `data` at `path`, replacing any existing blob
    async fn write(&self, path: &str, data: Vec<u8>) -> StorageResult<()>;

    /// Read the blob at `path`
    async fn read(&self, path: &str) -> StorageResult<Vec<u8>>;

    /// Delete the blob at `path`.
    ///
    /// Idempotent: deleting an absent blob is success. Cleanup may race
    /// with, or repeat after, a partially-failed pipeline run.
    async fn delete(&self, path: &str) -> StorageResult<()>;

    /// Create the directory at `path` (and its parents).
    ///
    /// No-op on backends without real directories (object stores).
    async fn ensure_directory(&self, path: &str) -> StorageResult<()>;

    /// Publicly accessible URL for the blob at `path`
    fn public_url(&self, path: &str) -> String;

    /// Get the storage backend type
    fn backend_type(&self) -> StorageBackend;
}
