use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use vitrine_core::StorageBackend;

/// Local filesystem storage implementation
#[derive(Clone)]
pub struct LocalStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalStorage {
    /// Create a new LocalStorage instance
    ///
    /// # Arguments
    /// * `base_path` - Root directory for blob storage (e.g., "/var/lib/vitrine/media")
    /// * `base_url` - Base URL for serving files (e.g., "http://localhost:3000/media")
    pub async fn new(base_path: impl Into<PathBuf>, base_url: String) -> StorageResult<Self> {
        let base_path = base_path.into();

        fs::create_dir_all(&base_path).await.map_err(|e| {
            StorageError::ConfigError(format!(
                "Failed to create storage directory {}: {}",
                base_path.display(),
                e
            ))
        })?;

        Ok(LocalStorage {
            base_path,
            base_url,
        })
    }

    /// Convert a storage path to a filesystem path with security validation
    ///
    /// Rejects paths containing traversal sequences that could escape the
    /// base storage directory.
    fn resolve(&self, path: &str) -> StorageResult<PathBuf> {
        if path.is_empty() || path.contains("..") || path.starts_with('/') {
            return Err(StorageError::InvalidPath(
                "Storage path contains invalid characters".to_string(),
            ));
        }

        let full = self.base_path.join(path);

        // Paths that already exist must still resolve under the base after
        // symlinks are followed.
        if let Ok(canonical) = full.canonicalize() {
            let base_canonical = self.base_path.canonicalize().map_err(|e| {
                StorageError::ConfigError(format!("Failed to canonicalize base path: {}", e))
            })?;
            if canonical.strip_prefix(&base_canonical).is_err() {
                return Err(StorageError::InvalidPath(
                    "Storage path resolves outside storage directory".to_string(),
                ));
            }
        }

        Ok(full)
    }

    /// Ensure parent directory exists
    async fn ensure_parent_dir(&self, path: &Path) -> StorageResult<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        Ok(())
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn exists(&self, path: &str) -> StorageResult<bool> {
        let full = self.resolve(path)?;
        Ok(tokio::fs::try_exists(&full).await.unwrap_or(false))
    }

    async fn write(&self, path: &str, data: Vec<u8>) -> StorageResult<()> {
        let full = self.resolve(path)?;
        let size = data.len();

        self.ensure_parent_dir(&full).await?;

        let start = std::time::Instant::now();

        let mut file = fs::File::create(&full).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to create file {}: {}", full.display(), e))
        })?;

        file.write_all(&data).await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to write file {}: {}", full.display(), e))
        })?;

        file.sync_all().await.map_err(|e| {
            StorageError::WriteFailed(format!("Failed to sync file {}: {}", full.display(), e))
        })?;

        tracing::info!(
            path = %path,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage write successful"
        );

        Ok(())
    }

    async fn read(&self, path: &str) -> StorageResult<Vec<u8>> {
        let full = self.resolve(path)?;
        let start = std::time::Instant::now();

        if !tokio::fs::try_exists(&full).await.unwrap_or(false) {
            return Err(StorageError::NotFound(path.to_string()));
        }

        let data = fs::read(&full).await.map_err(|e| {
            StorageError::ReadFailed(format!("Failed to read file {}: {}", full.display(), e))
        })?;

        tracing::debug!(
            path = %path,
            size_bytes = data.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage read successful"
        );

        Ok(data)
    }

    async fn delete(&self, path: &str) -> StorageResult<()> {
        let full = self.resolve(path)?;
        let start = std::time::Instant::now();

        if !tokio::fs::try_exists(&full).await.unwrap_or(false) {
            return Ok(());
        }

        fs::remove_file(&full).await.map_err(|e| {
            StorageError::DeleteFailed(format!("Failed to delete file {}: {}", full.display(), e))
        })?;

        tracing::info!(
            path = %path,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Local storage delete successful"
        );

        Ok(())
    }

    async fn ensure_directory(&self, path: &str) -> StorageResult<()> {
        let full = self.resolve(path)?;
        fs::create_dir_all(&full).await?;
        Ok(())
    }

    fn public_url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url.trim_end_matches('/'), path)
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::Local
    }
}
