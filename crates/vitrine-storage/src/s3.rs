use crate::traits::{Storage, StorageError, StorageResult};
use async_trait::async_trait;
use object_store::aws::{AmazonS3, AmazonS3Builder};
use object_store::path::Path;
use object_store::Error as ObjectStoreError;
use object_store::{ObjectStoreExt, PutPayload};
use vitrine_core::StorageBackend;

/// S3 storage implementation
#[derive(Clone)]
pub struct S3Storage {
    store: AmazonS3,
    bucket: String,
    region: String,
    endpoint_url: Option<String>, // Custom endpoint for S3-compatible providers
}

impl S3Storage {
    /// Create a new S3Storage instance
    ///
    /// # Arguments
    /// * `bucket` - S3 bucket name
    /// * `region` - AWS region (or region identifier for S3-compatible providers)
    /// * `endpoint_url` - Optional custom endpoint URL for S3-compatible providers
    ///   (e.g., "http://localhost:9000" for MinIO)
    pub async fn new(
        bucket: String,
        region: String,
        endpoint_url: Option<String>,
    ) -> StorageResult<Self> {
        // Build AmazonS3 object store from environment and explicit settings.
        let mut builder = AmazonS3Builder::from_env()
            .with_region(region.clone())
            .with_bucket_name(bucket.clone());

        if let Some(ref endpoint) = endpoint_url {
            let allow_http = endpoint.starts_with("http://");
            builder = builder
                .with_endpoint(endpoint.clone())
                .with_allow_http(allow_http);
        }

        let store = builder
            .build()
            .map_err(|e| StorageError::ConfigError(e.to_string()))?;

        Ok(S3Storage {
            store,
            bucket,
            region,
            endpoint_url,
        })
    }
}

#[async_trait]
impl Storage for S3Storage {
    async fn exists(&self, path: &str) -> StorageResult<bool> {
        let location = Path::from(path.to_string());
        match self.store.head(&location).await {
            Ok(_) => Ok(true),
            Err(ObjectStoreError::NotFound { .. }) => Ok(false),
            Err(e) => Err(StorageError::BackendError(e.to_string())),
        }
    }

    async fn write(&self, path: &str, data: Vec<u8>) -> StorageResult<()> {
        let size = data.len() as u64;
        let location = Path::from(path.to_string());
        let start = std::time::Instant::now();

        self.store
            .put(&location, PutPayload::from(data))
            .await
            .map_err(|e| {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    path = %path,
                    size_bytes = size,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 write failed"
                );
                StorageError::WriteFailed(e.to_string())
            })?;

        tracing::info!(
            bucket = %self.bucket,
            path = %path,
            size_bytes = size,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 write successful"
        );

        Ok(())
    }

    async fn read(&self, path: &str) -> StorageResult<Vec<u8>> {
        let start = std::time::Instant::now();
        let location = Path::from(path.to_string());

        let result = self.store.get(&location).await.map_err(|e| match e {
            ObjectStoreError::NotFound { .. } => StorageError::NotFound(path.to_string()),
            other => {
                tracing::error!(
                    error = %other,
                    bucket = %self.bucket,
                    path = %path,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 read failed"
                );
                StorageError::ReadFailed(other.to_string())
            }
        })?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| StorageError::ReadFailed(e.to_string()))?;

        tracing::debug!(
            bucket = %self.bucket,
            path = %path,
            size_bytes = bytes.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 read successful"
        );

        Ok(bytes.to_vec())
    }

    async fn delete(&self, path: &str) -> StorageResult<()> {
        let start = std::time::Instant::now();
        let location = Path::from(path.to_string());

        match self.store.delete(&location).await {
            Ok(()) => {}
            // Deleting an absent object is success.
            Err(ObjectStoreError::NotFound { .. }) => return Ok(()),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    bucket = %self.bucket,
                    path = %path,
                    duration_ms = start.elapsed().as_secs_f64() * 1000.0,
                    "S3 delete failed"
                );
                return Err(StorageError::DeleteFailed(e.to_string()));
            }
        }

        tracing::info!(
            bucket = %self.bucket,
            path = %path,
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "S3 delete successful"
        );

        Ok(())
    }

    async fn ensure_directory(&self, _path: &str) -> StorageResult<()> {
        // Object stores have no directories; keys carry the full hierarchy.
        Ok(())
    }

    /// Generate public URL for an S3 object
    ///
    /// For AWS S3, uses the standard format: https://{bucket}.s3.{region}.amazonaws.com/{path}
    /// For S3-compatible providers, uses path-style with the endpoint URL
    fn public_url(&self, path: &str) -> String {
        if let Some(ref endpoint) = self.endpoint_url {
            let base_url = endpoint.trim_end_matches('/');
            format!("{}/{}/{}", base_url, self.bucket, path)
        } else {
            format!(
                "https://{}.s3.{}.amazonaws.com/{}",
                self.bucket, self.region, path
            )
        }
    }

    fn backend_type(&self) -> StorageBackend {
        StorageBackend::S3
    }
}
