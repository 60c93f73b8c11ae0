//! Configuration module
//!
//! Storage backend selection and credentials, read from the environment.

use std::env;
use std::str::FromStr;

use crate::storage_types::StorageBackend;

/// Media store configuration.
///
/// `STORAGE_BACKEND` selects the backend (`local` or `s3`); the remaining
/// variables are backend-specific and checked by [`validate`](Self::validate).
#[derive(Clone, Debug)]
pub struct MediaStoreConfig {
    pub storage_backend: Option<StorageBackend>,
    pub local_storage_path: Option<String>,
    pub local_storage_base_url: Option<String>,
    pub s3_bucket: Option<String>,
    pub s3_region: Option<String>,
    pub s3_endpoint: Option<String>,
    pub aws_region: Option<String>,
}

impl MediaStoreConfig {
    pub fn from_env() -> Result<Self, anyhow::Error> {
        let storage_backend = match env::var("STORAGE_BACKEND") {
            Ok(value) => Some(StorageBackend::from_str(&value)?),
            Err(_) => None,
        };

        Ok(MediaStoreConfig {
            storage_backend,
            local_storage_path: env::var("LOCAL_STORAGE_PATH").ok(),
            local_storage_base_url: env::var("LOCAL_STORAGE_BASE_URL").ok(),
            s3_bucket: env::var("S3_BUCKET").ok(),
            s3_region: env::var("S3_REGION").ok(),
            s3_endpoint: env::var("S3_ENDPOINT").ok(),
            aws_region: env::var("AWS_REGION").ok(),
        })
    }

    /// Check that the selected backend has the variables it needs.
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        match self.storage_backend.unwrap_or(StorageBackend::Local) {
            StorageBackend::Local => {
                if self.local_storage_path.is_none() {
                    anyhow::bail!("LOCAL_STORAGE_PATH must be set for the local backend");
                }
                if self.local_storage_base_url.is_none() {
                    anyhow::bail!("LOCAL_STORAGE_BASE_URL must be set for the local backend");
                }
            }
            StorageBackend::S3 => {
                if self.s3_bucket.is_none() {
                    anyhow::bail!("S3_BUCKET must be set for the s3 backend");
                }
                if self.s3_region.is_none() && self.aws_region.is_none() {
                    anyhow::bail!("S3_REGION or AWS_REGION must be set for the s3 backend");
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_config() -> MediaStoreConfig {
        MediaStoreConfig {
            storage_backend: None,
            local_storage_path: None,
            local_storage_base_url: None,
            s3_bucket: None,
            s3_region: None,
            s3_endpoint: None,
            aws_region: None,
        }
    }

    #[test]
    fn local_backend_requires_path_and_base_url() {
        let mut config = empty_config();
        config.storage_backend = Some(StorageBackend::Local);
        assert!(config.validate().is_err());

        config.local_storage_path = Some("/var/lib/vitrine/media".to_string());
        assert!(config.validate().is_err());

        config.local_storage_base_url = Some("http://localhost:3000/media".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn s3_backend_accepts_aws_region_fallback() {
        let mut config = empty_config();
        config.storage_backend = Some(StorageBackend::S3);
        config.s3_bucket = Some("catalog-images".to_string());
        assert!(config.validate().is_err());

        config.aws_region = Some("eu-west-1".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn backend_defaults_to_local() {
        let mut config = empty_config();
        config.local_storage_path = Some("/tmp/media".to_string());
        config.local_storage_base_url = Some("http://localhost:3000/media".to_string());
        assert!(config.validate().is_ok());
    }
}
