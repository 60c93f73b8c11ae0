//! Deletion coordinator: removes every variant of an image as one logical
//! unit.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use vitrine_core::sizes::SizeTable;
use vitrine_core::VariantManifest;
use vitrine_storage::{Storage, StorageError, StorageResult};

use crate::paths::{sibling_paths, PathShapeError};

/// Maximum storage deletes in flight for one coordinator call.
const DELETE_CONCURRENCY: usize = 16;

#[derive(Debug, thiserror::Error)]
pub enum DeleteError {
    #[error(transparent)]
    PathShape(#[from] PathShapeError),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

/// Deletes the full variant set behind a stored path, a manifest, or a batch
/// of independent images.
pub struct DeletionCoordinator {
    storage: Arc<dyn Storage>,
    sizes: SizeTable,
}

impl DeletionCoordinator {
    pub fn new(storage: Arc<dyn Storage>, sizes: SizeTable) -> Self {
        DeletionCoordinator { storage, sizes }
    }

    pub fn with_default_sizes(storage: Arc<dyn Storage>) -> Self {
        Self::new(storage, SizeTable::default())
    }

    /// Delete every variant derived from the image behind `original_path`.
    ///
    /// Sibling paths are reconstructed by substituting the size segment, so
    /// any one variant path works as input. Missing blobs are success;
    /// calling twice is a no-op.
    pub async fn delete_all(&self, original_path: &str) -> Result<(), DeleteError> {
        let paths = sibling_paths(original_path, &self.sizes)?;
        self.delete_paths(&paths).await?;

        tracing::info!(
            path = %original_path,
            variants = paths.len(),
            "deleted image variant set"
        );
        Ok(())
    }

    /// Batch form for records owning many independent images (e.g. a
    /// product gallery).
    pub async fn delete_batch(&self, original_paths: &[String]) -> Result<(), DeleteError> {
        let mut all = Vec::with_capacity(original_paths.len() * (self.sizes.len() + 1));
        for path in original_paths {
            all.extend(sibling_paths(path, &self.sizes)?);
        }
        self.delete_paths(&all).await?;
        Ok(())
    }

    /// Delete every path in a manifest.
    pub async fn delete_manifest(&self, manifest: &VariantManifest) -> StorageResult<()> {
        let paths: Vec<String> = manifest.paths().map(String::from).collect();
        self.delete_paths(&paths).await
    }

    /// Delete exact paths with no sibling derivation.
    ///
    /// This is the compensation entry point for
    /// [`PipelineError::written_paths`](crate::PipelineError::written_paths).
    /// Every path is attempted even after a failure; the first error is
    /// returned once the sweep finishes.
    pub async fn delete_paths(&self, paths: &[String]) -> StorageResult<()> {
        let results: Vec<_> = stream::iter(paths)
            .map(|path| {
                let storage = self.storage.clone();
                async move {
                    storage
                        .delete(path)
                        .await
                        .map_err(|e| (path.clone(), e))
                }
            })
            .buffer_unordered(DELETE_CONCURRENCY)
            .collect()
            .await;

        let mut first_error = None;
        for result in results {
            if let Err((path, e)) = result {
                tracing::error!(error = %e, path = %path, "failed to delete stored variant");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
