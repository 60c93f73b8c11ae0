//! Types for the derivation pipeline.

use bytes::Bytes;
use vitrine_core::VariantManifest;

/// Raw upload handed to the pipeline.
///
/// Not persisted itself; exists only for the duration of one pipeline run.
#[derive(Clone, Debug)]
pub struct UploadedAsset {
    pub data: Bytes,
    pub content_type: String,
}

impl UploadedAsset {
    pub fn new(data: impl Into<Bytes>, content_type: impl Into<String>) -> Self {
        UploadedAsset {
            data: data.into(),
            content_type: content_type.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// Result of a successful pipeline run for one asset.
///
/// The manifest is what callers embed in the owning domain record. Its path
/// set doubles as the compensation handle: a caller rolling back the
/// surrounding transaction passes it to
/// [`DeletionCoordinator::delete_manifest`](crate::DeletionCoordinator::delete_manifest).
#[derive(Clone, Debug)]
pub struct ProcessedImage {
    pub manifest: VariantManifest,
}

impl ProcessedImage {
    /// Every path written for this asset, for compensating deletion.
    pub fn cleanup_paths(&self) -> Vec<String> {
        self.manifest.paths().map(String::from).collect()
    }
}
