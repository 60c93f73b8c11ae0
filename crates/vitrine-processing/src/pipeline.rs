//! Image derivation pipeline.
//!
//! Drives filename generation and variant rendering across the size table,
//! writes every variant through the storage adapter, and returns the
//! manifest the caller embeds in the owning domain record.
//!
//! The pipeline recovers nothing locally: the first render or write failure
//! aborts the run and surfaces as [`PipelineError`], which carries every
//! path already written so the caller can issue compensating deletes when
//! the surrounding domain transaction rolls back.

use std::collections::BTreeMap;
use std::sync::Arc;

use vitrine_core::sizes::{SizeTable, ORIGINAL_LABEL};
use vitrine_core::{ManifestError, VariantManifest};
use vitrine_storage::{Storage, StorageError};

use crate::deleter::DeletionCoordinator;
use crate::filename::generate_filename;
use crate::paths::{size_directory, variant_path};
use crate::renderer::{RenderError, VariantRenderer};
use crate::types::{ProcessedImage, UploadedAsset};

/// First failure encountered, wrapped together with the compensation set.
#[derive(Debug, thiserror::Error)]
#[error("image pipeline failed: {kind}")]
pub struct PipelineError {
    #[source]
    kind: PipelineErrorKind,
    written: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineErrorKind {
    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Manifest(#[from] ManifestError),

    #[error("render task failed: {0}")]
    Task(String),
}

impl PipelineError {
    fn new(kind: impl Into<PipelineErrorKind>, written: Vec<String>) -> Self {
        PipelineError {
            kind: kind.into(),
            written,
        }
    }

    pub fn kind(&self) -> &PipelineErrorKind {
        &self.kind
    }

    /// Paths written before the failure. Callers must hand these to
    /// [`DeletionCoordinator::delete_paths`] so no orphaned blobs remain
    /// outside the rolled-back domain record.
    pub fn written_paths(&self) -> &[String] {
        &self.written
    }

    pub fn into_written_paths(self) -> Vec<String> {
        self.written
    }
}

/// Orchestrates variant derivation for uploaded catalog images.
///
/// The size table is injected at construction and immutable afterwards;
/// production code uses [`with_default_sizes`](Self::with_default_sizes).
pub struct ImagePipeline {
    storage: Arc<dyn Storage>,
    sizes: SizeTable,
}

impl ImagePipeline {
    pub fn new(storage: Arc<dyn Storage>, sizes: SizeTable) -> Self {
        ImagePipeline { storage, sizes }
    }

    pub fn with_default_sizes(storage: Arc<dyn Storage>) -> Self {
        Self::new(storage, SizeTable::default())
    }

    /// Derive and persist the full variant set for one asset.
    ///
    /// When `previous_original` is given (replace-image case), the old
    /// image's variants are deleted only after every new variant is
    /// durably written, so the owning record never points at a missing
    /// image. That deletion is best-effort: a failure is logged and does
    /// not fail the operation, since the new set is already persisted.
    pub async fn process_single(
        &self,
        asset: UploadedAsset,
        namespace: &str,
        previous_original: Option<&str>,
    ) -> Result<ProcessedImage, PipelineError> {
        let mut written = Vec::new();
        let processed = self.process_asset(&asset, namespace, &mut written).await?;

        if let Some(old_original) = previous_original {
            let deleter = DeletionCoordinator::new(self.storage.clone(), self.sizes.clone());
            if let Err(e) = deleter.delete_all(old_original).await {
                tracing::warn!(
                    error = %e,
                    path = %old_original,
                    "failed to delete replaced image variants"
                );
            }
        }

        Ok(processed)
    }

    /// Derive and persist variant sets for several assets, one manifest per
    /// asset in input order.
    ///
    /// Whole-batch abort: the first failing asset aborts the batch, no
    /// manifests are returned, and the error's
    /// [`written_paths`](PipelineError::written_paths) cover everything
    /// written for the batch so far (completed earlier assets and the
    /// partial current one).
    pub async fn process_many(
        &self,
        assets: Vec<UploadedAsset>,
        namespace: &str,
    ) -> Result<Vec<ProcessedImage>, PipelineError> {
        let mut written = Vec::new();
        let mut processed = Vec::with_capacity(assets.len());

        for asset in &assets {
            processed.push(self.process_asset(asset, namespace, &mut written).await?);
        }

        Ok(processed)
    }

    async fn process_asset(
        &self,
        asset: &UploadedAsset,
        namespace: &str,
        written: &mut Vec<String>,
    ) -> Result<ProcessedImage, PipelineError> {
        let filename = generate_filename();

        // Decode once, encode per size. CPU-bound, so off the async pool.
        let data = asset.data.clone();
        let sizes = self.sizes.clone();
        let rendered = tokio::task::spawn_blocking(move || render_all(&data, &sizes))
            .await
            .map_err(|e| PipelineError::new(PipelineErrorKind::Task(e.to_string()), written.clone()))?
            .map_err(|e| PipelineError::new(e, written.clone()))?;

        let mut entries = BTreeMap::new();
        for (label, bytes) in rendered {
            let directory = size_directory(namespace, label);
            let path = variant_path(namespace, label, &filename);

            self.storage
                .ensure_directory(&directory)
                .await
                .map_err(|e| PipelineError::new(e, written.clone()))?;
            self.storage
                .write(&path, bytes)
                .await
                .map_err(|e| PipelineError::new(e, written.clone()))?;

            written.push(path.clone());
            entries.insert(label.to_string(), path);
        }

        let manifest = VariantManifest::from_entries(entries)
            .map_err(|e| PipelineError::new(e, written.clone()))?;

        tracing::info!(
            namespace = %namespace,
            filename = %filename,
            content_type = %asset.content_type,
            source_bytes = asset.len(),
            variants = manifest.len(),
            "image variants stored"
        );

        Ok(ProcessedImage { manifest })
    }
}

/// Render every configured size plus the implicit `original` from one
/// decoded source.
fn render_all(
    data: &[u8],
    sizes: &SizeTable,
) -> Result<Vec<(&'static str, Vec<u8>)>, RenderError> {
    let img = VariantRenderer::decode(data)?;

    let mut out = Vec::with_capacity(sizes.len() + 1);
    for spec in sizes.specs() {
        let scaled = VariantRenderer::scale_down(&img, spec);
        out.push((spec.label, VariantRenderer::encode_webp(&scaled)?));
    }
    out.push((ORIGINAL_LABEL, VariantRenderer::encode_webp(&img)?));
    Ok(out)
}
