//! Vitrine Processing Library
//!
//! Image derivation pipeline for the catalog: every upload is rendered into
//! the fixed set of downscaled WebP variants, persisted through the storage
//! adapter under deterministic paths, and torn down again as a unit when the
//! owning record's image is replaced or deleted.

pub mod deleter;
pub mod filename;
pub mod paths;
pub mod pipeline;
pub mod renderer;
pub mod types;

// Re-export commonly used types
pub use deleter::{DeleteError, DeletionCoordinator};
pub use paths::PathShapeError;
pub use pipeline::{ImagePipeline, PipelineError, PipelineErrorKind};
pub use renderer::{RenderError, VariantRenderer};
pub use types::{ProcessedImage, UploadedAsset};
