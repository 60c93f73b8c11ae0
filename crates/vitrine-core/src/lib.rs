//! Vitrine Core Library
//!
//! This crate provides the domain models, configuration, and derived-image
//! size table shared across all vitrine components.

pub mod config;
pub mod manifest;
pub mod sizes;
pub mod storage_types;

// Re-export commonly used types
pub use config::MediaStoreConfig;
pub use manifest::{ManifestError, VariantManifest};
pub use sizes::{SizeSpec, SizeTable, ORIGINAL_LABEL, OUTPUT_EXTENSION, WEBP_QUALITY};
pub use storage_types::StorageBackend;
