//! Vitrine Storage Library
//!
//! This crate provides the storage abstraction the image pipeline writes
//! through, with local filesystem and S3 implementations.
//!
//! # Path format
//!
//! Stored paths are slash-separated relative keys of the shape
//! `{namespace}/{size_label}/{filename}.webp` (e.g.
//! `products/thumbnail/3f2a…_1717430400.webp`). Paths must not contain `..`
//! or a leading `/`. Path construction lives in the processing crate; the
//! backends here treat paths as opaque keys.

pub mod factory;
#[cfg(feature = "storage-local")]
pub mod local;
#[cfg(feature = "storage-s3")]
pub mod s3;
pub mod traits;

// Re-export commonly used types
pub use factory::create_storage;
#[cfg(feature = "storage-local")]
pub use local::LocalStorage;
#[cfg(feature = "storage-s3")]
pub use s3::S3Storage;
pub use traits::{Storage, StorageError, StorageResult};
pub use vitrine_core::StorageBackend;
