//! Stored-path construction and sibling derivation.
//!
//! Every variant lives at `{namespace}/{size_label}/{filename}.webp`. The
//! size label is always the second-to-last segment; the deletion coordinator
//! relies on this shape to reconstruct every sibling variant from any one
//! stored path.

use thiserror::Error;
use vitrine_core::sizes::{SizeTable, ORIGINAL_LABEL, OUTPUT_EXTENSION};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PathShapeError {
    #[error("stored path '{0}' does not have a namespace/size/filename shape")]
    Malformed(String),
}

/// Directory holding one size's variants within a namespace.
pub fn size_directory(namespace: &str, label: &str) -> String {
    format!("{}/{}", namespace, label)
}

/// Full stored path for one variant.
pub fn variant_path(namespace: &str, label: &str, filename: &str) -> String {
    format!("{}/{}/{}.{}", namespace, label, filename, OUTPUT_EXTENSION)
}

/// Derive the full variant set (configured sizes plus `original`) from any
/// one stored path by substituting the size segment.
pub fn sibling_paths(path: &str, sizes: &SizeTable) -> Result<Vec<String>, PathShapeError> {
    let (prefix, _, filename) = split_variant_path(path)?;

    let mut out = Vec::with_capacity(sizes.len() + 1);
    for spec in sizes.specs() {
        out.push(format!("{}/{}/{}", prefix, spec.label, filename));
    }
    out.push(format!("{}/{}/{}", prefix, ORIGINAL_LABEL, filename));
    Ok(out)
}

/// Split `{namespace}/{size}/{filename}` into its three parts. The
/// namespace may itself contain slashes.
fn split_variant_path(path: &str) -> Result<(&str, &str, &str), PathShapeError> {
    let mut parts = path.rsplitn(3, '/');
    let filename = parts.next().filter(|s| !s.is_empty());
    let size = parts.next().filter(|s| !s.is_empty());
    let prefix = parts.next().filter(|s| !s.is_empty());

    match (prefix, size, filename) {
        (Some(prefix), Some(size), Some(filename)) => Ok((prefix, size, filename)),
        _ => Err(PathShapeError::Malformed(path.to_string())),
    }
}
