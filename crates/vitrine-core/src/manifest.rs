//! Variant manifest: the durable mapping from size label to stored path.
//!
//! A manifest is produced once per upload, embedded in the owning domain
//! record (brand, category, quality, product image), and destroyed together
//! with that record's image. It serializes to a flat JSON object:
//!
//! ```json
//! {
//!   "thumbnail": "products/thumbnail/<uuid>_<ts>.webp",
//!   "small": "products/small/<uuid>_<ts>.webp",
//!   "medium": "products/medium/<uuid>_<ts>.webp",
//!   "large": "products/large/<uuid>_<ts>.webp",
//!   "original": "products/original/<uuid>_<ts>.webp"
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::sizes::ORIGINAL_LABEL;

/// Manifest validation errors, raised at the deserialization boundary so
/// malformed or legacy-shaped manifests are rejected early.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ManifestError {
    #[error("manifest is missing the required 'original' entry")]
    MissingOriginal,

    #[error("manifest entry '{0}' has an empty path")]
    EmptyPath(String),
}

/// Mapping from size label (including `original`) to stored path.
///
/// Invariant: the `original` entry is always present. Construction and
/// deserialization both enforce it, so `original()` is total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, String>",
    into = "BTreeMap<String, String>"
)]
pub struct VariantManifest {
    entries: BTreeMap<String, String>,
}

impl VariantManifest {
    /// Build a manifest from label → path entries, validating the invariant.
    pub fn from_entries(entries: BTreeMap<String, String>) -> Result<Self, ManifestError> {
        if !entries.contains_key(ORIGINAL_LABEL) {
            return Err(ManifestError::MissingOriginal);
        }
        if let Some((label, _)) = entries.iter().find(|(_, path)| path.is_empty()) {
            return Err(ManifestError::EmptyPath(label.clone()));
        }
        Ok(VariantManifest { entries })
    }

    /// Stored path of the full-resolution variant.
    pub fn original(&self) -> &str {
        // Upheld by from_entries; the map cannot lose the key afterwards.
        self.entries
            .get(ORIGINAL_LABEL)
            .map(String::as_str)
            .unwrap_or_default()
    }

    /// Stored path for one size label, if present.
    pub fn path(&self, label: &str) -> Option<&str> {
        self.entries.get(label).map(String::as_str)
    }

    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Every stored path in the manifest. This set is also the cleanup
    /// handle for compensating deletion.
    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(label, path)| (label.as_str(), path.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl TryFrom<BTreeMap<String, String>> for VariantManifest {
    type Error = ManifestError;

    fn try_from(entries: BTreeMap<String, String>) -> Result<Self, Self::Error> {
        VariantManifest::from_entries(entries)
    }
}

impl From<VariantManifest> for BTreeMap<String, String> {
    fn from(manifest: VariantManifest) -> Self {
        manifest.entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_entries() -> BTreeMap<String, String> {
        let mut entries = BTreeMap::new();
        for label in ["thumbnail", "small", "medium", "large", "original"] {
            entries.insert(
                label.to_string(),
                format!("products/{}/abc_123.webp", label),
            );
        }
        entries
    }

    #[test]
    fn from_entries_requires_original() {
        let mut entries = sample_entries();
        entries.remove("original");
        assert_eq!(
            VariantManifest::from_entries(entries),
            Err(ManifestError::MissingOriginal)
        );
    }

    #[test]
    fn from_entries_rejects_empty_paths() {
        let mut entries = sample_entries();
        entries.insert("small".to_string(), String::new());
        assert_eq!(
            VariantManifest::from_entries(entries),
            Err(ManifestError::EmptyPath("small".to_string()))
        );
    }

    #[test]
    fn original_accessor() {
        let manifest = VariantManifest::from_entries(sample_entries()).unwrap();
        assert_eq!(manifest.original(), "products/original/abc_123.webp");
        assert_eq!(
            manifest.path("thumbnail"),
            Some("products/thumbnail/abc_123.webp")
        );
        assert_eq!(manifest.path("huge"), None);
        assert_eq!(manifest.len(), 5);
    }

    #[test]
    fn serde_round_trip_is_lossless() {
        let manifest = VariantManifest::from_entries(sample_entries()).unwrap();
        let json = serde_json::to_string(&manifest).unwrap();
        let restored: VariantManifest = serde_json::from_str(&json).unwrap();
        assert_eq!(manifest, restored);

        // The persisted shape is a flat object keyed by size label.
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert!(value.is_object());
        assert_eq!(
            value["original"],
            serde_json::json!("products/original/abc_123.webp")
        );
    }

    #[test]
    fn deserialization_rejects_manifest_without_original() {
        let json = r#"{"thumbnail": "products/thumbnail/a.webp"}"#;
        let result: Result<VariantManifest, _> = serde_json::from_str(json);
        assert!(result.is_err());
    }
}
