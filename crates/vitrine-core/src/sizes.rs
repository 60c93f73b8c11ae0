//! Derived-image size table.
//!
//! Every uploaded catalog image is rendered into the fixed set of variants
//! defined here, plus the implicit `original` (re-encoded, never resized).
//! The table is a process-wide constant injected at pipeline construction;
//! it is not configurable per call.

/// Label of the implicit full-resolution variant.
pub const ORIGINAL_LABEL: &str = "original";

/// File extension of the fixed output codec. All stored variants are WebP
/// regardless of upload format.
pub const OUTPUT_EXTENSION: &str = "webp";

/// Fixed WebP quality (0-100) used for every re-encode.
pub const WEBP_QUALITY: f32 = 80.0;

/// Bounding box one resized variant must fit within.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SizeSpec {
    pub label: &'static str,
    pub max_width: u32,
    pub max_height: u32,
}

impl SizeSpec {
    pub const fn new(label: &'static str, max_width: u32, max_height: u32) -> Self {
        SizeSpec {
            label,
            max_width,
            max_height,
        }
    }
}

/// The production size table.
pub const DEFAULT_SIZES: [SizeSpec; 4] = [
    SizeSpec::new("thumbnail", 150, 150),
    SizeSpec::new("small", 300, 300),
    SizeSpec::new("medium", 600, 600),
    SizeSpec::new("large", 1200, 1200),
];

/// Immutable set of size specs a pipeline or deletion coordinator works with.
///
/// Tests may construct smaller tables; production code uses [`Default`].
#[derive(Debug, Clone)]
pub struct SizeTable {
    specs: Vec<SizeSpec>,
}

impl SizeTable {
    pub fn new(specs: Vec<SizeSpec>) -> Self {
        SizeTable { specs }
    }

    pub fn specs(&self) -> &[SizeSpec] {
        &self.specs
    }

    /// Labels of the resized variants (excluding `original`).
    pub fn labels(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.specs.iter().map(|s| s.label)
    }

    /// Whether `label` names a configured size or the implicit `original`.
    pub fn contains_label(&self, label: &str) -> bool {
        label == ORIGINAL_LABEL || self.specs.iter().any(|s| s.label == label)
    }

    /// Number of resized variants (the full variant set is one larger).
    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

impl Default for SizeTable {
    fn default() -> Self {
        SizeTable::new(DEFAULT_SIZES.to_vec())
    }
}
