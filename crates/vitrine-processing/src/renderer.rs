//! Variant renderer: decode, downscale, re-encode to the fixed codec.
//!
//! A pure transform over bytes; storage is the pipeline's concern. Every
//! variant is re-encoded to WebP so downstream consumers always know the
//! extension, whatever format the upload arrived in.

use std::io::Cursor;

use image::imageops::FilterType;
use image::{DynamicImage, GenericImageView, ImageReader};
use thiserror::Error;
use vitrine_core::sizes::{SizeSpec, WEBP_QUALITY};

/// Render errors. Both are fatal to the current pipeline run; neither is
/// retried.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Input bytes are not a supported raster image (corrupt or unknown
    /// format). Surfaced to callers as a validation-style failure.
    #[error("failed to decode image: {0}")]
    Decode(String),

    /// Re-encoding a structurally valid decoded image failed. An internal
    /// fault.
    #[error("failed to encode image: {0}")]
    Encode(String),
}

pub struct VariantRenderer;

impl VariantRenderer {
    /// Decode an uploaded image, guessing the format from its content.
    pub fn decode(data: &[u8]) -> Result<DynamicImage, RenderError> {
        let reader = ImageReader::new(Cursor::new(data))
            .with_guessed_format()
            .map_err(|e| RenderError::Decode(e.to_string()))?;
        reader
            .decode()
            .map_err(|e| RenderError::Decode(e.to_string()))
    }

    /// Scale `img` down so both dimensions fit within `spec`, preserving
    /// aspect ratio. Images already inside the box are returned unchanged;
    /// nothing is ever upscaled.
    pub fn scale_down(img: &DynamicImage, spec: &SizeSpec) -> DynamicImage {
        let (width, height) = img.dimensions();
        if width <= spec.max_width && height <= spec.max_height {
            return img.clone();
        }
        img.resize(spec.max_width, spec.max_height, FilterType::Lanczos3)
    }

    /// Re-encode to WebP at the fixed quality.
    pub fn encode_webp(img: &DynamicImage) -> Result<Vec<u8>, RenderError> {
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        let encoder = webp::Encoder::from_rgba(&rgba, width, height);
        let encoded = encoder
            .encode_simple(false, WEBP_QUALITY)
            .map_err(|e| RenderError::Encode(format!("{:?}", e)))?;

        Ok(encoded.to_vec())
    }

    /// Full render for one size: decode, scale down, re-encode.
    pub fn render(data: &[u8], spec: &SizeSpec) -> Result<Vec<u8>, RenderError> {
        let img = Self::decode(data)?;
        Self::encode_webp(&Self::scale_down(&img, spec))
    }

    /// Render the `original` pseudo-variant: re-encode only, no resize.
    pub fn render_original(data: &[u8]) -> Result<Vec<u8>, RenderError> {
        let img = Self::decode(data)?;
        Self::encode_webp(&img)
    }
}
