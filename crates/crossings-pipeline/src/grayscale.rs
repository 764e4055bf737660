//! Image decoding and grayscale conversion.
//!
//! Accepts raw image bytes (PNG, JPEG, BMP, WebP) and produces a
//! single-channel grayscale image that [`BinaryField::from_luma`]
//! thresholds into ink and paper.
//!
//! [`BinaryField::from_luma`]: crate::field::BinaryField::from_luma

use image::{DynamicImage, GrayImage};

use crate::types::PipelineError;

/// Decode raw image bytes.
///
/// # Errors
///
/// Returns [`PipelineError::EmptyInput`] if `bytes` is empty.
/// Returns [`PipelineError::ImageDecode`] if the image format is
/// unrecognized or the data is corrupt.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage, PipelineError> {
    if bytes.is_empty() {
        return Err(PipelineError::EmptyInput);
    }

    Ok(image::load_from_memory(bytes)?)
}

/// Convert a decoded image to 8-bit luma.
///
/// Uses the `image` crate's weighted luminance conversion, so pure
/// black strokes stay at 0 regardless of the source color type.
#[must_use = "returns the grayscale image"]
pub fn to_gray(image: &DynamicImage) -> GrayImage {
    image.to_luma8()
}

/// Decode raw image bytes and convert to grayscale.
///
/// # Errors
///
/// Same as [`decode`].
pub fn decode_and_grayscale(bytes: &[u8]) -> Result<GrayImage, PipelineError> {
    decode(bytes).map(|img| to_gray(&img))
}
