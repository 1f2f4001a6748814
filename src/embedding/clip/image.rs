//! Raster decode and CLIP pixel preprocessing.

use candle_core::{DType, Device, Tensor};
use image::DynamicImage;

use crate::embedding::error::EmbeddingError;

/// Decodes raw upload bytes into an image.
///
/// Format is sniffed from the payload itself, not from any client-supplied
/// content type. Malformed or unsupported payloads surface as
/// [`EmbeddingError::DecodeFailed`] so callers can reject them before any
/// inference work happens.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, EmbeddingError> {
    image::load_from_memory(bytes).map_err(|e| EmbeddingError::DecodeFailed {
        reason: e.to_string(),
    })
}

/// Converts a decoded image into the `[1, 3, size, size]` tensor CLIP's
/// vision tower expects: RGB, resized-to-fill, scaled into [-1, 1].
pub(crate) fn preprocess(
    image: &DynamicImage,
    image_size: usize,
    device: &Device,
) -> Result<Tensor, EmbeddingError> {
    let side = image_size as u32;
    let resized = image.resize_to_fill(side, side, image::imageops::FilterType::Triangle);
    let raw = resized.to_rgb8().into_raw();

    let pixels = Tensor::from_vec(raw, (image_size, image_size, 3), device)?
        .permute((2, 0, 1))?
        .to_dtype(DType::F32)?
        .affine(2.0 / 255.0, -1.0)?
        .unsqueeze(0)?;

    Ok(pixels)
}
