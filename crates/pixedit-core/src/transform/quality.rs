//! Deliberate quality loss through a JPEG round trip.

use super::TransformError;
use crate::encode::encode_jpeg;
use crate::raster::{Channels, RasterBuffer};
use image::ImageFormat;

/// Round-trip `image` through JPEG at `quality = 100 - level`.
///
/// Level 0 is close to lossless; levels near 100 produce heavy block
/// artifacts. JPEG carries no alpha, so RGBA buffers keep their original
/// alpha samples. The result is irreversible except through undo.
///
/// # Errors
///
/// Returns `TransformError::InvalidParameter` if `level > 100`, or
/// `TransformError::Codec` if the round trip fails.
pub fn degrade_quality(image: &RasterBuffer, level: u8) -> Result<RasterBuffer, TransformError> {
    if level > 100 {
        return Err(TransformError::InvalidParameter(format!(
            "quality level must be within 0..=100, got {level}"
        )));
    }

    // The encoder clamps quality 0 up to 1
    let quality = 100 - level;
    let bytes = encode_jpeg(image, quality).map_err(|e| TransformError::Codec(e.to_string()))?;

    let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Jpeg)
        .map_err(|e| TransformError::Codec(e.to_string()))?
        .into_rgb8();

    if decoded.dimensions() != image.dimensions() {
        return Err(TransformError::Codec(format!(
            "round trip changed dimensions to {}x{}",
            decoded.width(),
            decoded.height()
        )));
    }

    let rgb = decoded.into_raw();
    let pixels = match image.channels() {
        Channels::Rgb => rgb,
        Channels::Rgba => {
            let mut out = Vec::with_capacity(image.byte_size());
            for (color, original) in rgb.chunks_exact(3).zip(image.pixels().chunks_exact(4)) {
                out.extend_from_slice(color);
                out.push(original[3]);
            }
            out
        }
    };

    Ok(RasterBuffer::from_raw_parts(
        image.width(),
        image.height(),
        image.channels(),
        pixels,
    ))
}
