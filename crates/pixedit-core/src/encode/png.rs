//! Lossless PNG encoding.

use super::EncodeError;
use crate::raster::{Channels, RasterBuffer};
use image::codecs::png::PngEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;

/// Encode a buffer to PNG bytes, keeping alpha when present.
pub fn encode_png(image: &RasterBuffer) -> Result<Vec<u8>, EncodeError> {
    let color = match image.channels() {
        Channels::Rgb => ExtendedColorType::Rgb8,
        Channels::Rgba => ExtendedColorType::Rgba8,
    };

    let mut buffer = Cursor::new(Vec::new());
    PngEncoder::new(&mut buffer)
        .write_image(image.pixels(), image.width(), image.height(), color)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}
