//! Percentage resizing.
//!
//! Resampling goes through the `image` crate. Shrinking uses the triangle
//! filter, whose support the crate widens by the scale ratio, so every
//! output pixel averages the whole source area it covers. Enlarging uses
//! Catmull-Rom for a smooth result.

use super::TransformError;
use crate::raster::RasterBuffer;
use image::imageops::FilterType;

/// Compute the dimensions of `width` x `height` scaled by `percent`.
///
/// Each axis is rounded to the nearest pixel and never drops below 1.
pub fn scaled_dimensions(width: u32, height: u32, percent: u32) -> (u32, u32) {
    let scale = percent as f64 / 100.0;
    let w = (width as f64 * scale).round() as u32;
    let h = (height as f64 * scale).round() as u32;
    (w.max(1), h.max(1))
}

/// Validate `percent` against an inclusive `min..=max` range.
///
/// # Errors
///
/// Returns `TransformError::ScaleOutOfRange` when `percent` falls outside.
pub fn check_scale(percent: u32, min: u32, max: u32) -> Result<(), TransformError> {
    if (min..=max).contains(&percent) {
        Ok(())
    } else {
        Err(TransformError::ScaleOutOfRange { percent, min, max })
    }
}

/// Resize `image` by `percent` on both axes.
///
/// # Errors
///
/// Returns `TransformError::InvalidParameter` for a zero percentage.
pub fn resize_percent(image: &RasterBuffer, percent: u32) -> Result<RasterBuffer, TransformError> {
    if percent == 0 {
        return Err(TransformError::InvalidParameter(
            "resize percentage must be positive".to_string(),
        ));
    }

    let (width, height) = scaled_dimensions(image.width(), image.height(), percent);
    let filter = if percent < 100 {
        FilterType::Triangle
    } else {
        FilterType::CatmullRom
    };
    resize_exact(image, width, height, filter)
}

/// Resample `image` to exactly `width` x `height` with `filter`.
pub(crate) fn resize_exact(
    image: &RasterBuffer,
    width: u32,
    height: u32,
    filter: FilterType,
) -> Result<RasterBuffer, TransformError> {
    // Fast path: if dimensions match, just clone
    if image.dimensions() == (width, height) {
        return Ok(image.clone());
    }

    let source = image
        .to_dynamic()
        .ok_or_else(|| TransformError::Codec("Failed to view raster as image".to_string()))?;

    let resized = source.resize_exact(width, height, filter);
    Ok(RasterBuffer::from_dynamic(resized)?)
}
