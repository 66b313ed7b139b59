//! Region-based cropping and masking.
//!
//! Both operations take a [`Region`] in source pixel coordinates. The region
//! is intersected with the image bounds first; a region that keeps no pixels
//! is rejected with [`TransformError::InvalidRegion`] rather than grown to a
//! minimum size.
//!
//! # Example
//!
//! ```ignore
//! // Keep the 50x30 block whose top-left corner is (10, 10)
//! let cropped = crop(&image, Region::new(10, 10, 60, 40))?;
//! ```

use super::TransformError;
use crate::raster::RasterBuffer;
use crate::region::Region;

fn clip_or_reject(image: &RasterBuffer, region: Region) -> Result<Region, TransformError> {
    region
        .clip(image.width(), image.height())
        .ok_or(TransformError::InvalidRegion {
            region,
            width: image.width(),
            height: image.height(),
        })
}

/// Crop `image` to `region`.
///
/// The output has the dimensions of the intersection of `region` with the
/// image bounds and holds exactly those source pixels.
///
/// # Errors
///
/// Returns `TransformError::InvalidRegion` if the intersection has zero
/// width or height.
pub fn crop(image: &RasterBuffer, region: Region) -> Result<RasterBuffer, TransformError> {
    let clipped = clip_or_reject(image, region)?;

    let n = image.channels().count();
    let out_width = clipped.width() as u32;
    let out_height = clipped.height() as u32;
    let left = clipped.x1() as usize * n;
    let row_len = out_width as usize * n;

    let mut output = Vec::with_capacity(row_len * out_height as usize);

    // Rows are contiguous, so each output row is one slice copy
    for y in clipped.y1()..clipped.y2() {
        let row = image.row(y as u32);
        output.extend_from_slice(&row[left..left + row_len]);
    }

    Ok(RasterBuffer::from_raw_parts(
        out_width,
        out_height,
        image.channels(),
        output,
    ))
}

/// Keep only the pixels inside `region`, clearing everything outside it.
///
/// Dimensions are unchanged. Cleared pixels have every sample set to zero,
/// which makes them transparent in RGBA buffers.
///
/// # Errors
///
/// Returns `TransformError::InvalidRegion` under the same rule as [`crop`].
pub fn mask_region(image: &RasterBuffer, region: Region) -> Result<RasterBuffer, TransformError> {
    let clipped = clip_or_reject(image, region)?;

    let n = image.channels().count();
    let stride = image.stride();
    let left = clipped.x1() as usize * n;
    let right = clipped.x2() as usize * n;

    let mut output = vec![0u8; image.byte_size()];
    for y in clipped.y1()..clipped.y2() {
        let start = y as usize * stride;
        output[start + left..start + right]
            .copy_from_slice(&image.row(y as u32)[left..right]);
    }

    Ok(RasterBuffer::from_raw_parts(
        image.width(),
        image.height(),
        image.channels(),
        output,
    ))
}


// ============================================================================
// Property-Based Tests
// ============================================================================
