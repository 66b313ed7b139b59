//! Brightness adjustment.

use super::TransformError;
use crate::raster::RasterBuffer;

/// Multiply every color sample of `image` by `factor`.
///
/// Results are rounded and clamped to `0..=255`, so bright pixels saturate
/// instead of wrapping. Alpha samples are left untouched. A factor of `1.0`
/// returns an identical buffer and `0.0` turns every color sample to zero.
///
/// # Errors
///
/// Returns `TransformError::InvalidParameter` for negative or non-finite
/// factors.
pub fn adjust_brightness(image: &RasterBuffer, factor: f32) -> Result<RasterBuffer, TransformError> {
    if !factor.is_finite() || factor < 0.0 {
        return Err(TransformError::InvalidParameter(format!(
            "brightness factor must be a finite value >= 0, got {factor}"
        )));
    }

    // 256-entry lookup table; every sample goes through the same mapping
    let mut lut = [0u8; 256];
    for (i, out) in lut.iter_mut().enumerate() {
        *out = (i as f32 * factor).round().clamp(0.0, 255.0) as u8;
    }

    let n = image.channels().count();
    let has_alpha = image.channels().has_alpha();
    let mut output = image.pixels().to_vec();

    for px in output.chunks_exact_mut(n) {
        let color = if has_alpha { &mut px[..3] } else { &mut px[..] };
        for sample in color {
            *sample = lut[*sample as usize];
        }
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

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::raster::{test_image, Channels};
    use proptest::prelude::*;

    proptest! {
        /// Property: Brightening never darkens a sample, darkening never brightens one.
        #[test]
        fn prop_monotonic_in_factor(factor in 0.0f32..=4.0, width in 1u32..=20, height in 1u32..=20) {
            let img = test_image(width, height, Channels::Rgb);
            let out = adjust_brightness(&img, factor).unwrap();

            for (&before, &after) in img.pixels().iter().zip(out.pixels()) {
                if factor >= 1.0 {
                    prop_assert!(after >= before);
                } else {
                    prop_assert!(after <= before);
                }
            }
        }

        /// Property: Dimensions and layout never change.
        #[test]
        fn prop_shape_preserved(factor in 0.0f32..=4.0, alpha in any::<bool>()) {
            let channels = if alpha { Channels::Rgba } else { Channels::Rgb };
            let img = test_image(9, 7, channels);
            let out = adjust_brightness(&img, factor).unwrap();
            prop_assert_eq!(out.dimensions(), img.dimensions());
            prop_assert_eq!(out.channels(), channels);
        }
    }
}
