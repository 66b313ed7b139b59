//! JPEG encoding for saving and the quality-degrade transform.
//!
//! This module provides JPEG encoding using the `image` crate's JPEG encoder.
//! JPEG has no alpha channel, so RGBA buffers are flattened to RGB by
//! dropping the alpha samples.

use super::EncodeError;
use crate::raster::{Channels, RasterBuffer};
use image::codecs::jpeg::JpegEncoder;
use image::ExtendedColorType;
use image::ImageEncoder;
use std::io::Cursor;

/// Encode a buffer to JPEG bytes.
///
/// # Arguments
///
/// * `image` - Buffer to encode
/// * `quality` - JPEG quality (1-100, where 100 is highest quality); values
///   outside the range are clamped
///
/// # Quality Guidelines
///
/// * 90-100: High quality, suitable for further editing (save default: 90)
/// * 60-80: Medium quality, acceptable for web
/// * Below 30: Heavy block artifacts
pub fn encode_jpeg(image: &RasterBuffer, quality: u8) -> Result<Vec<u8>, EncodeError> {
    let rgb;
    let pixels = match image.channels() {
        Channels::Rgb => image.pixels(),
        Channels::Rgba => {
            rgb = strip_alpha(image.pixels());
            &rgb[..]
        }
    };

    // Clamp quality to valid range (1-100)
    let quality = quality.clamp(1, 100);

    let mut buffer = Cursor::new(Vec::new());
    let encoder = JpegEncoder::new_with_quality(&mut buffer, quality);

    encoder
        .write_image(pixels, image.width(), image.height(), ExtendedColorType::Rgb8)
        .map_err(|e| EncodeError::EncodingFailed(e.to_string()))?;

    Ok(buffer.into_inner())
}

fn strip_alpha(rgba: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(rgba.len() / 4 * 3);
    for px in rgba.chunks_exact(4) {
        out.extend_from_slice(&px[..3]);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::test_image;

    fn assert_jpeg_markers(bytes: &[u8]) {
        // SOI ... EOI
        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
        assert_eq!(&bytes[bytes.len() - 2..], &[0xFF, 0xD9]);
    }

    #[test]
    fn test_encode_jpeg_basic() {
        let img = RasterBuffer::filled(100, 100, Channels::Rgb, 128).unwrap();
        let bytes = encode_jpeg(&img, 90).unwrap();
        assert_jpeg_markers(&bytes);
    }

    #[test]
    fn test_encode_jpeg_rgba_drops_alpha() {
        let img = test_image(30, 20, Channels::Rgba);
        let bytes = encode_jpeg(&img, 90).unwrap();
        assert_jpeg_markers(&bytes);

        let decoded = image::load_from_memory(&bytes).unwrap();
        assert!(!decoded.color().has_alpha());
        assert_eq!((decoded.width(), decoded.height()), (30, 20));
    }

    #[test]
    fn test_encode_jpeg_quality_clamping() {
        let img = RasterBuffer::filled(10, 10, Channels::Rgb, 128).unwrap();

        // Quality 0 should be clamped to 1
        assert!(encode_jpeg(&img, 0).is_ok());
        // Quality 255 should be clamped to 100
        assert!(encode_jpeg(&img, 255).is_ok());
    }

    #[test]
    fn test_encode_jpeg_small_image() {
        let img = RasterBuffer::new(1, 1, Channels::Rgb, vec![255, 0, 0]).unwrap();
        let bytes = encode_jpeg(&img, 90).unwrap();
        assert_eq!(&bytes[0..2], &[0xFF, 0xD8]);
    }

    #[test]
    fn test_strip_alpha() {
        assert_eq!(strip_alpha(&[1, 2, 3, 4, 5, 6, 7, 8]), vec![1, 2, 3, 5, 6, 7]);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::raster::test_image;
    use proptest::prelude::*;

    proptest! {
        /// Property: Same input always produces same output (deterministic).
        #[test]
        fn prop_deterministic_output(
            (width, height) in (1u32..=20, 1u32..=20),
            quality in 1u8..=100,
        ) {
            let img = test_image(width, height, Channels::Rgb);

            let first = encode_jpeg(&img, quality).unwrap();
            let second = encode_jpeg(&img, quality).unwrap();
            prop_assert_eq!(first, second, "Same input should produce same output");
        }

        /// Property: Aspect ratios don't affect encoding success.
        #[test]
        fn prop_aspect_ratio_independence(
            short_side in 1u32..=20,
            ratio in 1u32..=10,
        ) {
            let long_side = short_side * ratio;

            let wide = RasterBuffer::filled(long_side, short_side, Channels::Rgb, 128).unwrap();
            let tall = RasterBuffer::filled(short_side, long_side, Channels::Rgba, 128).unwrap();

            prop_assert!(encode_jpeg(&wide, 90).is_ok(), "Wide image should encode");
            prop_assert!(encode_jpeg(&tall, 90).is_ok(), "Tall image should encode");
        }
    }
}
