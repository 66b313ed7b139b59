//! Lossless quarter-turn rotation and mirroring.
//!
//! # Algorithm
//!
//! Rotation writes each source pixel straight to its destination:
//! ```text
//! dst(height - 1 - y, x) = src(x, y)
//! ```
//! The destination is `height` pixels wide and `width` pixels tall. Both
//! operations move whole pixels, so four rotations (or two flips) restore
//! the original buffer exactly.

use crate::raster::RasterBuffer;

/// Rotate `image` a quarter turn clockwise.
pub fn rotate_clockwise(image: &RasterBuffer) -> RasterBuffer {
    let (src_w, src_h) = image.dimensions();
    let n = image.channels().count();
    let (dst_w, dst_h) = (src_h, src_w);
    let dst_stride = dst_w as usize * n;

    let mut output = vec![0u8; image.byte_size()];

    for y in 0..src_h {
        let row = image.row(y);
        let dst_x = (src_h - 1 - y) as usize;
        for x in 0..src_w as usize {
            let dst_idx = x * dst_stride + dst_x * n;
            output[dst_idx..dst_idx + n].copy_from_slice(&row[x * n..x * n + n]);
        }
    }

    RasterBuffer::from_raw_parts(dst_w, dst_h, image.channels(), output)
}

/// Mirror `image` left to right.
pub fn flip_horizontal(image: &RasterBuffer) -> RasterBuffer {
    let n = image.channels().count();
    let mut output = Vec::with_capacity(image.byte_size());

    for y in 0..image.height() {
        for px in image.row(y).chunks_exact(n).rev() {
            output.extend_from_slice(px);
        }
    }

    RasterBuffer::from_raw_parts(image.width(), image.height(), image.channels(), output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::raster::{test_image, Channels};

    #[test]
    fn test_rotate_swaps_dimensions() {
        let img = test_image(30, 10, Channels::Rgb);
        let rotated = rotate_clockwise(&img);
        assert_eq!(rotated.dimensions(), (10, 30));
    }

    #[test]
    fn test_rotate_pixel_mapping() {
        let img = test_image(7, 4, Channels::Rgba);
        let rotated = rotate_clockwise(&img);

        for y in 0..4 {
            for x in 0..7 {
                assert_eq!(rotated.pixel(4 - 1 - y, x), img.pixel(x, y));
            }
        }
    }

    #[test]
    fn test_rotate_top_left_goes_to_top_right() {
        let img = test_image(3, 2, Channels::Rgb);
        let rotated = rotate_clockwise(&img);
        assert_eq!(rotated.pixel(1, 0), img.pixel(0, 0));
        assert_eq!(rotated.pixel(0, 0), img.pixel(0, 1));
    }

    #[test]
    fn test_rotate_four_times_is_identity() {
        let img = test_image(13, 5, Channels::Rgb);
        let mut out = img.clone();
        for _ in 0..4 {
            out = rotate_clockwise(&out);
        }
        assert_eq!(out, img);
    }

    #[test]
    fn test_flip_mirrors_columns() {
        let img = test_image(6, 3, Channels::Rgb);
        let flipped = flip_horizontal(&img);

        assert_eq!(flipped.dimensions(), (6, 3));
        for y in 0..3 {
            for x in 0..6 {
                assert_eq!(flipped.pixel(5 - x, y), img.pixel(x, y));
            }
        }
    }

    #[test]
    fn test_flip_twice_is_identity() {
        let img = test_image(9, 4, Channels::Rgba);
        assert_eq!(flip_horizontal(&flip_horizontal(&img)), img);
    }

    #[test]
    fn test_single_pixel() {
        let img = test_image(1, 1, Channels::Rgb);
        assert_eq!(rotate_clockwise(&img), img);
        assert_eq!(flip_horizontal(&img), img);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
