//! In-memory raster buffers.
//!
//! A [`RasterBuffer`] is the unit every transform consumes and produces. Its
//! fields are private so that a buffer cannot be changed once created: every
//! edit yields a fresh buffer, which lets the history hold earlier states
//! without copying ambiguity.

use image::DynamicImage;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when constructing a buffer from raw parts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RasterError {
    /// Width or height is zero
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// Pixel data length doesn't match width * height * channels
    #[error("Invalid pixel data: expected {expected} bytes, got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },
}

/// Sample layout of a buffer. Samples are always 8 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Channels {
    /// Three samples per pixel.
    #[default]
    Rgb,
    /// Four samples per pixel, alpha last.
    Rgba,
}

impl Channels {
    /// Number of samples per pixel.
    #[inline]
    pub fn count(self) -> usize {
        match self {
            Channels::Rgb => 3,
            Channels::Rgba => 4,
        }
    }

    #[inline]
    pub fn has_alpha(self) -> bool {
        matches!(self, Channels::Rgba)
    }
}

/// A decoded, immutable pixel grid in row-major interleaved order.
///
/// Equality compares dimensions, layout and every byte, so two buffers
/// produced by the same sequence of transforms compare equal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    channels: Channels,
    pixels: Vec<u8>,
}

impl RasterBuffer {
    /// Create a buffer, validating dimensions and pixel length.
    pub fn new(
        width: u32,
        height: u32,
        channels: Channels,
        pixels: Vec<u8>,
    ) -> Result<Self, RasterError> {
        if width == 0 || height == 0 {
            return Err(RasterError::InvalidDimensions { width, height });
        }

        let expected = width as usize * height as usize * channels.count();
        if pixels.len() != expected {
            return Err(RasterError::InvalidPixelData {
                expected,
                actual: pixels.len(),
            });
        }

        Ok(Self {
            width,
            height,
            channels,
            pixels,
        })
    }

    /// Create a buffer with every sample set to `value`.
    pub fn filled(
        width: u32,
        height: u32,
        channels: Channels,
        value: u8,
    ) -> Result<Self, RasterError> {
        let len = width as usize * height as usize * channels.count();
        Self::new(width, height, channels, vec![value; len])
    }

    /// Internal constructor for transforms that already sized their output.
    pub(crate) fn from_raw_parts(
        width: u32,
        height: u32,
        channels: Channels,
        pixels: Vec<u8>,
    ) -> Self {
        debug_assert!(width > 0 && height > 0, "Empty raster");
        debug_assert_eq!(
            pixels.len(),
            width as usize * height as usize * channels.count(),
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            channels,
            pixels,
        }
    }

    /// Convert a decoded `image` crate image. Images with an alpha channel
    /// become RGBA, everything else RGB; samples are narrowed to 8 bits.
    pub fn from_dynamic(img: DynamicImage) -> Result<Self, RasterError> {
        if img.color().has_alpha() {
            let rgba = img.into_rgba8();
            let (width, height) = rgba.dimensions();
            Self::new(width, height, Channels::Rgba, rgba.into_raw())
        } else {
            let rgb = img.into_rgb8();
            let (width, height) = rgb.dimensions();
            Self::new(width, height, Channels::Rgb, rgb.into_raw())
        }
    }

    /// Convert to an `image` crate image for resampling or encoding.
    ///
    /// Note: this clones the pixel data.
    pub fn to_dynamic(&self) -> Option<DynamicImage> {
        match self.channels {
            Channels::Rgb => image::RgbImage::from_raw(self.width, self.height, self.pixels.clone())
                .map(DynamicImage::ImageRgb8),
            Channels::Rgba => {
                image::RgbaImage::from_raw(self.width, self.height, self.pixels.clone())
                    .map(DynamicImage::ImageRgba8)
            }
        }
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    #[inline]
    pub fn channels(&self) -> Channels {
        self.channels
    }

    /// Raw samples, row-major.
    #[inline]
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Bytes per row.
    #[inline]
    pub fn stride(&self) -> usize {
        self.width as usize * self.channels.count()
    }

    /// Samples of one row.
    pub fn row(&self, y: u32) -> &[u8] {
        let start = y as usize * self.stride();
        &self.pixels[start..start + self.stride()]
    }

    /// Samples of the pixel at `(x, y)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinate is outside the buffer.
    pub fn pixel(&self, x: u32, y: u32) -> &[u8] {
        let n = self.channels.count();
        let idx = y as usize * self.stride() + x as usize * n;
        &self.pixels[idx..idx + n]
    }

    pub fn pixel_count(&self) -> u64 {
        self.width as u64 * self.height as u64
    }

    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }
}

/// Build a buffer whose samples encode their position, for tests.
#[cfg(test)]
pub(crate) fn test_image(width: u32, height: u32, channels: Channels) -> RasterBuffer {
    let n = channels.count();
    let mut pixels = Vec::with_capacity(width as usize * height as usize * n);
    for y in 0..height {
        for x in 0..width {
            pixels.push((x % 256) as u8);
            pixels.push((y % 256) as u8);
            pixels.push(((x + y * width) % 251) as u8);
            if n == 4 {
                pixels.push(200);
            }
        }
    }
    RasterBuffer::from_raw_parts(width, height, channels, pixels)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_valid() {
        let buf = RasterBuffer::new(4, 2, Channels::Rgb, vec![0u8; 4 * 2 * 3]).unwrap();
        assert_eq!(buf.dimensions(), (4, 2));
        assert_eq!(buf.stride(), 12);
        assert_eq!(buf.pixel_count(), 8);
        assert_eq!(buf.byte_size(), 24);
    }

    #[test]
    fn test_new_zero_dimensions() {
        let err = RasterBuffer::new(0, 5, Channels::Rgb, vec![]).unwrap_err();
        assert_eq!(err, RasterError::InvalidDimensions { width: 0, height: 5 });
    }

    #[test]
    fn test_new_wrong_length() {
        let err = RasterBuffer::new(2, 2, Channels::Rgba, vec![0u8; 12]).unwrap_err();
        assert_eq!(
            err,
            RasterError::InvalidPixelData {
                expected: 16,
                actual: 12
            }
        );
    }

    #[test]
    fn test_pixel_and_row_access() {
        let buf = test_image(5, 3, Channels::Rgba);
        assert_eq!(buf.pixel(2, 1), &[2, 1, 7, 200]);
        assert_eq!(buf.row(1).len(), 20);
        assert_eq!(&buf.row(1)[8..12], buf.pixel(2, 1));
    }

    #[test]
    fn test_equality_is_by_content() {
        let a = test_image(8, 8, Channels::Rgb);
        let b = test_image(8, 8, Channels::Rgb);
        assert_eq!(a, b);

        let c = RasterBuffer::filled(8, 8, Channels::Rgb, 0).unwrap();
        assert_ne!(a, c);
    }

    #[test]
    fn test_dynamic_round_trip_keeps_layout() {
        let rgb = test_image(6, 4, Channels::Rgb);
        let back = RasterBuffer::from_dynamic(rgb.to_dynamic().unwrap()).unwrap();
        assert_eq!(back, rgb);

        let rgba = test_image(6, 4, Channels::Rgba);
        let back = RasterBuffer::from_dynamic(rgba.to_dynamic().unwrap()).unwrap();
        assert_eq!(back, rgba);
    }

    #[test]
    fn test_from_dynamic_grayscale_becomes_rgb() {
        let gray = image::GrayImage::from_pixel(3, 3, image::Luma([77]));
        let buf = RasterBuffer::from_dynamic(DynamicImage::ImageLuma8(gray)).unwrap();
        assert_eq!(buf.channels(), Channels::Rgb);
        assert_eq!(buf.pixel(1, 1), &[77, 77, 77]);
    }
}
