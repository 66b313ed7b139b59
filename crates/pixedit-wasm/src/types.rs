//! WASM-compatible wrapper types for image data.
//!
//! This module provides JavaScript-friendly types that wrap the core Pixedit
//! types, handling the conversion between Rust and JavaScript representations.

use pixedit_core::raster::{Channels, RasterBuffer, RasterError};
use wasm_bindgen::prelude::*;

/// A raster buffer wrapper for JavaScript.
///
/// # Memory Management
///
/// The pixel data is stored in WASM memory. When you call `pixels()`, a copy
/// is made to JavaScript memory as a `Uint8Array`.
#[wasm_bindgen]
pub struct JsRasterBuffer {
    inner: RasterBuffer,
}

#[wasm_bindgen]
impl JsRasterBuffer {
    /// Create a buffer from dimensions, channel count (3 or 4) and
    /// interleaved pixel data.
    #[wasm_bindgen(constructor)]
    pub fn new(
        width: u32,
        height: u32,
        channels: u8,
        pixels: Vec<u8>,
    ) -> Result<JsRasterBuffer, JsValue> {
        Self::from_parts(width, height, channels, pixels)
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    /// Samples per pixel: 3 for RGB, 4 for RGBA
    #[wasm_bindgen(getter)]
    pub fn channels(&self) -> u8 {
        self.inner.channels().count() as u8
    }

    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.byte_size()
    }

    /// Returns pixel data as a Uint8Array copy.
    pub fn pixels(&self) -> Vec<u8> {
        self.inner.pixels().to_vec()
    }

    /// Returns pixel data expanded to RGBA, ready for `new ImageData(...)`.
    pub fn rgba_pixels(&self) -> js_sys::Uint8ClampedArray {
        js_sys::Uint8ClampedArray::from(self.rgba_bytes().as_slice())
    }

    /// Explicitly free WASM memory.
    pub fn free(self) {
        // Dropping self releases the memory
    }
}

impl JsRasterBuffer {
    pub(crate) fn rgba_bytes(&self) -> Vec<u8> {
        match self.inner.channels() {
            Channels::Rgba => self.inner.pixels().to_vec(),
            Channels::Rgb => self
                .inner
                .pixels()
                .chunks_exact(3)
                .flat_map(|p| [p[0], p[1], p[2], 255])
                .collect(),
        }
    }

    pub(crate) fn from_parts(
        width: u32,
        height: u32,
        channels: u8,
        pixels: Vec<u8>,
    ) -> Result<Self, RasterError> {
        let channels = match channels {
            4 => Channels::Rgba,
            _ => Channels::Rgb,
        };
        RasterBuffer::new(width, height, channels, pixels).map(Self::from_raster)
    }

    pub(crate) fn from_raster(inner: RasterBuffer) -> Self {
        Self { inner }
    }

    pub(crate) fn as_raster(&self) -> &RasterBuffer {
        &self.inner
    }
}
