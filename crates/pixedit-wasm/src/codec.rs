//! Decode and encode bindings for use outside a session.
//!
//! # Example
//!
//! ```typescript
//! import { decode_image, encode_image } from '@pixedit/wasm';
//!
//! const image = decode_image(new Uint8Array(await file.arrayBuffer()));
//! const png = encode_image(image, 'png', 90);
//! ```

use crate::types::JsRasterBuffer;
use pixedit_core::encode::{self, SaveFormat};
use pixedit_core::{decode, view::ViewState};
use wasm_bindgen::prelude::*;

/// Decode JPEG, PNG, BMP or GIF bytes, applying EXIF orientation.
#[wasm_bindgen]
pub fn decode_image(bytes: &[u8]) -> Result<JsRasterBuffer, JsValue> {
    decode::decode_image(bytes)
        .map(JsRasterBuffer::from_raster)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Encode `image` as `format` (`"jpg"`, `"jpeg"` or `"png"`). `quality`
/// only applies to JPEG.
#[wasm_bindgen]
pub fn encode_image(image: &JsRasterBuffer, format: &str, quality: u8) -> Result<Vec<u8>, JsValue> {
    encode_as(image, format, quality).map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Shrink `image` to fit a `max_width` x `max_height` viewport, the way the
/// session displays it.
#[wasm_bindgen]
pub fn fit_to_viewport(
    image: &JsRasterBuffer,
    max_width: u32,
    max_height: u32,
) -> Result<JsRasterBuffer, JsValue> {
    let raster = image.as_raster();
    let view = ViewState::fit(raster.width(), raster.height(), max_width, max_height);
    pixedit_core::render_frame(raster, &view)
        .map(JsRasterBuffer::from_raster)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn encode_as(image: &JsRasterBuffer, format: &str, quality: u8) -> Result<Vec<u8>, encode::EncodeError> {
    let format = SaveFormat::from_extension(format)?;
    encode::encode_image(image.as_raster(), format, quality)
}
