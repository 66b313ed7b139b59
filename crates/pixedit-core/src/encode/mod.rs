//! Image encoding: the save collaborator.
//!
//! This module provides functionality for:
//! - Encoding buffers to JPEG with configurable quality
//! - Encoding buffers to lossless PNG
//! - Choosing the format from a target path and writing the file
//!
//! Failures are reported to the caller and never retried. Saving never
//! changes session state.
//!
//! # Examples
//!
//! ```ignore
//! use pixedit_core::encode::{encode_image, SaveFormat};
//!
//! let bytes = encode_image(&buffer, SaveFormat::Png, 90)?;
//! ```

mod jpeg;
mod png;

pub use jpeg::encode_jpeg;
pub use png::encode_png;

use crate::raster::RasterBuffer;
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while encoding or writing an image.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    /// The target extension names a format we cannot write.
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),

    /// The encoder rejected the data.
    #[error("Encoding failed: {0}")]
    EncodingFailed(String),

    /// Writing the encoded bytes failed.
    #[error("I/O error: {0}")]
    IoError(String),
}

/// Output formats offered when saving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SaveFormat {
    #[default]
    Jpeg,
    Png,
}

impl SaveFormat {
    /// Pick the format from the path extension. A path without an
    /// extension defaults to JPEG.
    pub fn from_path(path: &Path) -> Result<Self, EncodeError> {
        match path.extension() {
            None => Ok(SaveFormat::Jpeg),
            Some(ext) => Self::from_extension(&ext.to_string_lossy()),
        }
    }

    /// Parse an extension or format name such as `"jpg"`, `"JPEG"` or `"png"`.
    pub fn from_extension(ext: &str) -> Result<Self, EncodeError> {
        match ext.to_ascii_lowercase().as_str() {
            "jpg" | "jpeg" => Ok(SaveFormat::Jpeg),
            "png" => Ok(SaveFormat::Png),
            other => Err(EncodeError::UnsupportedFormat(other.to_string())),
        }
    }
}

/// Encode `image` in `format`. `quality` only applies to JPEG.
pub fn encode_image(
    image: &RasterBuffer,
    format: SaveFormat,
    quality: u8,
) -> Result<Vec<u8>, EncodeError> {
    match format {
        SaveFormat::Jpeg => encode_jpeg(image, quality),
        SaveFormat::Png => encode_png(image),
    }
}

/// Encode `image` in the format implied by `path` and write it there.
///
/// Returns the format that was written.
pub fn save_image(image: &RasterBuffer, path: &Path, quality: u8) -> Result<SaveFormat, EncodeError> {
    let format = SaveFormat::from_path(path)?;
    let bytes = encode_image(image, format, quality)?;
    std::fs::write(path, bytes).map_err(|e| EncodeError::IoError(e.to_string()))?;
    log::debug!("Saved {}x{} image to {}", image.width(), image.height(), path.display());
    Ok(format)
}
