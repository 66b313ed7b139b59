//! Image decoding: the load collaborator.
//!
//! This module turns file bytes into a [`RasterBuffer`](crate::raster::RasterBuffer):
//! - Format sniffing and decoding through the `image` crate
//! - EXIF orientation correction so the buffer is upright
//! - Conversion of grayscale and 16-bit inputs to 8-bit RGB/RGBA
//!
//! The session only cares whether decoding succeeded; a failure leaves the
//! session untouched.
//!
//! # Examples
//!
//! ```ignore
//! use pixedit_core::decode::decode_file;
//!
//! let image = decode_file(Path::new("photo.jpg"))?;
//! println!("Decoded {}x{} image", image.width(), image.height());
//! ```

mod reader;
mod types;

pub use reader::{decode_file, decode_image};
pub use types::{DecodeError, Orientation};
