//! Pure image transforms: crop, mask, resize, rotate, flip, brightness and
//! quality degradation.
//!
//! Every transform borrows its source and returns a new [`RasterBuffer`];
//! nothing is modified in place. All transforms are deterministic, so
//! applying the same transform to equal buffers yields equal buffers.
//!
//! # Coordinate System
//!
//! - Regions are in source pixel coordinates, half-open on the right/bottom
//! - Origin is top-left corner
//! - Rotation is always a quarter turn clockwise

mod adjust;
mod crop;
mod quality;
mod resize;
mod rotation;

pub use adjust::adjust_brightness;
pub use crop::{crop, mask_region};
pub use quality::degrade_quality;
pub use resize::{check_scale, resize_percent, scaled_dimensions};
pub(crate) use resize::resize_exact;
pub use rotation::{flip_horizontal, rotate_clockwise};

use crate::raster::{RasterBuffer, RasterError};
use crate::region::Region;
use thiserror::Error;

/// Errors produced by transforms.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransformError {
    /// The selected region does not overlap the image.
    #[error("Region {region:?} has no area inside the {width}x{height} image")]
    InvalidRegion {
        region: Region,
        width: u32,
        height: u32,
    },

    /// Resize percentage outside the configured range.
    #[error("Scale {percent}% is outside the allowed range {min}%..={max}%")]
    ScaleOutOfRange { percent: u32, min: u32, max: u32 },

    /// A parameter is outside its domain.
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// The lossy round trip failed.
    #[error("Codec failure: {0}")]
    Codec(String),

    #[error(transparent)]
    Raster(#[from] RasterError),
}

/// A transform described as a value, so it can be queued or sent to a
/// worker before being applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Transform {
    Crop(Region),
    MaskRegion(Region),
    /// Scale both axes by a percentage.
    Resize(u32),
    RotateClockwise,
    FlipHorizontal,
    /// Multiply color samples by a factor.
    Brightness(f32),
    /// Lossy JPEG round trip at `quality = 100 - level`.
    DegradeQuality(u8),
}

impl Transform {
    /// Apply the transform to `image`.
    pub fn apply(&self, image: &RasterBuffer) -> Result<RasterBuffer, TransformError> {
        match *self {
            Transform::Crop(region) => crop(image, region),
            Transform::MaskRegion(region) => mask_region(image, region),
            Transform::Resize(percent) => resize_percent(image, percent),
            Transform::RotateClockwise => Ok(rotate_clockwise(image)),
            Transform::FlipHorizontal => Ok(flip_horizontal(image)),
            Transform::Brightness(factor) => adjust_brightness(image, factor),
            Transform::DegradeQuality(level) => degrade_quality(image, level),
        }
    }

    /// Short name used in log output.
    pub fn name(&self) -> &'static str {
        match self {
            Transform::Crop(_) => "crop",
            Transform::MaskRegion(_) => "mask",
            Transform::Resize(_) => "resize",
            Transform::RotateClockwise => "rotate",
            Transform::FlipHorizontal => "flip",
            Transform::Brightness(_) => "brightness",
            Transform::DegradeQuality(_) => "quality",
        }
    }
}
