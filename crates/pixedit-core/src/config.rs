//! Session configuration.

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Viewport {width}x{height} must be non-zero")]
    EmptyViewport { width: u32, height: u32 },

    #[error("Resize range {min}%..={max}% must be non-empty and start above zero")]
    InvalidResizeRange { min: u32, max: u32 },

    #[error("Brightness range {min}..={max} must be non-empty and non-negative")]
    InvalidBrightnessRange { min: f32, max: f32 },

    #[error("History limit must keep at least one entry")]
    ZeroHistoryLimit,
}

/// Tunables for an editing session.
///
/// Deserializes from partial input: missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Display surface width in pixels (default 800)
    pub viewport_width: u32,
    /// Display surface height in pixels (default 500)
    pub viewport_height: u32,
    /// Smallest resize percentage the control offers (default 10)
    pub resize_min_percent: u32,
    /// Largest resize percentage the control offers (default 200)
    pub resize_max_percent: u32,
    /// Lowest brightness factor the control offers (default 0.5)
    pub brightness_min: f32,
    /// Highest brightness factor the control offers (default 2.0)
    pub brightness_max: f32,
    /// JPEG quality used when saving (default 90)
    pub save_quality: u8,
    /// Maximum number of history entries kept; `None` keeps everything
    pub history_limit: Option<usize>,
    /// Center the image in the viewport instead of anchoring it top-left
    pub center_view: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            viewport_width: 800,
            viewport_height: 500,
            resize_min_percent: 10,
            resize_max_percent: 200,
            brightness_min: 0.5,
            brightness_max: 2.0,
            save_quality: 90,
            history_limit: None,
            center_view: false,
        }
    }
}

impl SessionConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check that every range is usable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.viewport_width == 0 || self.viewport_height == 0 {
            return Err(ConfigError::EmptyViewport {
                width: self.viewport_width,
                height: self.viewport_height,
            });
        }
        if self.resize_min_percent == 0 || self.resize_min_percent > self.resize_max_percent {
            return Err(ConfigError::InvalidResizeRange {
                min: self.resize_min_percent,
                max: self.resize_max_percent,
            });
        }
        let brightness_ok = self.brightness_min.is_finite()
            && self.brightness_max.is_finite()
            && self.brightness_min >= 0.0
            && self.brightness_min <= self.brightness_max;
        if !brightness_ok {
            return Err(ConfigError::InvalidBrightnessRange {
                min: self.brightness_min,
                max: self.brightness_max,
            });
        }
        if self.history_limit == Some(0) {
            return Err(ConfigError::ZeroHistoryLimit);
        }
        Ok(())
    }
}
