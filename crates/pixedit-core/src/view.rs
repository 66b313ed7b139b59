//! Mapping between display (pointer) coordinates and source pixels.
//!
//! The display shows the current buffer scaled by `scale` and shifted by
//! `(offset_x, offset_y)`:
//!
//! ```text
//! display = source * scale + offset
//! source  = round((display - offset) / scale), clamped to the image
//! ```
//!
//! A [`ViewState`] is tied to the dimensions of the buffer it was computed
//! for. The session recomputes it whenever those dimensions change; mapping
//! a gesture through a stale view corrupts the selected region.

use crate::raster::RasterBuffer;
use crate::region::Region;
use crate::transform::{resize_exact, TransformError};
use image::imageops::FilterType;
use serde::Serialize;

/// Projection of a buffer onto the display surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ViewState {
    scale: f64,
    offset_x: i32,
    offset_y: i32,
    image_width: u32,
    image_height: u32,
}

/// An axis-aligned rectangle in display coordinates, for overlays.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct DisplayRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl ViewState {
    /// Create a view. Returns `None` unless `scale` is finite and positive
    /// and the image has non-zero dimensions.
    pub fn new(
        scale: f64,
        offset_x: i32,
        offset_y: i32,
        image_width: u32,
        image_height: u32,
    ) -> Option<Self> {
        let valid = scale.is_finite() && scale > 0.0 && image_width > 0 && image_height > 0;
        valid.then_some(Self {
            scale,
            offset_x,
            offset_y,
            image_width,
            image_height,
        })
    }

    /// 1:1 view anchored at the origin.
    pub fn identity(image_width: u32, image_height: u32) -> Self {
        Self {
            scale: 1.0,
            offset_x: 0,
            offset_y: 0,
            image_width: image_width.max(1),
            image_height: image_height.max(1),
        }
    }

    /// Shrink-to-fit view anchored top-left. Images smaller than the
    /// viewport stay at 1:1; larger ones are scaled down, never up.
    pub fn fit(image_width: u32, image_height: u32, viewport_width: u32, viewport_height: u32) -> Self {
        let mut view = Self::identity(image_width, image_height);
        view.scale = fit_scale(
            view.image_width,
            view.image_height,
            viewport_width.max(1),
            viewport_height.max(1),
        );
        view
    }

    /// Same scale as [`ViewState::fit`], with the image centered in the viewport.
    pub fn centered(
        image_width: u32,
        image_height: u32,
        viewport_width: u32,
        viewport_height: u32,
    ) -> Self {
        let mut view = Self::fit(image_width, image_height, viewport_width, viewport_height);
        let (shown_w, shown_h) = view.displayed_size();
        view.offset_x = ((viewport_width as f64 - shown_w as f64) / 2.0).round() as i32;
        view.offset_y = ((viewport_height as f64 - shown_h as f64) / 2.0).round() as i32;
        view
    }

    #[inline]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[inline]
    pub fn offset(&self) -> (i32, i32) {
        (self.offset_x, self.offset_y)
    }

    /// Dimensions of the buffer this view was computed for.
    #[inline]
    pub fn image_size(&self) -> (u32, u32) {
        (self.image_width, self.image_height)
    }

    /// True when this view was computed for a buffer of these dimensions.
    pub fn matches(&self, image: &RasterBuffer) -> bool {
        self.image_size() == image.dimensions()
    }

    /// Size of the image on screen, in display pixels.
    pub fn displayed_size(&self) -> (u32, u32) {
        let w = (self.image_width as f64 * self.scale).round() as u32;
        let h = (self.image_height as f64 * self.scale).round() as u32;
        (w.max(1), h.max(1))
    }

    /// Map a display point to the source pixel under it, clamped to the image.
    pub fn to_source(&self, px: f64, py: f64) -> (u32, u32) {
        let sx = ((px - self.offset_x as f64) / self.scale).round();
        let sy = ((py - self.offset_y as f64) / self.scale).round();
        (
            clamp_axis(sx, self.image_width),
            clamp_axis(sy, self.image_height),
        )
    }

    /// Map a display point to the nearest pixel boundary, clamped to
    /// `[0, w] x [0, h]`. Selection corners use this so a drag past the
    /// right or bottom edge keeps the last column and row.
    pub fn to_source_edge(&self, px: f64, py: f64) -> (u32, u32) {
        let sx = ((px - self.offset_x as f64) / self.scale).round();
        let sy = ((py - self.offset_y as f64) / self.scale).round();
        (
            clamp_edge(sx, self.image_width),
            clamp_edge(sy, self.image_height),
        )
    }

    /// Map a source pixel to display coordinates. Only for drawing overlays.
    pub fn to_display(&self, sx: f64, sy: f64) -> (f64, f64) {
        (
            sx * self.scale + self.offset_x as f64,
            sy * self.scale + self.offset_y as f64,
        )
    }

    /// Display rectangle covering a source region.
    pub fn display_rect(&self, region: &Region) -> DisplayRect {
        let (x1, y1) = self.to_display(region.x1() as f64, region.y1() as f64);
        let (x2, y2) = self.to_display(region.x2() as f64, region.y2() as f64);
        DisplayRect {
            x: x1,
            y: y1,
            width: x2 - x1,
            height: y2 - y1,
        }
    }
}

fn fit_scale(width: u32, height: u32, viewport_width: u32, viewport_height: u32) -> f64 {
    let ratio = (viewport_width as f64 / width as f64).min(viewport_height as f64 / height as f64);
    ratio.min(1.0)
}

fn clamp_axis(value: f64, extent: u32) -> u32 {
    // NaN saturates to 0 in the cast
    value.clamp(0.0, (extent - 1) as f64) as u32
}

fn clamp_edge(value: f64, extent: u32) -> u32 {
    value.clamp(0.0, extent as f64) as u32
}

/// Produce the display-sized buffer for `view`, for renderers that blit
/// pixels directly. Buffers shown at 1:1 are returned unchanged.
///
/// # Errors
///
/// Returns `TransformError::InvalidParameter` if `view` was computed for a
/// buffer of different dimensions.
pub fn render_frame(image: &RasterBuffer, view: &ViewState) -> Result<RasterBuffer, TransformError> {
    if !view.matches(image) {
        return Err(TransformError::InvalidParameter(format!(
            "view computed for {}x{} but image is {}x{}",
            view.image_width,
            view.image_height,
            image.width(),
            image.height()
        )));
    }

    let (width, height) = view.displayed_size();
    resize_exact(image, width, height, FilterType::Lanczos3)
}


// ============================================================================
// Property-Based Tests
// ============================================================================
