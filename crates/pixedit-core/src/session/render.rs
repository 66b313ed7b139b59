//! The rendering seam between the session and whatever draws it.

use serde::Serialize;

use crate::raster::RasterBuffer;
use crate::region::Region;
use crate::view::{DisplayRect, ViewState};

/// Receives everything the session wants shown.
///
/// Implementations decide how to draw; [`crate::view::render_frame`] turns a
/// `(image, view)` pair into a display-sized buffer for surfaces that blit
/// pixels.
pub trait Renderer {
    /// Show `image` projected through `view`. Called after every change to
    /// the committed buffer, preview or view.
    fn render(&mut self, image: &RasterBuffer, view: &ViewState);

    /// Draw the live selection rectangle.
    fn overlay(&mut self, rect: DisplayRect);

    /// Remove the selection rectangle.
    fn clear_overlay(&mut self);

    /// Report a non-fatal condition to the user.
    fn notice(&mut self, notice: Notice);
}

/// Non-fatal conditions surfaced to the user.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Notice {
    /// A drag selected no pixels, so nothing was cropped.
    InvalidSelection { region: Region },
    /// A worker result arrived after the image changed and was dropped.
    JobDiscarded { transform: &'static str },
}
