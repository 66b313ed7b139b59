//! The editing session state machine.
//!
//! [`EditorSession`] owns the committed history, the view, the active tool
//! and any in-progress interaction:
//! - a region gesture (press, drag, release) with the crop or mask tool
//! - a live preview from a continuous control (resize, brightness, quality)
//!
//! In-progress data is never committed implicitly. Any operation other than
//! the one driving it discards it first. Every failing operation leaves the
//! session as it was: results are computed before any state changes.
//!
//! # Examples
//!
//! ```ignore
//! use pixedit_core::session::{EditorSession, Tool};
//!
//! let mut session = EditorSession::new(SessionConfig::default(), renderer)?;
//! session.load_path(Path::new("photo.jpg"))?;
//! session.select_tool(Tool::Crop);
//! session.pointer_press(10.0, 10.0);
//! session.pointer_drag(40.0, 30.0);
//! session.pointer_release(60.0, 40.0)?;
//! session.undo()?;
//! ```

mod job;
mod render;

pub use job::{Job, JobOutcome, JobOutput};
pub use render::{Notice, Renderer};

use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::{ConfigError, SessionConfig};
use crate::decode::{decode_file, decode_image, DecodeError};
use crate::encode::{encode_image, save_image, EncodeError, SaveFormat};
use crate::history::{History, HistoryError};
use crate::keymap::Action;
use crate::raster::RasterBuffer;
use crate::region::Region;
use crate::transform::{check_scale, Transform, TransformError};
use crate::view::ViewState;

/// Errors returned by session operations.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum SessionError {
    #[error("No image loaded")]
    NoImage,

    #[error("No preview to commit")]
    NoPreview,

    #[error("Unknown tool: {0:?}")]
    UnknownTool(String),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error(transparent)]
    Encode(#[from] EncodeError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    History(#[from] HistoryError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// What pointer gestures do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Gestures are ignored
    #[default]
    Pointer,
    /// Drag selects a region to keep
    Crop,
    /// Drag selects a region to keep; everything else is cleared
    Mask,
}

impl Tool {
    /// True for tools that select a region by dragging.
    pub fn selects_region(self) -> bool {
        matches!(self, Tool::Crop | Tool::Mask)
    }

    pub fn name(self) -> &'static str {
        match self {
            Tool::Pointer => "pointer",
            Tool::Crop => "crop",
            Tool::Mask => "mask",
        }
    }

    fn region_transform(self, region: Region) -> Option<Transform> {
        match self {
            Tool::Pointer => None,
            Tool::Crop => Some(Transform::Crop(region)),
            Tool::Mask => Some(Transform::MaskRegion(region)),
        }
    }
}

impl FromStr for Tool {
    type Err = SessionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pointer" => Ok(Tool::Pointer),
            "crop" => Ok(Tool::Crop),
            "mask" => Ok(Tool::Mask),
            _ => Err(SessionError::UnknownTool(s.to_string())),
        }
    }
}

/// A continuous control value, previewed until committed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Adjustment {
    /// Scale percentage
    Resize(u32),
    /// Brightness factor
    Brightness(f32),
    /// Quality degradation level, 0-100
    Quality(u8),
}

impl Adjustment {
    pub fn transform(self) -> Transform {
        match self {
            Adjustment::Resize(percent) => Transform::Resize(percent),
            Adjustment::Brightness(factor) => Transform::Brightness(factor),
            Adjustment::Quality(level) => Transform::DegradeQuality(level),
        }
    }
}

/// A region drag in progress, in source coordinates.
#[derive(Debug, Clone, Copy)]
struct Gesture {
    start: (u32, u32),
    end: (u32, u32),
}

impl Gesture {
    fn region(&self) -> Region {
        Region::from_points(
            (self.start.0 as i64, self.start.1 as i64),
            (self.end.0 as i64, self.end.1 as i64),
        )
    }
}

#[derive(Debug, Clone)]
struct Preview {
    adjustment: Adjustment,
    image: RasterBuffer,
    view: ViewState,
}

/// An interactive editing session rendering through `R`.
pub struct EditorSession<R: Renderer> {
    config: SessionConfig,
    history: History,
    /// View of the committed buffer; `None` until the first load
    view: Option<ViewState>,
    tool: Tool,
    gesture: Option<Gesture>,
    preview: Option<Preview>,
    /// Bumped whenever the committed buffer changes
    generation: u64,
    renderer: R,
}

impl<R: Renderer> EditorSession<R> {
    /// Create an empty session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Config` if `config` fails validation.
    pub fn new(config: SessionConfig, renderer: R) -> Result<Self, SessionError> {
        config.validate()?;
        Ok(Self {
            history: History::with_limit(config.history_limit),
            config,
            view: None,
            tool: Tool::default(),
            gesture: None,
            preview: None,
            generation: 0,
            renderer,
        })
    }

    // ------------------------------------------------------------------
    // Load and save
    // ------------------------------------------------------------------

    /// Decode `bytes` and make the result the only history entry.
    ///
    /// A decode failure leaves the session untouched.
    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<(), SessionError> {
        let image = decode_image(bytes)?;
        self.load_buffer(image);
        Ok(())
    }

    /// Read and decode the file at `path`, then load it.
    pub fn load_path(&mut self, path: &Path) -> Result<(), SessionError> {
        let image = decode_file(path)?;
        self.load_buffer(image);
        Ok(())
    }

    /// Load an already decoded buffer, discarding all history.
    pub fn load_buffer(&mut self, image: RasterBuffer) {
        log::debug!("session: load {}x{} image", image.width(), image.height());
        self.abandon_in_progress();
        self.history.load(image);
        self.after_commit();
    }

    /// Write the committed buffer to `path`, choosing the format from the
    /// extension. Previews are not saved.
    pub fn save_to_path(&self, path: &Path) -> Result<SaveFormat, SessionError> {
        let image = self.committed()?;
        Ok(save_image(image, path, self.config.save_quality)?)
    }

    /// Encode the committed buffer in `format`.
    pub fn export(&self, format: SaveFormat) -> Result<Vec<u8>, SessionError> {
        let image = self.committed()?;
        Ok(encode_image(image, format, self.config.save_quality)?)
    }

    // ------------------------------------------------------------------
    // History
    // ------------------------------------------------------------------

    pub fn undo(&mut self) -> Result<(), SessionError> {
        if !self.history.can_undo() {
            return Err(HistoryError::NothingToUndo.into());
        }
        self.abandon_in_progress();
        self.history.undo()?;
        self.after_commit();
        Ok(())
    }

    pub fn redo(&mut self) -> Result<(), SessionError> {
        if !self.history.can_redo() {
            return Err(HistoryError::NothingToRedo.into());
        }
        self.abandon_in_progress();
        self.history.redo()?;
        self.after_commit();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Discrete transforms
    // ------------------------------------------------------------------

    pub fn rotate(&mut self) -> Result<(), SessionError> {
        self.apply(Transform::RotateClockwise)
    }

    pub fn flip(&mut self) -> Result<(), SessionError> {
        self.apply(Transform::FlipHorizontal)
    }

    /// Apply `transform` to the committed buffer and commit the result.
    ///
    /// Resize percentages are checked against the configured range. The
    /// brightness range only bounds the preview slider, so any factor
    /// `>= 0` commits here.
    pub fn apply(&mut self, transform: Transform) -> Result<(), SessionError> {
        self.check_transform(transform)?;
        let image = transform.apply(self.committed()?)?;
        self.commit(image, transform.name())
    }

    // ------------------------------------------------------------------
    // Tools and gestures
    // ------------------------------------------------------------------

    /// Switch tools, discarding any in-progress gesture or preview.
    pub fn select_tool(&mut self, tool: Tool) {
        if self.abandon_in_progress() {
            self.render();
        }
        log::debug!("session: tool {:?} -> {:?}", self.tool, tool);
        self.tool = tool;
    }

    /// Start a region selection at display point `(px, py)`.
    ///
    /// Ignored unless a region tool is active and an image is loaded.
    pub fn pointer_press(&mut self, px: f64, py: f64) {
        if !self.tool.selects_region() {
            return;
        }
        if self.abandon_in_progress() {
            self.render();
        }
        let Some(view) = self.view else {
            return;
        };
        let start = view.to_source_edge(px, py);
        self.gesture = Some(Gesture { start, end: start });
    }

    /// Move the selection end and redraw the overlay. Never touches the buffer.
    pub fn pointer_drag(&mut self, px: f64, py: f64) {
        let (Some(gesture), Some(view)) = (self.gesture.as_mut(), self.view) else {
            return;
        };
        gesture.end = view.to_source_edge(px, py);
        let rect = view.display_rect(&gesture.region());
        self.renderer.overlay(rect);
    }

    /// Finish the selection and apply the active tool to it.
    ///
    /// Returns the committed region, or `None` when no gesture was in
    /// progress. A selection with no area is discarded with a
    /// [`Notice::InvalidSelection`] and returned as
    /// `TransformError::InvalidRegion`; history is not touched.
    pub fn pointer_release(&mut self, px: f64, py: f64) -> Result<Option<Region>, SessionError> {
        let Some(mut gesture) = self.gesture.take() else {
            return Ok(None);
        };
        self.renderer.clear_overlay();

        let Some(view) = self.view else {
            return Ok(None);
        };
        gesture.end = view.to_source_edge(px, py);
        let region = gesture.region();
        let Some(transform) = self.tool.region_transform(region) else {
            return Ok(None);
        };

        match transform.apply(self.committed()?) {
            Ok(image) => {
                self.commit(image, transform.name())?;
                Ok(Some(region))
            }
            Err(err @ TransformError::InvalidRegion { .. }) => {
                log::warn!("session: discarding empty selection {:?}", region);
                self.renderer.notice(Notice::InvalidSelection { region });
                Err(err.into())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// The region currently being dragged, in source coordinates.
    pub fn selection(&self) -> Option<Region> {
        self.gesture.map(|g| g.region())
    }

    // ------------------------------------------------------------------
    // Previews
    // ------------------------------------------------------------------

    /// Show `adjustment` applied to the committed buffer without committing.
    ///
    /// Each call starts from the committed buffer, so previews never stack.
    /// Values must lie inside the configured slider ranges.
    pub fn preview(&mut self, adjustment: Adjustment) -> Result<(), SessionError> {
        let transform = adjustment.transform();
        self.check_slider(transform)?;
        let image = transform.apply(self.committed()?)?;
        let view = self.view_for(image.dimensions());
        log::trace!(
            "session: preview {:?} -> {}x{}",
            adjustment,
            image.width(),
            image.height()
        );

        self.discard_gesture();
        self.preview = Some(Preview {
            adjustment,
            image,
            view,
        });
        self.render();
        Ok(())
    }

    /// Commit the current preview as a new history entry.
    pub fn commit_preview(&mut self) -> Result<(), SessionError> {
        let preview = self.preview.take().ok_or(SessionError::NoPreview)?;
        let name = preview.adjustment.transform().name();
        self.commit(preview.image, name)
    }

    /// Drop the preview and show the committed buffer again. Returns whether
    /// a preview was active.
    pub fn cancel_preview(&mut self) -> bool {
        if self.preview.take().is_some() {
            log::trace!("session: preview cancelled");
            self.render();
            true
        } else {
            false
        }
    }

    // ------------------------------------------------------------------
    // View
    // ------------------------------------------------------------------

    /// Center the image in the viewport from now on.
    pub fn center_view(&mut self) {
        self.abandon_in_progress();
        self.config.center_view = true;
        self.refresh_view();
        self.render();
    }

    /// Resize the display surface and refit the view.
    pub fn set_viewport(&mut self, width: u32, height: u32) -> Result<(), SessionError> {
        if width == 0 || height == 0 {
            return Err(ConfigError::EmptyViewport { width, height }.into());
        }
        self.abandon_in_progress();
        self.config.viewport_width = width;
        self.config.viewport_height = height;
        self.refresh_view();
        self.render();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Worker jobs
    // ------------------------------------------------------------------

    /// Capture `transform` against the committed buffer for running elsewhere.
    pub fn begin_job(&self, transform: Transform) -> Result<Job, SessionError> {
        self.check_transform(transform)?;
        let source = self.committed()?.clone();
        Ok(Job::new(self.generation, source, transform))
    }

    /// Commit a finished job, unless the committed buffer changed since it began.
    pub fn finish_job(&mut self, output: JobOutput) -> Result<JobOutcome, SessionError> {
        let transform = output.transform();
        if output.generation() != self.generation {
            log::warn!(
                "session: discarding stale {} result (generation {} != {})",
                transform.name(),
                output.generation(),
                self.generation
            );
            self.renderer.notice(Notice::JobDiscarded {
                transform: transform.name(),
            });
            return Ok(JobOutcome::Discarded);
        }

        let image = output.into_result()?;
        self.commit(image, transform.name())?;
        Ok(JobOutcome::Committed)
    }

    // ------------------------------------------------------------------
    // Shortcuts
    // ------------------------------------------------------------------

    /// Perform `action`. Returns `false` for actions that need the control
    /// surface (opening and saving files).
    pub fn perform(&mut self, action: Action) -> Result<bool, SessionError> {
        match action {
            Action::Open | Action::Save => return Ok(false),
            Action::Undo => self.undo()?,
            Action::Redo => self.redo()?,
            Action::Rotate => self.rotate()?,
            Action::Flip => self.flip()?,
            Action::CropTool => self.select_tool(Tool::Crop),
            Action::MaskTool => self.select_tool(Tool::Mask),
        }
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// The committed buffer.
    pub fn current(&self) -> Option<&RasterBuffer> {
        self.history.current()
    }

    /// The buffer on screen: the preview if one is active, else the committed buffer.
    pub fn displayed(&self) -> Option<&RasterBuffer> {
        match &self.preview {
            Some(preview) => Some(&preview.image),
            None => self.history.current(),
        }
    }

    /// View of the committed buffer. Pointer coordinates map through this.
    pub fn view(&self) -> Option<ViewState> {
        self.view
    }

    /// View of the displayed buffer.
    pub fn displayed_view(&self) -> Option<ViewState> {
        match &self.preview {
            Some(preview) => Some(preview.view),
            None => self.view,
        }
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn preview_adjustment(&self) -> Option<Adjustment> {
        self.preview.as_ref().map(|p| p.adjustment)
    }

    pub fn has_preview(&self) -> bool {
        self.preview.is_some()
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn history_len(&self) -> usize {
        self.history.len()
    }

    pub fn history_cursor(&self) -> usize {
        self.history.cursor()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    // ------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------

    fn committed(&self) -> Result<&RasterBuffer, SessionError> {
        self.history.current().ok_or(SessionError::NoImage)
    }

    fn check_transform(&self, transform: Transform) -> Result<(), TransformError> {
        let config = &self.config;
        match transform {
            Transform::Resize(percent) => {
                check_scale(percent, config.resize_min_percent, config.resize_max_percent)
            }
            _ => Ok(()),
        }
    }

    fn check_slider(&self, transform: Transform) -> Result<(), TransformError> {
        self.check_transform(transform)?;
        let config = &self.config;
        match transform {
            Transform::Brightness(factor)
                if !(config.brightness_min..=config.brightness_max).contains(&factor) =>
            {
                Err(TransformError::InvalidParameter(format!(
                    "brightness {factor} is outside {}..={}",
                    config.brightness_min, config.brightness_max
                )))
            }
            _ => Ok(()),
        }
    }

    /// Push `image` as the new committed buffer.
    fn commit(&mut self, image: RasterBuffer, name: &str) -> Result<(), SessionError> {
        let (width, height) = image.dimensions();
        self.history.commit(image)?;
        log::debug!("session: committed {} ({}x{})", name, width, height);
        self.abandon_in_progress();
        self.after_commit();
        Ok(())
    }

    fn after_commit(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.refresh_view();
        self.render();
    }

    fn view_for(&self, (width, height): (u32, u32)) -> ViewState {
        let (vw, vh) = (self.config.viewport_width, self.config.viewport_height);
        if self.config.center_view {
            ViewState::centered(width, height, vw, vh)
        } else {
            ViewState::fit(width, height, vw, vh)
        }
    }

    fn refresh_view(&mut self) {
        self.view = self.history.current().map(|img| self.view_for(img.dimensions()));
    }

    fn render(&mut self) {
        if let Some(preview) = &self.preview {
            self.renderer.render(&preview.image, &preview.view);
        } else if let (Some(image), Some(view)) = (self.history.current(), self.view.as_ref()) {
            self.renderer.render(image, view);
        }
    }

    fn discard_gesture(&mut self) {
        if self.gesture.take().is_some() {
            self.renderer.clear_overlay();
        }
    }

    /// Drop any gesture or preview. Returns whether a preview was dropped,
    /// in which case the caller must re-render.
    fn abandon_in_progress(&mut self) -> bool {
        self.discard_gesture();
        let dropped = self.preview.take().is_some();
        if dropped {
            log::trace!("session: preview abandoned");
        }
        dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encode::encode_png;
    use crate::raster::{test_image, Channels};
    use crate::transform::{adjust_brightness, crop, mask_region, resize_percent};
    use crate::view::DisplayRect;

    #[derive(Default)]
    struct RecordingRenderer {
        frames: Vec<((u32, u32), ViewState)>,
        overlays: Vec<DisplayRect>,
        clears: usize,
        notices: Vec<Notice>,
    }

    impl Renderer for RecordingRenderer {
        fn render(&mut self, image: &RasterBuffer, view: &ViewState) {
            self.frames.push((image.dimensions(), *view));
        }

        fn overlay(&mut self, rect: DisplayRect) {
            self.overlays.push(rect);
        }

        fn clear_overlay(&mut self) {
            self.clears += 1;
        }

        fn notice(&mut self, notice: Notice) {
            self.notices.push(notice);
        }
    }

    fn session_with(config: SessionConfig, image: RasterBuffer) -> EditorSession<RecordingRenderer> {
        let mut session = EditorSession::new(config, RecordingRenderer::default()).unwrap();
        session.load_buffer(image);
        session
    }

    fn session(width: u32, height: u32) -> EditorSession<RecordingRenderer> {
        session_with(SessionConfig::default(), test_image(width, height, Channels::Rgb))
    }

    fn last_frame(session: &EditorSession<RecordingRenderer>) -> (u32, u32) {
        session.renderer().frames.last().unwrap().0
    }

    #[test]
    fn test_new_rejects_invalid_config() {
        let mut config = SessionConfig::default();
        config.viewport_width = 0;
        assert!(matches!(
            EditorSession::new(config, RecordingRenderer::default()),
            Err(SessionError::Config(ConfigError::EmptyViewport { .. }))
        ));
    }

    #[test]
    fn test_operations_before_load() {
        let mut session = EditorSession::new(SessionConfig::default(), RecordingRenderer::default()).unwrap();
        assert_eq!(session.rotate(), Err(SessionError::NoImage));
        assert_eq!(session.export(SaveFormat::Png), Err(SessionError::NoImage));
        assert_eq!(
            session.undo(),
            Err(SessionError::History(HistoryError::NothingToUndo))
        );
        assert!(session.begin_job(Transform::FlipHorizontal).is_err());
        assert!(session.view().is_none());

        session.select_tool(Tool::Crop);
        session.pointer_press(1.0, 1.0);
        assert_eq!(session.pointer_release(5.0, 5.0), Ok(None));
        assert!(session.renderer().frames.is_empty());
    }

    #[test]
    fn test_load_renders_and_fits() {
        let session = session(1600, 1000);
        assert_eq!(session.history_len(), 1);
        assert!(!session.can_undo());

        let view = session.view().unwrap();
        assert_eq!(view.scale(), 0.5);
        assert_eq!(session.renderer().frames.len(), 1);
    }

    #[test]
    fn test_crop_through_scaled_view() {
        // 100x100 shown at half size in a 50x50 viewport
        let mut config = SessionConfig::default();
        config.viewport_width = 50;
        config.viewport_height = 50;
        let image = test_image(100, 100, Channels::Rgb);
        let mut session = session_with(config, image.clone());
        assert_eq!(session.view().unwrap().scale(), 0.5);

        session.select_tool(Tool::Crop);
        session.pointer_press(5.0, 5.0);
        session.pointer_drag(20.0, 12.0);
        assert_eq!(session.selection(), Some(Region::new(10, 10, 40, 24)));
        let region = session.pointer_release(30.0, 20.0).unwrap();

        assert_eq!(region, Some(Region::new(10, 10, 60, 40)));
        let current = session.current().unwrap();
        assert_eq!(current.dimensions(), (50, 30));
        assert_eq!(current, &crop(&image, Region::new(10, 10, 60, 40)).unwrap());
        assert_eq!(session.history_len(), 2);

        let renderer = session.renderer();
        assert_eq!(
            renderer.overlays,
            vec![DisplayRect {
                x: 5.0,
                y: 5.0,
                width: 15.0,
                height: 7.0
            }]
        );
        assert_eq!(renderer.clears, 1);

        // The view follows the new dimensions
        let view = session.view().unwrap();
        assert_eq!(view.image_size(), (50, 30));
        assert_eq!(view.scale(), 1.0);
        assert_eq!(last_frame(&session), (50, 30));
    }

    #[test]
    fn test_reversed_drag_normalizes() {
        let mut session = session(100, 100);
        session.select_tool(Tool::Crop);
        session.pointer_press(60.0, 40.0);
        let region = session.pointer_release(10.0, 10.0).unwrap();
        assert_eq!(region, Some(Region::new(10, 10, 60, 40)));
        assert_eq!(session.current().unwrap().dimensions(), (50, 30));
    }

    #[test]
    fn test_drag_past_corner_keeps_last_row_and_column() {
        let image = test_image(100, 100, Channels::Rgb);
        let mut session = session_with(SessionConfig::default(), image.clone());
        session.select_tool(Tool::Crop);
        session.pointer_press(10.0, 0.0);
        let region = session.pointer_release(500.0, 500.0).unwrap();

        assert_eq!(region, Some(Region::new(10, 0, 100, 100)));
        let current = session.current().unwrap();
        assert_eq!(current.dimensions(), (90, 100));
        assert_eq!(current, &crop(&image, Region::new(10, 0, 100, 100)).unwrap());
    }

    #[test]
    fn test_drag_over_whole_image_keeps_everything() {
        let mut session = session(100, 100);
        session.select_tool(Tool::Crop);
        session.pointer_press(-20.0, -20.0);
        let region = session.pointer_release(140.0, 130.0).unwrap();
        assert_eq!(region, Some(Region::new(0, 0, 100, 100)));
        assert_eq!(session.current().unwrap().dimensions(), (100, 100));
    }

    #[test]
    fn test_degenerate_selection_is_rejected() {
        let mut session = session(100, 100);
        session.select_tool(Tool::Crop);
        session.pointer_press(30.0, 30.0);
        let err = session.pointer_release(30.0, 30.0).unwrap_err();

        assert!(matches!(
            err,
            SessionError::Transform(TransformError::InvalidRegion { .. })
        ));
        assert_eq!(session.history_len(), 1);
        assert_eq!(session.current().unwrap().dimensions(), (100, 100));
        assert_eq!(
            session.renderer().notices,
            vec![Notice::InvalidSelection {
                region: Region::new(30, 30, 30, 30)
            }]
        );
        assert!(session.selection().is_none());
    }

    #[test]
    fn test_zero_width_selection_is_rejected() {
        let mut session = session(100, 100);
        session.select_tool(Tool::Crop);
        session.pointer_press(20.0, 10.0);
        assert!(session.pointer_release(20.0, 90.0).is_err());
        assert_eq!(session.history_len(), 1);
    }

    #[test]
    fn test_pointer_tool_ignores_gestures() {
        let mut session = session(100, 100);
        session.pointer_press(10.0, 10.0);
        session.pointer_drag(50.0, 50.0);
        assert_eq!(session.pointer_release(60.0, 60.0), Ok(None));
        assert_eq!(session.history_len(), 1);
        assert!(session.renderer().overlays.is_empty());
    }

    #[test]
    fn test_tool_switch_discards_gesture() {
        let mut session = session(100, 100);
        session.select_tool(Tool::Crop);
        session.pointer_press(10.0, 10.0);
        session.pointer_drag(50.0, 50.0);
        session.select_tool(Tool::Mask);

        assert!(session.selection().is_none());
        assert_eq!(session.renderer().clears, 1);
        assert_eq!(session.pointer_release(60.0, 60.0), Ok(None));
        assert_eq!(session.history_len(), 1);
    }

    #[test]
    fn test_tool_names() {
        for tool in [Tool::Pointer, Tool::Crop, Tool::Mask] {
            assert_eq!(tool.name().parse::<Tool>(), Ok(tool));
        }
        assert_eq!("Crop".parse::<Tool>(), Ok(Tool::Crop));
        assert_eq!(
            "lasso".parse::<Tool>(),
            Err(SessionError::UnknownTool("lasso".to_string()))
        );
    }

    #[test]
    fn test_mask_keeps_dimensions() {
        let image = test_image(40, 30, Channels::Rgba);
        let mut session = session_with(SessionConfig::default(), image.clone());
        session.select_tool(Tool::Mask);
        session.pointer_press(5.0, 5.0);
        session.pointer_release(20.0, 15.0).unwrap();

        let current = session.current().unwrap();
        assert_eq!(current.dimensions(), (40, 30));
        assert_eq!(current, &mask_region(&image, Region::new(5, 5, 20, 15)).unwrap());
        // The tool stays active for the next selection
        assert_eq!(session.tool(), Tool::Mask);
    }

    #[test]
    fn test_previews_do_not_stack() {
        let image = test_image(64, 48, Channels::Rgb);
        let mut session = session_with(SessionConfig::default(), image.clone());

        session.preview(Adjustment::Brightness(2.0)).unwrap();
        session.preview(Adjustment::Brightness(1.5)).unwrap();
        assert_eq!(
            session.displayed().unwrap(),
            &adjust_brightness(&image, 1.5).unwrap()
        );
        assert_eq!(session.current().unwrap(), &image);
        assert_eq!(session.history_len(), 1);

        session.commit_preview().unwrap();
        assert_eq!(session.history_len(), 2);
        assert!(!session.has_preview());
        assert_eq!(
            session.current().unwrap(),
            &adjust_brightness(&image, 1.5).unwrap()
        );
    }

    #[test]
    fn test_resize_preview_and_cancel() {
        let image = test_image(80, 60, Channels::Rgb);
        let mut session = session_with(SessionConfig::default(), image.clone());

        session.preview(Adjustment::Resize(50)).unwrap();
        assert_eq!(last_frame(&session), (40, 30));
        assert_eq!(session.displayed_view().unwrap().image_size(), (40, 30));
        assert_eq!(session.view().unwrap().image_size(), (80, 60));
        assert_eq!(session.preview_adjustment(), Some(Adjustment::Resize(50)));

        assert!(session.cancel_preview());
        assert!(!session.cancel_preview());
        assert_eq!(last_frame(&session), (80, 60));
        assert_eq!(session.displayed().unwrap(), &image);
        assert_eq!(session.history_len(), 1);
    }

    #[test]
    fn test_preview_out_of_range() {
        let mut session = session(80, 60);
        assert!(matches!(
            session.preview(Adjustment::Resize(5)),
            Err(SessionError::Transform(TransformError::ScaleOutOfRange {
                percent: 5,
                min: 10,
                max: 200
            }))
        ));
        assert!(matches!(
            session.preview(Adjustment::Brightness(3.0)),
            Err(SessionError::Transform(TransformError::InvalidParameter(_)))
        ));
        assert!(!session.has_preview());
        assert_eq!(session.commit_preview(), Err(SessionError::NoPreview));
    }

    #[test]
    fn test_other_operations_abandon_preview() {
        let mut session = session(80, 60);
        session.rotate().unwrap();

        session.preview(Adjustment::Quality(50)).unwrap();
        session.undo().unwrap();
        assert!(!session.has_preview());
        assert_eq!(session.current().unwrap().dimensions(), (80, 60));

        session.preview(Adjustment::Resize(20)).unwrap();
        session.select_tool(Tool::Crop);
        assert!(!session.has_preview());
        assert_eq!(last_frame(&session), (80, 60));

        session.preview(Adjustment::Resize(20)).unwrap();
        session.pointer_press(1.0, 1.0);
        assert!(!session.has_preview());
    }

    #[test]
    fn test_failed_undo_keeps_preview() {
        let mut session = session(80, 60);
        session.preview(Adjustment::Brightness(1.2)).unwrap();
        assert!(session.undo().is_err());
        assert!(session.has_preview());
    }

    #[test]
    fn test_rotate_undo_redo() {
        let image = test_image(30, 20, Channels::Rgb);
        let mut session = session_with(SessionConfig::default(), image.clone());
        let start = session.generation();

        session.rotate().unwrap();
        session.flip().unwrap();
        assert_eq!(session.current().unwrap().dimensions(), (20, 30));
        assert_eq!(session.history_len(), 3);

        session.undo().unwrap();
        session.undo().unwrap();
        assert_eq!(session.current().unwrap(), &image);
        assert!(session.can_redo());

        session.redo().unwrap();
        assert_eq!(session.current().unwrap().dimensions(), (20, 30));
        assert_eq!(session.history_cursor(), 1);
        assert_eq!(session.generation(), start + 5);
    }

    #[test]
    fn test_commit_after_undo_truncates() {
        let mut session = session(30, 20);
        session.rotate().unwrap();
        session.flip().unwrap();
        session.undo().unwrap();
        session.apply(Transform::Resize(50)).unwrap();

        assert_eq!(session.history_len(), 3);
        assert!(!session.can_redo());
        assert_eq!(
            session.redo(),
            Err(SessionError::History(HistoryError::NothingToRedo))
        );
    }

    #[test]
    fn test_load_resets_history() {
        let mut session = session(30, 20);
        session.rotate().unwrap();
        session.rotate().unwrap();
        session.undo().unwrap();

        session.load_buffer(test_image(10, 10, Channels::Rgba));
        assert_eq!(session.history_len(), 1);
        assert!(!session.can_undo());
        assert!(!session.can_redo());
    }

    #[test]
    fn test_failed_transform_leaves_state() {
        let mut session = session(30, 20);
        let frames = session.renderer().frames.len();
        let generation = session.generation();

        assert!(session.apply(Transform::Resize(500)).is_err());
        assert!(session.apply(Transform::DegradeQuality(101)).is_err());
        assert!(session.apply(Transform::Crop(Region::new(50, 50, 60, 60))).is_err());

        assert_eq!(session.history_len(), 1);
        assert_eq!(session.generation(), generation);
        assert_eq!(session.renderer().frames.len(), frames);
    }

    #[test]
    fn test_load_bytes() {
        let image = test_image(24, 16, Channels::Rgb);
        let png = encode_png(&image).unwrap();

        let mut session = EditorSession::new(SessionConfig::default(), RecordingRenderer::default()).unwrap();
        session.load_bytes(&png).unwrap();
        assert_eq!(session.current().unwrap(), &image);

        assert!(matches!(
            session.load_bytes(b"not an image"),
            Err(SessionError::Decode(_))
        ));
        assert_eq!(session.current().unwrap(), &image);
        assert_eq!(session.history_len(), 1);
    }

    #[test]
    fn test_export_ignores_preview() {
        let image = test_image(24, 16, Channels::Rgb);
        let mut session = session_with(SessionConfig::default(), image.clone());
        session.preview(Adjustment::Resize(50)).unwrap();

        let png = session.export(SaveFormat::Png).unwrap();
        assert_eq!(decode_image(&png).unwrap(), image);
        assert!(session.has_preview());
    }

    #[test]
    fn test_save_to_path() {
        let session = session(24, 16);
        let dir = std::env::temp_dir();

        let path = dir.join(format!("pixedit-session-{}.png", std::process::id()));
        assert_eq!(session.save_to_path(&path), Ok(SaveFormat::Png));
        let reloaded = decode_file(&path).unwrap();
        assert_eq!(&reloaded, session.current().unwrap());
        let _ = std::fs::remove_file(&path);

        let path = dir.join("pixedit-session.webp");
        assert!(matches!(
            session.save_to_path(&path),
            Err(SessionError::Encode(EncodeError::UnsupportedFormat(_)))
        ));
    }

    #[test]
    fn test_set_viewport_and_center() {
        let mut session = session(400, 200);
        assert_eq!(session.view().unwrap().scale(), 1.0);

        session.set_viewport(200, 200).unwrap();
        assert_eq!(session.view().unwrap().scale(), 0.5);
        assert_eq!(session.view().unwrap().offset(), (0, 0));

        session.center_view();
        assert_eq!(session.view().unwrap().offset(), (0, 50));
        assert!(session.config().center_view);

        assert!(matches!(
            session.set_viewport(0, 10),
            Err(SessionError::Config(ConfigError::EmptyViewport { .. }))
        ));
        assert_eq!(session.config().viewport_width, 200);
    }

    #[test]
    fn test_stale_job_is_discarded() {
        let mut session = session(40, 40);
        let job = session.begin_job(Transform::Resize(50)).unwrap();
        session.rotate().unwrap();

        let outcome = session.finish_job(job.run()).unwrap();
        assert_eq!(outcome, JobOutcome::Discarded);
        assert_eq!(session.history_len(), 2);
        assert_eq!(session.current().unwrap().dimensions(), (40, 40));
        assert_eq!(
            session.renderer().notices,
            vec![Notice::JobDiscarded { transform: "resize" }]
        );
    }

    #[test]
    fn test_job_on_worker_thread() {
        let image = test_image(40, 30, Channels::Rgb);
        let mut session = session_with(SessionConfig::default(), image.clone());
        let job = session.begin_job(Transform::Resize(50)).unwrap();

        let output = std::thread::spawn(move || job.run()).join().unwrap();
        assert_eq!(session.finish_job(output), Ok(JobOutcome::Committed));
        assert_eq!(session.current().unwrap(), &resize_percent(&image, 50).unwrap());
        assert!(session.can_undo());
    }

    #[test]
    fn test_discrete_brightness_ignores_slider_range() {
        let mut session = session(8, 6);
        assert!(session.preview(Adjustment::Brightness(0.0)).is_err());
        assert!(!session.has_preview());

        session.apply(Transform::Brightness(0.0)).unwrap();
        assert_eq!(session.history_len(), 2);
        assert!(session.current().unwrap().pixels().iter().all(|&v| v == 0));

        assert!(matches!(
            session.apply(Transform::Brightness(-1.0)),
            Err(SessionError::Transform(TransformError::InvalidParameter(_)))
        ));
        assert_eq!(session.history_len(), 2);
    }

    #[test]
    fn test_begin_job_checks_range() {
        let session = session(40, 30);
        assert!(session.begin_job(Transform::Resize(1)).is_err());
    }

    #[test]
    fn test_perform_actions() {
        let mut session = session(30, 20);
        assert_eq!(session.perform(Action::Open), Ok(false));
        assert_eq!(session.perform(Action::Rotate), Ok(true));
        assert_eq!(session.current().unwrap().dimensions(), (20, 30));
        assert_eq!(session.perform(Action::CropTool), Ok(true));
        assert_eq!(session.tool(), Tool::Crop);
        assert_eq!(session.perform(Action::Undo), Ok(true));
        assert!(session.perform(Action::Undo).is_err());
    }

    #[test]
    fn test_history_limit_from_config() {
        let mut config = SessionConfig::default();
        config.history_limit = Some(2);
        let mut session = session_with(config, test_image(10, 10, Channels::Rgb));
        session.rotate().unwrap();
        session.rotate().unwrap();
        session.rotate().unwrap();
        assert_eq!(session.history_len(), 2);
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================

#[cfg(test)]
mod proptests {
    use super::*;
    use crate::raster::{test_image, Channels};
    use crate::view::DisplayRect;
    use proptest::prelude::*;

    struct NullRenderer;

    impl Renderer for NullRenderer {
        fn render(&mut self, _: &RasterBuffer, _: &ViewState) {}
        fn overlay(&mut self, _: DisplayRect) {}
        fn clear_overlay(&mut self) {}
        fn notice(&mut self, _: Notice) {}
    }

    proptest! {
        /// Property: a crop drag commits exactly the selected sub-region, at
        /// any viewport size.
        #[test]
        fn prop_crop_matches_selection(
            (vw, vh) in (20u32..=400, 20u32..=400),
            (x1, y1) in (0u32..60, 0u32..60),
            (w, h) in (1u32..40, 1u32..40),
        ) {
            let image = test_image(100, 100, Channels::Rgb);
            let config = SessionConfig { viewport_width: vw, viewport_height: vh, ..SessionConfig::default() };
            let mut session = EditorSession::new(config, NullRenderer).unwrap();
            session.load_buffer(image.clone());
            session.select_tool(Tool::Crop);

            let view = session.view().unwrap();
            let (px1, py1) = view.to_display(x1 as f64, y1 as f64);
            let (px2, py2) = view.to_display((x1 + w) as f64, (y1 + h) as f64);
            session.pointer_press(px1, py1);

            match session.pointer_release(px2, py2) {
                Ok(Some(region)) => {
                    let expected = crate::transform::crop(&image, region).unwrap();
                    prop_assert_eq!(session.current().unwrap(), &expected);
                    prop_assert_eq!(session.history_len(), 2);
                }
                Ok(None) => prop_assert!(false, "gesture lost"),
                Err(_) => prop_assert_eq!(session.history_len(), 1),
            }
        }

        /// Property: the committed buffer after any operation sequence is
        /// one of the states the history holds, and generation only grows.
        #[test]
        fn prop_operations_keep_invariants(ops in prop::collection::vec(0u8..6, 0..30)) {
            let mut session = EditorSession::new(SessionConfig::default(), NullRenderer).unwrap();
            session.load_buffer(test_image(12, 8, Channels::Rgb));

            let mut generation = session.generation();
            for op in ops {
                let _ = match op {
                    0 => session.rotate(),
                    1 => session.flip(),
                    2 => session.undo(),
                    3 => session.redo(),
                    4 => session.preview(Adjustment::Brightness(1.5)),
                    _ => session.commit_preview(),
                };
                prop_assert!(session.generation() >= generation);
                generation = session.generation();
                prop_assert!(session.history_cursor() < session.history_len());
                let view = session.view().unwrap();
                prop_assert!(view.matches(session.current().unwrap()));
            }
        }
    }
}
