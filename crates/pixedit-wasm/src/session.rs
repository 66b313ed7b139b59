//! The editing session exposed to JavaScript.
//!
//! `JsEditorSession` forwards control-surface events to the core session and
//! keeps the latest rendered frame, overlay rectangle and notices for the
//! page to pick up after each call.
//!
//! # Example
//!
//! ```typescript
//! import { JsEditorSession } from '@pixedit/wasm';
//!
//! const session = new JsEditorSession({ viewport_width: 800, viewport_height: 500 });
//! session.load(new Uint8Array(await file.arrayBuffer()));
//!
//! canvas.onpointerdown = (e) => session.pointer_press(e.offsetX, e.offsetY);
//! canvas.onpointermove = (e) => session.pointer_drag(e.offsetX, e.offsetY);
//! canvas.onpointerup = (e) => session.pointer_release(e.offsetX, e.offsetY);
//!
//! const frame = session.take_frame();
//! if (frame) ctx.putImageData(new ImageData(frame.rgba_pixels(), frame.width), ...session.offset());
//! undoButton.disabled = !session.status().can_undo;
//! ```

use crate::types::JsRasterBuffer;
use pixedit_core::history::HistoryError;
use pixedit_core::keymap::{Keymap, Shortcut};
use pixedit_core::session::{Adjustment, EditorSession, Notice, Renderer, SessionError, Tool};
use pixedit_core::transform::TransformError;
use pixedit_core::view::{render_frame, DisplayRect, ViewState};
use pixedit_core::{RasterBuffer, SaveFormat, SessionConfig};
use serde::Serialize;
use wasm_bindgen::prelude::*;

/// Control-surface state after a call: which buttons to enable and what to label.
#[derive(Debug, Clone, PartialEq, Serialize)]
struct SessionStatus {
    has_image: bool,
    can_undo: bool,
    can_redo: bool,
    has_preview: bool,
    history_len: usize,
    tool: &'static str,
    width: u32,
    height: u32,
}

/// Collects what the session renders until the page asks for it.
#[derive(Debug, Default)]
pub(crate) struct FrameSink {
    frame: Option<RasterBuffer>,
    view: Option<ViewState>,
    overlay: Option<DisplayRect>,
    notices: Vec<Notice>,
}

impl Renderer for FrameSink {
    fn render(&mut self, image: &RasterBuffer, view: &ViewState) {
        match render_frame(image, view) {
            Ok(frame) => {
                self.frame = Some(frame);
                self.view = Some(*view);
            }
            Err(e) => log::warn!("frame dropped: {}", e),
        }
    }

    fn overlay(&mut self, rect: DisplayRect) {
        self.overlay = Some(rect);
    }

    fn clear_overlay(&mut self) {
        self.overlay = None;
    }

    fn notice(&mut self, notice: Notice) {
        self.notices.push(notice);
    }
}

/// An editing session driven from JavaScript.
#[wasm_bindgen]
pub struct JsEditorSession {
    inner: EditorSession<FrameSink>,
    keymap: Keymap,
}

#[wasm_bindgen]
impl JsEditorSession {
    /// Create a session. `config` is an optional object with any of the
    /// `SessionConfig` fields; missing fields take their defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<JsEditorSession, JsValue> {
        let config: SessionConfig = if config.is_undefined() || config.is_null() {
            SessionConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)?
        };
        Self::with_config(config).map_err(to_js)
    }

    /// Decode and load file bytes, replacing the image and its history.
    pub fn load(&mut self, bytes: &[u8]) -> Result<(), JsValue> {
        self.inner.load_bytes(bytes).map_err(to_js)
    }

    /// Encode the committed image as `"jpg"` or `"png"`.
    pub fn export(&self, format: &str) -> Result<Vec<u8>, JsValue> {
        let format = SaveFormat::from_extension(format).map_err(to_js)?;
        self.inner.export(format).map_err(to_js)
    }

    /// Step back one state. Returns `false` when there is nothing to undo;
    /// the button should already be disabled from `status().can_undo`.
    pub fn undo(&mut self) -> Result<bool, JsValue> {
        stepped(self.inner.undo()).map_err(to_js)
    }

    /// Step forward one state. Returns `false` when there is nothing to redo.
    pub fn redo(&mut self) -> Result<bool, JsValue> {
        stepped(self.inner.redo()).map_err(to_js)
    }

    pub fn rotate(&mut self) -> Result<(), JsValue> {
        self.inner.rotate().map_err(to_js)
    }

    pub fn flip(&mut self) -> Result<(), JsValue> {
        self.inner.flip().map_err(to_js)
    }

    /// Select `"pointer"`, `"crop"` or `"mask"`.
    pub fn select_tool(&mut self, tool: &str) -> Result<(), JsValue> {
        let tool: Tool = tool.parse().map_err(to_js)?;
        self.inner.select_tool(tool);
        Ok(())
    }

    #[wasm_bindgen(getter)]
    pub fn tool(&self) -> String {
        self.inner.tool().name().to_string()
    }

    pub fn pointer_press(&mut self, x: f64, y: f64) {
        self.inner.pointer_press(x, y);
    }

    pub fn pointer_drag(&mut self, x: f64, y: f64) {
        self.inner.pointer_drag(x, y);
    }

    /// Finish a selection. Returns the committed region, or `undefined` when
    /// nothing was committed; empty selections show up in `take_notices`.
    pub fn pointer_release(&mut self, x: f64, y: f64) -> Result<JsValue, JsValue> {
        let region = self.release(x, y).map_err(to_js)?;
        Ok(serde_wasm_bindgen::to_value(&region)?)
    }

    /// Preview an adjustment such as `{ kind: "brightness", value: 1.2 }`.
    pub fn preview(&mut self, adjustment: JsValue) -> Result<(), JsValue> {
        let adjustment: Adjustment = serde_wasm_bindgen::from_value(adjustment)?;
        self.inner.preview(adjustment).map_err(to_js)
    }

    pub fn commit_preview(&mut self) -> Result<(), JsValue> {
        self.inner.commit_preview().map_err(to_js)
    }

    pub fn cancel_preview(&mut self) -> bool {
        self.inner.cancel_preview()
    }

    pub fn center_view(&mut self) {
        self.inner.center_view();
    }

    pub fn set_viewport(&mut self, width: u32, height: u32) -> Result<(), JsValue> {
        self.inner.set_viewport(width, height).map_err(to_js)
    }

    /// Handle a key event. Shortcuts the session can act on are performed;
    /// `"open"` and `"save"` are returned for the page to handle. Returns
    /// `undefined` for unbound keys and handled shortcuts.
    pub fn handle_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
    ) -> Result<Option<String>, JsValue> {
        self.dispatch_key(key, ctrl, shift, alt).map_err(to_js)
    }

    /// Take the latest display-sized frame, if anything was rendered since
    /// the last call.
    pub fn take_frame(&mut self) -> Option<JsRasterBuffer> {
        self.inner
            .renderer_mut()
            .frame
            .take()
            .map(JsRasterBuffer::from_raster)
    }

    /// View of the displayed image: `{ scale, offset_x, offset_y, ... }`.
    pub fn view(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&self.inner.displayed_view())?)
    }

    /// Where to draw the last frame, as `[x, y]`.
    pub fn offset(&self) -> Vec<i32> {
        let (x, y) = self
            .inner
            .renderer()
            .view
            .map(|v| v.offset())
            .unwrap_or((0, 0));
        vec![x, y]
    }

    /// The selection rectangle to draw, or `undefined`.
    pub fn overlay(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&self.inner.renderer().overlay)?)
    }

    /// Notices raised since the last call.
    pub fn take_notices(&mut self) -> Result<JsValue, JsValue> {
        let notices = std::mem::take(&mut self.inner.renderer_mut().notices);
        Ok(serde_wasm_bindgen::to_value(&notices)?)
    }

    /// Snapshot of `{ has_image, can_undo, can_redo, has_preview,
    /// history_len, tool, width, height }` for refreshing controls.
    pub fn status(&self) -> Result<JsValue, JsValue> {
        Ok(serde_wasm_bindgen::to_value(&self.snapshot())?)
    }

    #[wasm_bindgen(getter)]
    pub fn can_undo(&self) -> bool {
        self.inner.can_undo()
    }

    #[wasm_bindgen(getter)]
    pub fn can_redo(&self) -> bool {
        self.inner.can_redo()
    }

    #[wasm_bindgen(getter)]
    pub fn has_image(&self) -> bool {
        self.inner.current().is_some()
    }

    #[wasm_bindgen(getter)]
    pub fn has_preview(&self) -> bool {
        self.inner.has_preview()
    }

    #[wasm_bindgen(getter)]
    pub fn history_len(&self) -> usize {
        self.inner.history_len()
    }

    /// Dimensions of the committed image as `[width, height]`, empty before load.
    pub fn image_size(&self) -> Vec<u32> {
        self.inner
            .current()
            .map(|img| vec![img.width(), img.height()])
            .unwrap_or_default()
    }
}

impl JsEditorSession {
    fn with_config(config: SessionConfig) -> Result<Self, SessionError> {
        Ok(Self {
            inner: EditorSession::new(config, FrameSink::default())?,
            keymap: Keymap::default(),
        })
    }

    fn snapshot(&self) -> SessionStatus {
        let (width, height) = self
            .inner
            .current()
            .map(|img| img.dimensions())
            .unwrap_or((0, 0));
        SessionStatus {
            has_image: self.inner.current().is_some(),
            can_undo: self.inner.can_undo(),
            can_redo: self.inner.can_redo(),
            has_preview: self.inner.has_preview(),
            history_len: self.inner.history_len(),
            tool: self.inner.tool().name(),
            width,
            height,
        }
    }

    /// Empty selections are reported through notices, not as errors.
    fn release(&mut self, x: f64, y: f64) -> Result<Option<pixedit_core::Region>, SessionError> {
        match self.inner.pointer_release(x, y) {
            Err(SessionError::Transform(TransformError::InvalidRegion { .. })) => Ok(None),
            other => other,
        }
    }

    fn dispatch_key(
        &mut self,
        key: &str,
        ctrl: bool,
        shift: bool,
        alt: bool,
    ) -> Result<Option<String>, SessionError> {
        let Some(action) = Shortcut::from_event(key, ctrl, shift, alt)
            .and_then(|shortcut| self.keymap.lookup(&shortcut))
        else {
            return Ok(None);
        };

        let handled = match self.inner.perform(action) {
            Err(SessionError::History(
                HistoryError::NothingToUndo | HistoryError::NothingToRedo,
            )) => true,
            other => other?,
        };
        if handled {
            Ok(None)
        } else {
            log::debug!("shortcut {:?} passed to the page", action);
            Ok(Some(format!("{:?}", action).to_lowercase()))
        }
    }
}

/// Undo/redo at the end of history is a disabled control, not an error.
fn stepped(result: Result<(), SessionError>) -> Result<bool, SessionError> {
    match result {
        Ok(()) => Ok(true),
        Err(SessionError::History(err @ (HistoryError::NothingToUndo | HistoryError::NothingToRedo))) => {
            log::debug!("history step ignored: {}", err);
            Ok(false)
        }
        Err(err) => Err(err),
    }
}

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}


#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use pixedit_core::encode::encode_png;
    use pixedit_core::raster::Channels;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn png(width: u32, height: u32) -> Vec<u8> {
        let image = RasterBuffer::filled(width, height, Channels::Rgb, 100).unwrap();
        encode_png(&image).unwrap()
    }

    #[wasm_bindgen_test]
    fn test_new_with_default_config() {
        let session = JsEditorSession::new(JsValue::UNDEFINED).unwrap();
        assert!(!session.has_image());
        assert_eq!(session.tool(), "pointer");
    }

    #[wasm_bindgen_test]
    fn test_new_with_partial_config() {
        let config = js_sys::Object::new();
        js_sys::Reflect::set(&config, &"viewport_width".into(), &JsValue::from(100)).unwrap();
        js_sys::Reflect::set(&config, &"center_view".into(), &JsValue::TRUE).unwrap();

        let mut session = JsEditorSession::new(config.into()).unwrap();
        session.load(&png(200, 100)).unwrap();
        let frame = session.take_frame().unwrap();
        assert_eq!((frame.width(), frame.height()), (100, 50));
        assert_eq!(session.offset(), vec![0, 225]);
    }

    #[wasm_bindgen_test]
    fn test_status_object() {
        let session = JsEditorSession::new(JsValue::UNDEFINED).unwrap();
        let status = session.status().unwrap();
        let tool = js_sys::Reflect::get(&status, &"tool".into()).unwrap();
        assert_eq!(tool.as_string().as_deref(), Some("pointer"));
    }

    #[wasm_bindgen_test]
    fn test_load_and_export() {
        let mut session = JsEditorSession::new(JsValue::NULL).unwrap();
        session.load(&png(64, 32)).unwrap();
        assert_eq!(session.image_size(), vec![64, 32]);

        let jpeg = session.export("jpg").unwrap();
        assert_eq!(&jpeg[0..2], &[0xFF, 0xD8]);
        assert!(session.export("gif").is_err());
    }

    #[wasm_bindgen_test]
    fn test_undo_without_history_is_not_an_error() {
        let mut session = JsEditorSession::new(JsValue::UNDEFINED).unwrap();
        assert_eq!(session.undo(), Ok(false));
        assert_eq!(session.redo(), Ok(false));
        assert!(session.select_tool("lasso").is_err());
    }

    #[wasm_bindgen_test]
    fn test_preview_from_js_object() {
        let mut session = JsEditorSession::new(JsValue::UNDEFINED).unwrap();
        session.load(&png(40, 40)).unwrap();

        let adjustment =
            serde_wasm_bindgen::to_value(&Adjustment::Resize(50)).unwrap();
        session.preview(adjustment).unwrap();
        assert!(session.has_preview());

        let frame = session.take_frame().unwrap();
        assert_eq!((frame.width(), frame.height()), (20, 20));

        session.commit_preview().unwrap();
        assert_eq!(session.image_size(), vec![20, 20]);
        assert!(session.can_undo());
    }

    #[wasm_bindgen_test]
    fn test_release_returns_region() {
        let mut session = JsEditorSession::new(JsValue::UNDEFINED).unwrap();
        session.load(&png(100, 100)).unwrap();
        session.select_tool("crop").unwrap();
        session.pointer_press(10.0, 10.0);
        let region = session.pointer_release(60.0, 40.0).unwrap();
        assert!(region.is_object());

        session.pointer_press(5.0, 5.0);
        assert!(session.pointer_release(5.0, 5.0).unwrap().is_undefined());
    }
}
