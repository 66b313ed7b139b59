//! Pixedit Core - Interactive image editing session
//!
//! This crate provides the editing core for Pixedit: decoded raster buffers,
//! pure transforms (crop, mask, resize, rotate, flip, brightness, quality),
//! pointer-to-image coordinate mapping, linear undo/redo history and the
//! session state machine that ties them together.
//!
//! Drawing, file pickers and menus live outside this crate. The session
//! talks to them through the [`Renderer`] trait and plain method calls.

pub mod config;
pub mod decode;
pub mod encode;
pub mod history;
pub mod keymap;
pub mod raster;
pub mod region;
pub mod session;
pub mod transform;
pub mod view;

pub use config::SessionConfig;
pub use encode::SaveFormat;
pub use keymap::{Action, Keymap, Shortcut};
pub use raster::{Channels, RasterBuffer};
pub use region::Region;
pub use session::{Adjustment, EditorSession, Notice, Renderer, SessionError, Tool};
pub use transform::Transform;
pub use view::{render_frame, DisplayRect, ViewState};
