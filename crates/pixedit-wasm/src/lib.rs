//! Pixedit WASM - WebAssembly bindings for Pixedit
//!
//! This crate exposes the pixedit-core editing session to JavaScript. It only
//! translates between browser events and core calls; every editing rule lives
//! in the core crate.
//!
//! # Module Structure
//!
//! - `session` - `JsEditorSession`, the interactive session
//! - `types` - WASM-compatible wrapper types for image data
//! - `codec` - Standalone decode/encode helpers
//! - `logger` - Console backend for the `log` facade
//!
//! # Usage
//!
//! ```typescript
//! import init, { set_log_level, JsEditorSession } from '@pixedit/wasm';
//!
//! await init();
//! set_log_level('debug');
//!
//! const session = new JsEditorSession();
//! session.load(new Uint8Array(await file.arrayBuffer()));
//! ```

use wasm_bindgen::prelude::*;

mod codec;
mod logger;
mod session;
mod types;

pub use codec::{decode_image, encode_image, fit_to_viewport};
pub use session::JsEditorSession;
pub use types::JsRasterBuffer;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    logger::install(log::LevelFilter::Info);
    log::debug!("pixedit-wasm {} ready", version());
}

/// Change the console log level: `"off"`, `"error"`, `"warn"`, `"info"`,
/// `"debug"` or `"trace"`. Unknown names select `"info"`.
#[wasm_bindgen]
pub fn set_log_level(level: &str) {
    logger::install(logger::parse_level(level));
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
