//! cloudsim - a canned cloud/DevOps CLI session in the browser
//!
//! Type `gcloud config list` or `docker ps` and get a scripted answer.
//! Nothing is executed: the whole program is a fixed table of responses and
//! a line editor that looks commands up in it.
//!
//! Platform support:
//! - Browser (wasm32-unknown-unknown): xterm.js terminal
//! - Native: `cloudsim-cli` over stdin/stdout, and the test suite

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

pub mod commands;
pub mod config;
pub mod dispatcher;
pub mod platform;

#[cfg(target_arch = "wasm32")]
pub mod terminal;

pub use commands::{CommandTable, Producer};
pub use config::{DownloadOptions, DownloadScope, TerminalConfig};
pub use dispatcher::{
    CommandStatus, DispatchError, DispatchOutcome, Dispatcher, Input, LineState, StateWatch,
};
pub use platform::{KeyEvent, TerminalView};

/// Initialize panic hook for better error messages in browser console
#[cfg(target_arch = "wasm32")]
fn init_panic_hook() {
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Mount the terminal with the default configuration. This is the WASM
/// entry point.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn main() -> Result<(), JsValue> {
    init_panic_hook();
    terminal::init(TerminalConfig::default())?;
    Ok(())
}

/// Remount the terminal with a page-provided JSON configuration
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn start_with_config(json: &str) -> Result<(), JsValue> {
    let config = TerminalConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?;
    terminal::init(config)?;
    Ok(())
}

/// Release the terminal and its listeners
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn dispose() {
    terminal::dispose();
}

/// Bring a session back after `exit`
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn reset() {
    terminal::reset();
}

/// Console logging helper
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = console)]
    fn log(s: &str);
}

/// Log to browser console (WASM)
#[cfg(target_arch = "wasm32")]
#[macro_export]
macro_rules! console_log {
    ($($t:tt)*) => {
        $crate::log(&format!($($t)*))
    };
}

/// Log to stderr (native)
#[cfg(not(target_arch = "wasm32"))]
#[macro_export]
macro_rules! console_log {
    ($($t:tt)*) => {
        eprintln!($($t)*)
    };
}
