//! WASM module: browser adapters for the minting session
//!
//! Architecture:
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         MintApp (JS API)                │
//! │  restore, connect, reset, mint, onChange│
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │  JsWalletModal (web3modal-style object) │
//! │  connect() / connectTo(id)              │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │   Eip1193Provider (window.ethereum ...) │
//! │  request(), on(), removeListener()      │
//! └─────────────────┬───────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────┐
//! │        LocalStorage (markers)           │
//! └─────────────────────────────────────────┘
//! ```

mod app;
mod modal;
mod provider;
mod storage;

pub use app::WasmMintApp;
pub use modal::JsWalletModal;
pub use provider::{Eip1193Provider, JsEventSource};
pub use storage::LocalStorage;

use wasm_bindgen::prelude::*;

/// Initialize WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Log to browser console
pub fn console_log(s: &str) {
    web_sys::console::log_1(&JsValue::from_str(s));
}

macro_rules! log {
    ($($t:tt)*) => {
        crate::wasm::console_log(&format!($($t)*))
    }
}

pub(crate) use log;

/// Property lookup that treats a throwing getter as `undefined`
pub(crate) fn js_get(target: &JsValue, key: &str) -> JsValue {
    js_sys::Reflect::get(target, &JsValue::from_str(key)).unwrap_or(JsValue::UNDEFINED)
}

/// `target[name]` when it is callable
pub(crate) fn js_method(target: &JsValue, name: &str) -> Option<js_sys::Function> {
    js_get(target, name).dyn_into::<js_sys::Function>().ok()
}

/// Best-effort message of a thrown JS value
pub(crate) fn js_message(err: &JsValue) -> String {
    js_get(err, "message")
        .as_string()
        .or_else(|| err.as_string())
        .unwrap_or_else(|| format!("{:?}", err))
}
