//! Error types for WebAssembly bridge implementations

use bridge_traits::error::BridgeError;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::DomException;

/// Result type for WebAssembly bridge operations
pub type WasmResult<T> = Result<T, WasmError>;

/// Errors that can occur in WebAssembly bridge implementations
#[derive(Error, Debug)]
pub enum WasmError {
    /// JavaScript error from web-sys
    #[error("JavaScript error: {0}")]
    JavaScript(String),

    /// The browser refused the call until the user interacts with the page
    #[error("Not allowed: {0}")]
    NotAllowed(String),

    /// A browser global (window, document, caches) is missing in this scope
    #[error("Unavailable: {0}")]
    Unavailable(String),

    /// Cache API failure
    #[error("Cache error: {0}")]
    Cache(String),

    /// Unsupported operation
    #[error("Unsupported operation: {0}")]
    Unsupported(String),
}

impl WasmError {
    /// Convert a rejected promise or thrown value, keeping the operation name.
    pub fn from_js(context: &str, value: JsValue) -> Self {
        if let Some(exception) = value.dyn_ref::<DomException>() {
            let name = exception.name();
            let message = format!("{context}: {name}: {}", exception.message());
            return if name == "NotAllowedError" {
                WasmError::NotAllowed(message)
            } else {
                WasmError::JavaScript(message)
            };
        }
        WasmError::JavaScript(format!("{context}: {}", js_message(&value)))
    }
}

impl From<WasmError> for BridgeError {
    fn from(err: WasmError) -> Self {
        match err {
            WasmError::NotAllowed(msg) => BridgeError::NotAllowed(msg),
            WasmError::Unavailable(msg) | WasmError::Unsupported(msg) => {
                BridgeError::NotAvailable(msg)
            }
            other => BridgeError::OperationFailed(other.to_string()),
        }
    }
}

impl From<JsValue> for WasmError {
    fn from(js_value: JsValue) -> Self {
        WasmError::from_js("javascript", js_value)
    }
}

/// Shorthand for mapping a `JsValue` failure straight to a [`BridgeError`].
pub(crate) fn js_error(context: &str, err: JsValue) -> BridgeError {
    WasmError::from_js(context, err).into()
}

fn js_message(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        text
    } else if let Some(error) = value.dyn_ref::<js_sys::Error>() {
        error.message().into()
    } else {
        format!("{:?}", value)
    }
}
