//! WebAssembly Bridge Implementations
//!
//! This crate provides browser implementations of the bridge traits defined
//! in `bridge-traits`, using `web-sys` and `wasm-bindgen`.
//!
//! # Platform Support
//!
//! This crate is designed exclusively for the `wasm32-unknown-unknown` target.
//! It will not compile for native targets.
//!
//! # Implementations
//!
//! - `HtmlAudioDevice`: `<audio>` element media device with event forwarding
//! - `WasmHttpClient`: `fetch` from the page or the service worker
//! - `BrowserCacheStorage`: named caches of the Cache API
//! - `BrowserNetworkMonitor`: `navigator.onLine` plus `online`/`offline` events
//! - `BrowserInstallPrompt`: the deferred `beforeinstallprompt` event
//!
//! # Examples
//!
//! ```ignore
//! use bridge_wasm::{build_wasm_bridges, WasmBridgeConfig};
//!
//! let bridges = build_wasm_bridges(WasmBridgeConfig::default())?;
//! bridges.media_device.play().await?;
//! ```

#![cfg(target_arch = "wasm32")]

pub mod audio;
pub mod bootstrap;
pub mod cache_storage;
pub mod error;
pub mod http;
pub mod install;
pub mod network;
pub mod scope;

// Re-export commonly used types
pub use audio::{HtmlAudioDevice, DEFAULT_AUDIO_ELEMENT_ID};
pub use bootstrap::{
    build_wasm_bridges, build_worker_bridges, WasmBridgeConfig, WasmBridgeSet, WorkerBridgeSet,
};
pub use cache_storage::BrowserCacheStorage;
pub use error::{WasmError, WasmResult};
pub use http::WasmHttpClient;
pub use install::BrowserInstallPrompt;
pub use network::{BrowserNetworkChanges, BrowserNetworkMonitor};
pub use scope::GlobalScope;
