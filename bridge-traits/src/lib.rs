//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the player core and the
//! environment it runs in. Each trait represents a capability the core needs
//! but that is implemented differently per host (browser page, service
//! worker, native test harness).
//!
//! ## Traits
//!
//! ### Playback
//! - [`MediaDevice`](playback::MediaDevice) - Single media-output handle (load/play/pause/seek/preload)
//! - [`CatalogProvider`](catalog::CatalogProvider) - Ordered list of track URLs
//!
//! ### Networking & Offline Storage
//! - [`HttpClient`](http::HttpClient) - `fetch`-style request execution
//! - [`CacheStorage`](storage::CacheStorage) - Named buckets of captured responses
//! - [`NetworkMonitor`](network::NetworkMonitor) - Online/offline detection
//!
//! ### App Shell
//! - [`InstallPrompt`](install::InstallPrompt) - Deferred install prompt
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Web      | `bridge-wasm`       | ✅ Available |
//! | Native   | test doubles        | 🧪 Tests only |
//!
//! ## Error Handling
//!
//! All bridge traits use the [`BridgeError`](error::BridgeError) type. Platform
//! implementations should:
//!
//! - Convert platform-specific errors to `BridgeError`
//! - Report autoplay-policy refusals as `BridgeError::NotAllowed`
//! - Report failed fetches as `BridgeError::Network`
//!
//! ## Thread Safety
//!
//! Native builds require `Send + Sync` on every bridge object; wasm32 builds
//! drop those bounds through [`PlatformSendSync`](platform::PlatformSendSync)
//! because browser handles are single-threaded.

pub mod catalog;
pub mod error;
pub mod http;
pub mod install;
pub mod network;
pub mod platform;
pub mod playback;
pub mod storage;

pub use error::BridgeError;

// Re-export commonly used types
pub use catalog::CatalogProvider;
pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RequestMode};
pub use install::{InstallOutcome, InstallPrompt};
pub use network::{NetworkChangeStream, NetworkInfo, NetworkMonitor, NetworkStatus};
pub use playback::{
    device_event_channel, DeviceEvent, DeviceEventReceiver, DeviceEventSender, DeviceNotification,
    DeviceSnapshot, MediaDevice, MediaSource, ReadyState, SwitchEpoch,
};
pub use storage::{CacheStorage, CachedResponse, RequestKey};
