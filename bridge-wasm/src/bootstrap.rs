//! Convenience helpers for wiring all wasm bridge implementations together.
//!
//! The page uses [`build_wasm_bridges`] to get the audio device, its event
//! channel, the fetch client and the connectivity monitor in one call. The
//! service worker only needs fetch and the Cache API, which
//! [`build_worker_bridges`] provides.

use std::sync::Arc;

use bridge_traits::{
    error::Result as BridgeResult,
    http::HttpClient,
    network::NetworkMonitor,
    playback::{device_event_channel, DeviceEventReceiver, MediaDevice},
    storage::CacheStorage,
};

use crate::{
    audio::{HtmlAudioDevice, DEFAULT_AUDIO_ELEMENT_ID},
    cache_storage::BrowserCacheStorage,
    http::WasmHttpClient,
    network::BrowserNetworkMonitor,
};

/// Configuration for [`build_wasm_bridges`].
#[derive(Debug, Clone)]
pub struct WasmBridgeConfig {
    /// Id of the page's `<audio>` element; created when absent.
    pub audio_element_id: String,
}

impl WasmBridgeConfig {
    pub fn new(audio_element_id: impl Into<String>) -> Self {
        Self {
            audio_element_id: audio_element_id.into(),
        }
    }
}

impl Default for WasmBridgeConfig {
    fn default() -> Self {
        Self::new(DEFAULT_AUDIO_ELEMENT_ID)
    }
}

/// Page-side bridge objects ready for injection into the core.
pub struct WasmBridgeSet {
    /// HTTP client powered by browser `fetch`.
    pub http_client: Arc<dyn HttpClient>,
    /// `<audio>` element device.
    pub media_device: Arc<dyn MediaDevice>,
    /// Events emitted by `media_device`; hand to the controller's pump.
    pub device_events: DeviceEventReceiver,
    /// `navigator.onLine` monitor.
    pub network_monitor: Arc<dyn NetworkMonitor>,
}

/// Service-worker-side bridge objects.
pub struct WorkerBridgeSet {
    pub http_client: Arc<dyn HttpClient>,
    pub cache_storage: Arc<dyn CacheStorage>,
}

/// Build the page bridge stack.
pub fn build_wasm_bridges(config: WasmBridgeConfig) -> BridgeResult<WasmBridgeSet> {
    let (sender, device_events) = device_event_channel();
    let media_device: Arc<dyn MediaDevice> =
        Arc::new(HtmlAudioDevice::attach(&config.audio_element_id, sender)?);
    let http_client: Arc<dyn HttpClient> = Arc::new(WasmHttpClient::new()?);
    let network_monitor: Arc<dyn NetworkMonitor> = Arc::new(BrowserNetworkMonitor::new()?);

    Ok(WasmBridgeSet {
        http_client,
        media_device,
        device_events,
        network_monitor,
    })
}

/// Build the bridges the offline cache needs inside a service worker.
pub fn build_worker_bridges() -> BridgeResult<WorkerBridgeSet> {
    Ok(WorkerBridgeSet {
        http_client: Arc::new(WasmHttpClient::new()?),
        cache_storage: Arc::new(BrowserCacheStorage::new()?),
    })
}
