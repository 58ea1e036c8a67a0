//! Player service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations (media device,
//! catalog, connectivity, install prompt) into the playback core. WebAssembly
//! builds enable the `wasm` feature, which adds the browser adapters from
//! `bridge-wasm` and the `wasm-bindgen` exports in [`wasm`].

pub mod error;
pub mod service;
pub mod view;

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub mod wasm;

pub use error::{CoreError, Result};
pub use service::{PlayerDependencies, PlayerService};
pub use view::PlayerView;

pub use core_playback::{LoadPhase, PlayerConfig, SeekTarget};

#[cfg(feature = "offline-cache")]
pub use core_playback::cache::{CacheConfig, CacheStats, OfflineAssetCache, WorkerPhase};

#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub use bridge_wasm::WasmBridgeConfig;

/// Convenience bootstrapper for WebAssembly hosts.
///
/// `tracks` is the catalog embedded in the page; the configured fallback
/// tracks are used when it is empty.
///
/// ```ignore
/// use core_service::{bootstrap_wasm, PlayerConfig, WasmBridgeConfig};
///
/// let service = bootstrap_wasm(
///     WasmBridgeConfig::default(),
///     PlayerConfig::default(),
///     vec!["/songs/amma1.mp3".to_string()],
/// )?;
/// service.start().await?;
/// ```
#[cfg(all(feature = "wasm", target_arch = "wasm32"))]
pub fn bootstrap_wasm(
    bridge_config: WasmBridgeConfig,
    player_config: PlayerConfig,
    tracks: Vec<String>,
) -> Result<PlayerService> {
    use std::sync::Arc;

    let bridges = bridge_wasm::build_wasm_bridges(bridge_config)
        .map_err(|err| CoreError::InitializationFailed(err.to_string()))?;

    let deps = PlayerDependencies::new(
        bridges.media_device,
        bridges.device_events,
        Arc::new(core_playback::StaticCatalog::new(tracks)),
    )
    .with_network_monitor(bridges.network_monitor);

    PlayerService::new(player_config, deps)
}
