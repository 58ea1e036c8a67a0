//! Network Monitoring Abstraction
//!
//! Provides online/offline status so the player can tell the user when it is
//! running from the offline cache.

use crate::{
    error::Result,
    platform::{PlatformSend, PlatformSendSync},
};
use serde::{Deserialize, Serialize};

/// Connectivity as reported by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NetworkStatus {
    Connected,
    Disconnected,
}

/// One connectivity reading.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NetworkInfo {
    pub status: NetworkStatus,
}

impl NetworkInfo {
    pub fn online() -> Self {
        Self {
            status: NetworkStatus::Connected,
        }
    }

    pub fn offline() -> Self {
        Self {
            status: NetworkStatus::Disconnected,
        }
    }

    pub fn is_online(&self) -> bool {
        self.status == NetworkStatus::Connected
    }
}

/// Network monitor trait
///
/// # Platform Support
///
/// - **Web**: `navigator.onLine` plus the window `online`/`offline` events
/// - **Native**: test doubles only
///
/// # Example
///
/// ```ignore
/// use bridge_traits::network::NetworkMonitor;
///
/// async fn badge(monitor: &dyn NetworkMonitor) -> &'static str {
///     if monitor.is_connected().await { "online" } else { "offline" }
/// }
/// ```
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait NetworkMonitor: PlatformSendSync {
    /// Get current network information
    async fn get_network_info(&self) -> Result<NetworkInfo>;

    /// Check if currently connected to any network
    async fn is_connected(&self) -> bool {
        self.get_network_info()
            .await
            .map(|info| info.is_online())
            .unwrap_or(false)
    }

    /// Subscribe to network status changes
    ///
    /// Returns a stream of network info updates. Implementations should
    /// emit an event whenever network status changes.
    async fn subscribe_changes(&self) -> Result<Box<dyn NetworkChangeStream>>;
}

/// Stream of network status changes
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait NetworkChangeStream: PlatformSend {
    /// Get the next network info update
    ///
    /// Returns `None` when the stream is closed.
    async fn next(&mut self) -> Option<NetworkInfo>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_network_info() {
        assert!(NetworkInfo::online().is_online());
        assert!(!NetworkInfo::offline().is_online());
        assert_eq!(NetworkInfo::offline().status, NetworkStatus::Disconnected);
    }
}
