//! # Player Configuration
//!
//! Tunables for the continuous-playback controller and stall watchdog.

use bridge_traits::playback::ReadyState;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Player configuration.
///
/// Controls autoplay, preloading, the stall watchdog and the catalog used
/// when the provider returns nothing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Interval between two stall checks.
    ///
    /// Default: 5 seconds.
    #[serde(default = "default_watchdog_interval")]
    pub watchdog_interval: Duration,

    /// Minimum device readiness the watchdog treats as "sufficiently buffered".
    ///
    /// Default: `HaveFutureData` (strictly above "current data").
    #[serde(default = "default_readiness_threshold")]
    pub readiness_threshold: ReadyState,

    /// Start playing as soon as a catalog is loaded.
    ///
    /// Default: true.
    #[serde(default = "default_true")]
    pub autoplay: bool,

    /// Prime the next track whenever the current one becomes ready.
    ///
    /// Default: true.
    #[serde(default = "default_true")]
    pub preload_next: bool,

    /// Tracks used when the catalog provider fails or returns nothing.
    #[serde(default = "default_fallback_tracks")]
    pub fallback_tracks: Vec<String>,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            watchdog_interval: default_watchdog_interval(),
            readiness_threshold: default_readiness_threshold(),
            autoplay: true,
            preload_next: true,
            fallback_tracks: default_fallback_tracks(),
        }
    }
}

impl PlayerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the stall check interval.
    pub fn with_watchdog_interval(mut self, interval: Duration) -> Self {
        self.watchdog_interval = interval;
        self
    }

    /// Set the readiness level required for a healthy watchdog check.
    pub fn with_readiness_threshold(mut self, threshold: ReadyState) -> Self {
        self.readiness_threshold = threshold;
        self
    }

    /// Enable or disable autoplay on catalog load.
    pub fn with_autoplay(mut self, enabled: bool) -> Self {
        self.autoplay = enabled;
        self
    }

    /// Enable or disable preloading of the next track.
    pub fn with_preload_next(mut self, enabled: bool) -> Self {
        self.preload_next = enabled;
        self
    }

    /// Replace the fallback track list.
    pub fn with_fallback_tracks<I, S>(mut self, tracks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.fallback_tracks = tracks.into_iter().map(Into::into).collect();
        self
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), String> {
        if self.watchdog_interval.is_zero() {
            return Err("watchdog_interval must be > 0".to_string());
        }

        if self.fallback_tracks.iter().any(|track| track.is_empty()) {
            return Err("fallback_tracks cannot contain empty entries".to_string());
        }

        Ok(())
    }
}

// ============================================================================
// Default Functions (for serde)
// ============================================================================

fn default_watchdog_interval() -> Duration {
    Duration::from_secs(5)
}

fn default_readiness_threshold() -> ReadyState {
    ReadyState::HaveFutureData
}

fn default_true() -> bool {
    true
}

fn default_fallback_tracks() -> Vec<String> {
    vec![
        "/songs/amma1.mp3".to_string(),
        "/songs/thaththa1.m4a".to_string(),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PlayerConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.watchdog_interval, Duration::from_secs(5));
        assert_eq!(config.readiness_threshold, ReadyState::HaveFutureData);
        assert!(config.autoplay);
        assert!(config.preload_next);
        assert_eq!(config.fallback_tracks.len(), 2);
    }

    #[test]
    fn test_config_builder() {
        let config = PlayerConfig::new()
            .with_watchdog_interval(Duration::from_secs(1))
            .with_readiness_threshold(ReadyState::HaveEnoughData)
            .with_autoplay(false)
            .with_preload_next(false)
            .with_fallback_tracks(["/a.mp3"]);

        assert_eq!(config.watchdog_interval, Duration::from_secs(1));
        assert_eq!(config.readiness_threshold, ReadyState::HaveEnoughData);
        assert!(!config.autoplay);
        assert!(!config.preload_next);
        assert_eq!(config.fallback_tracks, vec!["/a.mp3".to_string()]);
    }

    #[test]
    fn test_config_validation() {
        let zero_interval = PlayerConfig::default().with_watchdog_interval(Duration::ZERO);
        assert!(zero_interval.validate().is_err());

        let blank_fallback = PlayerConfig::default().with_fallback_tracks([""]);
        assert!(blank_fallback.validate().is_err());

        let no_fallback = PlayerConfig::default().with_fallback_tracks(Vec::<String>::new());
        assert!(no_fallback.validate().is_ok());
    }

    #[test]
    fn test_missing_fields_use_defaults() {
        let config: PlayerConfig = serde_json::from_str(r#"{"autoplay": false}"#).unwrap();
        assert!(!config.autoplay);
        assert_eq!(config.watchdog_interval, Duration::from_secs(5));
        assert_eq!(config.fallback_tracks.len(), 2);
    }
}
