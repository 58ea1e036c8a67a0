//! # Playback Error Types
//!
//! Error types for continuous playback and the offline asset cache.

use bridge_traits::error::BridgeError;
use thiserror::Error;

/// Errors that can occur during playback and cache operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Device Errors
    // ========================================================================
    /// The host refused to start playback without a user gesture.
    #[error("Playback not allowed: {0}")]
    NotAllowed(String),

    /// Platform media device encountered an error.
    #[error("Media device error: {0}")]
    DeviceError(String),

    // ========================================================================
    // Network / Cache Errors
    // ========================================================================
    /// No response could be obtained for a request.
    #[error("Network error: {0}")]
    Network(String),

    /// Manifest population failed; the generation was not installed.
    #[error("Cache install failed: {0}")]
    InstallFailed(String),

    /// Cache storage operation failed.
    #[error("Cache error: {0}")]
    CacheError(String),

    /// Lifecycle operation attempted from the wrong phase.
    #[error("Invalid cache transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// Configuration rejected by `validate()`.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlaybackError {
    /// Returns `true` if the watchdog or a later attempt can recover.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PlaybackError::DeviceError(_) | PlaybackError::Network(_)
        )
    }

    /// Returns `true` if this error is due to network issues.
    pub fn is_network_error(&self) -> bool {
        matches!(self, PlaybackError::Network(_))
    }
}

impl From<BridgeError> for PlaybackError {
    fn from(error: BridgeError) -> Self {
        match error {
            BridgeError::NotAllowed(msg) => PlaybackError::NotAllowed(msg),
            BridgeError::Network(msg) => PlaybackError::Network(msg),
            other => PlaybackError::DeviceError(other.to_string()),
        }
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bridge_errors_map_to_playback_errors() {
        let not_allowed: PlaybackError = BridgeError::NotAllowed("gesture".into()).into();
        assert!(matches!(not_allowed, PlaybackError::NotAllowed(_)));
        assert!(!not_allowed.is_transient());

        let offline: PlaybackError = BridgeError::Network("offline".into()).into();
        assert!(offline.is_network_error());

        let other: PlaybackError = BridgeError::OperationFailed("boom".into()).into();
        assert!(matches!(other, PlaybackError::DeviceError(_)));
        assert!(other.is_transient());
    }
}
