//! Observable playback state exposed to the rendering layer.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Best-known playback state.
///
/// `is_playing` is the controller's intent, updated optimistically before
/// the device confirms. `user_paused` marks a deliberate pause that neither
/// the ready-to-play handler nor the watchdog may undo.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackState {
    pub current_index: usize,
    pub is_playing: bool,
    pub current_time: Duration,
    pub duration: Option<Duration>,
    pub user_paused: bool,
}

impl PlaybackState {
    /// Whether automatic mechanisms (watchdog, ready handler) may resume.
    pub fn wants_audio(&self) -> bool {
        self.is_playing && !self.user_paused
    }

    /// Reset per-track timing after a track switch.
    pub(crate) fn reset_timing(&mut self) {
        self.current_time = Duration::ZERO;
        self.duration = None;
    }
}

/// Where the rendering layer is in bringing up the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoadPhase {
    /// Catalog request in flight.
    #[default]
    Loading,
    /// At least one track is available.
    Ready,
    /// Nothing to play; show "no songs" guidance.
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_pause_blocks_automatic_resume() {
        let mut state = PlaybackState {
            is_playing: true,
            ..Default::default()
        };
        assert!(state.wants_audio());

        state.user_paused = true;
        assert!(!state.wants_audio());
    }

    #[test]
    fn reset_timing_clears_position_and_duration() {
        let mut state = PlaybackState {
            current_time: Duration::from_secs(42),
            duration: Some(Duration::from_secs(90)),
            ..Default::default()
        };
        state.reset_timing();
        assert_eq!(state.current_time, Duration::ZERO);
        assert_eq!(state.duration, None);
    }
}
