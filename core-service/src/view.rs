//! Serializable snapshot of everything the player UI renders.

use core_playback::{format_duration, progress_percent, LoadPhase, PlaybackState, Track};
use serde::{Deserialize, Serialize};

/// One frame of player UI state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerView {
    pub phase: LoadPhase,
    pub track_count: usize,
    pub current_index: usize,
    /// Display name of the current track, `None` when nothing is loaded.
    pub title: Option<String>,
    pub is_playing: bool,
    pub elapsed: String,
    pub duration: String,
    /// `0.0..=100.0`
    pub progress: f64,
    pub online: bool,
    pub can_install: bool,
}

impl PlayerView {
    pub(crate) fn compose(
        phase: LoadPhase,
        track_count: usize,
        state: &PlaybackState,
        track: Option<&Track>,
        online: bool,
        can_install: bool,
    ) -> Self {
        Self {
            phase,
            track_count,
            current_index: state.current_index,
            title: track.map(|t| t.title().to_string()),
            is_playing: state.is_playing,
            elapsed: format_duration(Some(state.current_time)),
            duration: format_duration(state.duration),
            progress: progress_percent(state.current_time, state.duration),
            online,
            can_install,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_compose_formats_times() {
        let state = PlaybackState {
            current_index: 1,
            is_playing: true,
            current_time: Duration::from_secs(75),
            duration: Some(Duration::from_secs(300)),
            user_paused: false,
        };
        let track = Track::new("/songs/thaththa1.m4a");

        let view = PlayerView::compose(LoadPhase::Ready, 2, &state, Some(&track), true, false);

        assert_eq!(view.title.as_deref(), Some("thaththa1"));
        assert_eq!(view.elapsed, "01:15");
        assert_eq!(view.duration, "05:00");
        assert_eq!(view.progress, 25.0);
    }

    #[test]
    fn test_unknown_duration_renders_zero() {
        let view = PlayerView::compose(
            LoadPhase::Empty,
            0,
            &PlaybackState::default(),
            None,
            false,
            false,
        );

        assert_eq!(view.title, None);
        assert_eq!(view.duration, "00:00");
        assert_eq!(view.progress, 0.0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let view = PlayerView::compose(
            LoadPhase::Loading,
            0,
            &PlaybackState::default(),
            None,
            true,
            true,
        );
        let json = serde_json::to_value(&view).unwrap();

        assert_eq!(json["phase"], "loading");
        assert_eq!(json["canInstall"], true);
        assert_eq!(json["trackCount"], 0);
    }
}
