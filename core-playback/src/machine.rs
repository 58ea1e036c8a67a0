//! # Playback State Machine
//!
//! Pure transition logic for continuous playback.
//!
//! ## Overview
//!
//! Every input (user intent, device notification, watchdog check) is a
//! method on [`PlaybackMachine`] that mutates [`PlaybackState`] and returns
//! the [`Command`]s the caller must execute against the media device. The
//! machine never performs I/O, so its timing rules are testable without a
//! device or a runtime.
//!
//! ## Track switches
//!
//! Every index change (skip, auto-advance on `Ended`, catalog load) bumps
//! the [`SwitchEpoch`] and emits a [`Command::Load`] tagged with it. Device
//! notifications carrying an older epoch are discarded, so a burst of skips
//! only ever resumes the last selected track.

use bridge_traits::playback::{
    DeviceEvent, DeviceNotification, DeviceSnapshot, MediaSource, ReadyState, SwitchEpoch,
};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::PlayerConfig;
use crate::preloader::Preloader;
use crate::state::PlaybackState;
use crate::track::{Catalog, Track};

/// Why a play command was issued.
///
/// Decides how a rejected `play()` affects the `is_playing` intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayReason {
    /// Best-effort start right after the catalog loaded.
    Autoplay,
    /// The user pressed play.
    User,
    /// The loaded track reported it can play.
    TrackReady,
    /// The watchdog found the device silently stopped.
    Recovery,
}

/// Side effect requested by a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Load {
        epoch: SwitchEpoch,
        source: MediaSource,
    },
    Play {
        epoch: SwitchEpoch,
        reason: PlayReason,
    },
    Pause,
    SeekTo(Duration),
    Preload(MediaSource),
}

/// Seek request from the rendering layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SeekTarget {
    /// Normalized position in `0.0..=1.0` against the known duration.
    Fraction(f64),
    /// Absolute position.
    Position(Duration),
}

/// Outcome of one stall check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WatchdogVerdict {
    /// Playback is not wanted (paused by user, stopped, or nothing loaded).
    Disarmed,
    /// Device reality matches the playing intent.
    Healthy,
    /// Device stopped producing audio while playback is wanted.
    Stalled,
    /// The device could not be inspected; nothing was done.
    Unavailable,
}

/// Pure continuous-playback state machine.
#[derive(Debug, Clone)]
pub struct PlaybackMachine {
    catalog: Catalog,
    state: PlaybackState,
    epoch: SwitchEpoch,
    autoplay: bool,
    preload_next: bool,
    readiness_threshold: ReadyState,
    /// Set when the host refused autoplay; cleared by the next user intent.
    awaiting_gesture: bool,
}

impl PlaybackMachine {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            catalog: Catalog::default(),
            state: PlaybackState::default(),
            epoch: SwitchEpoch::default(),
            autoplay: config.autoplay,
            preload_next: config.preload_next,
            readiness_threshold: config.readiness_threshold,
            awaiting_gesture: false,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Epoch of the most recent load.
    pub fn epoch(&self) -> SwitchEpoch {
        self.epoch
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.catalog.get(self.state.current_index)
    }

    /// Whether autoplay was refused and playback now waits for the user.
    ///
    /// While set, `ReadyToPlay` does not issue another play.
    pub fn awaiting_gesture(&self) -> bool {
        self.awaiting_gesture
    }

    /// Replace the catalog and restart from the first track.
    ///
    /// With autoplay enabled the first track is played optimistically; a
    /// rejection is reported through [`Self::play_rejected`]. With autoplay
    /// disabled the catalog loads held, as if the user had paused.
    pub fn load_catalog(&mut self, catalog: Catalog) -> Vec<Command> {
        self.catalog = catalog;
        self.awaiting_gesture = false;
        self.state = PlaybackState {
            user_paused: !self.autoplay,
            ..PlaybackState::default()
        };

        let mut commands = self.switch_track(0);
        if self.autoplay && !commands.is_empty() {
            self.state.is_playing = true;
            commands.push(Command::Play {
                epoch: self.epoch,
                reason: PlayReason::Autoplay,
            });
        }
        commands
    }

    /// Pause when playing, otherwise resume.
    pub fn toggle_play_pause(&mut self) -> Vec<Command> {
        if self.state.is_playing {
            self.state.user_paused = true;
            self.state.is_playing = false;
            return vec![Command::Pause];
        }

        if self.catalog.is_empty() {
            return Vec::new();
        }

        self.state.user_paused = false;
        self.state.is_playing = true;
        self.awaiting_gesture = false;
        vec![Command::Play {
            epoch: self.epoch,
            reason: PlayReason::User,
        }]
    }

    pub fn skip_next(&mut self) -> Vec<Command> {
        self.awaiting_gesture = false;
        match self.catalog.next_index(self.state.current_index) {
            Some(index) => self.switch_track(index),
            None => Vec::new(),
        }
    }

    pub fn skip_previous(&mut self) -> Vec<Command> {
        self.awaiting_gesture = false;
        match self.catalog.previous_index(self.state.current_index) {
            Some(index) => self.switch_track(index),
            None => Vec::new(),
        }
    }

    /// Move the playhead. The new position is visible in the state before
    /// the device confirms.
    ///
    /// A fraction needs a known duration; without one the request is
    /// ignored. Positions are clamped to the known duration.
    pub fn seek(&mut self, target: SeekTarget) -> Vec<Command> {
        if self.catalog.is_empty() {
            return Vec::new();
        }

        let position = match (target, self.state.duration) {
            (SeekTarget::Fraction(fraction), Some(duration)) if fraction.is_finite() => {
                duration.mul_f64(fraction.clamp(0.0, 1.0))
            }
            (SeekTarget::Fraction(_), _) => return Vec::new(),
            (SeekTarget::Position(position), Some(duration)) => position.min(duration),
            (SeekTarget::Position(position), None) => position,
        };

        self.state.current_time = position;
        vec![Command::SeekTo(position)]
    }

    /// React to a device notification.
    ///
    /// Returns `None` when the notification belongs to a superseded load.
    pub fn on_device_event(&mut self, notification: DeviceNotification) -> Option<Vec<Command>> {
        if notification.epoch != self.epoch {
            return None;
        }

        let commands = match notification.event {
            DeviceEvent::Ended => self.skip_next(),
            DeviceEvent::ReadyToPlay => self.on_ready(),
            DeviceEvent::TimeAdvanced(position) => {
                self.state.current_time = position;
                Vec::new()
            }
            DeviceEvent::DurationKnown(duration) => {
                self.state.duration = Some(duration);
                Vec::new()
            }
            DeviceEvent::PlayStateChanged(true) => {
                self.state.is_playing = true;
                self.state.user_paused = false;
                self.awaiting_gesture = false;
                Vec::new()
            }
            DeviceEvent::PlayStateChanged(false) => {
                // A device-side pause is not a user pause: the watchdog stays
                // free to recover once intent is restored.
                self.state.is_playing = false;
                Vec::new()
            }
        };
        Some(commands)
    }

    /// Record that a `play()` issued under `epoch` was refused.
    ///
    /// Returns `false` if the epoch is stale and nothing changed.
    pub fn play_rejected(&mut self, epoch: SwitchEpoch, reason: PlayReason, not_allowed: bool) -> bool {
        if epoch != self.epoch {
            return false;
        }

        // Ready and recovery failures keep the intent so the next watchdog
        // tick retries; policy refusals and explicit requests do not.
        if not_allowed || matches!(reason, PlayReason::Autoplay | PlayReason::User) {
            self.state.is_playing = false;
        }
        if not_allowed && reason == PlayReason::Autoplay {
            self.awaiting_gesture = true;
        }
        true
    }

    /// Whether the watchdog should inspect the device at all.
    pub fn watchdog_armed(&self) -> bool {
        self.state.wants_audio() && !self.catalog.is_empty()
    }

    /// Compare the playing intent against device reality.
    pub fn check_stall(&self, snapshot: &DeviceSnapshot) -> WatchdogVerdict {
        if !self.watchdog_armed() {
            return WatchdogVerdict::Disarmed;
        }

        let healthy = !snapshot.paused
            && snapshot.current_time > Duration::ZERO
            && !snapshot.ended
            && snapshot.ready_state >= self.readiness_threshold;

        if healthy {
            WatchdogVerdict::Healthy
        } else {
            WatchdogVerdict::Stalled
        }
    }

    /// Commands that resume a stalled device. Empty when disarmed.
    pub fn recover(&self) -> Vec<Command> {
        if !self.watchdog_armed() {
            return Vec::new();
        }
        vec![Command::Play {
            epoch: self.epoch,
            reason: PlayReason::Recovery,
        }]
    }

    fn on_ready(&mut self) -> Vec<Command> {
        if self.state.user_paused || self.awaiting_gesture {
            return Vec::new();
        }

        self.state.is_playing = true;
        let mut commands = vec![Command::Play {
            epoch: self.epoch,
            reason: PlayReason::TrackReady,
        }];

        if self.preload_next {
            if let Some(next) = Preloader::next_source(&self.catalog, self.state.current_index) {
                commands.push(Command::Preload(next));
            }
        }
        commands
    }

    fn switch_track(&mut self, index: usize) -> Vec<Command> {
        let Some(track) = self.catalog.get(index) else {
            return Vec::new();
        };
        let source = track.source();

        self.state.current_index = index;
        self.state.reset_timing();
        self.epoch = self.epoch.next();

        vec![Command::Load {
            epoch: self.epoch,
            source,
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn machine_with(urls: &[&str]) -> PlaybackMachine {
        let mut machine = PlaybackMachine::new(&PlayerConfig::default());
        machine.load_catalog(Catalog::from_urls(urls.iter().copied()));
        machine
    }

    fn notify(machine: &PlaybackMachine, event: DeviceEvent) -> DeviceNotification {
        DeviceNotification::new(machine.epoch(), event)
    }

    fn healthy_snapshot() -> DeviceSnapshot {
        DeviceSnapshot {
            paused: false,
            ended: false,
            current_time: Duration::from_secs(3),
            ready_state: ReadyState::HaveEnoughData,
        }
    }

    #[test]
    fn load_catalog_loads_first_track_and_autoplays() {
        let mut machine = PlaybackMachine::new(&PlayerConfig::default());
        let commands = machine.load_catalog(Catalog::from_urls(["/a.mp3", "/b.m4a"]));

        let epoch = machine.epoch();
        assert_eq!(
            commands,
            vec![
                Command::Load {
                    epoch,
                    source: MediaSource::new("/a.mp3", "audio/mpeg"),
                },
                Command::Play {
                    epoch,
                    reason: PlayReason::Autoplay,
                },
            ]
        );
        assert!(machine.state().is_playing);
        assert_eq!(machine.state().current_index, 0);
    }

    #[test]
    fn empty_catalog_is_inert() {
        let mut machine = machine_with(&[]);
        assert!(!machine.state().is_playing);
        assert!(machine.skip_next().is_empty());
        assert!(machine.skip_previous().is_empty());
        assert!(machine.toggle_play_pause().is_empty());
        assert!(machine.seek(SeekTarget::Fraction(0.5)).is_empty());
        assert_eq!(machine.check_stall(&DeviceSnapshot::default()), WatchdogVerdict::Disarmed);
    }

    #[test]
    fn autoplay_disabled_loads_held() {
        let mut machine = PlaybackMachine::new(&PlayerConfig::default().with_autoplay(false));
        let commands = machine.load_catalog(Catalog::from_urls(["/a.mp3"]));
        assert_eq!(commands.len(), 1);
        assert!(machine.state().user_paused);

        let ready = notify(&machine, DeviceEvent::ReadyToPlay);
        assert_eq!(machine.on_device_event(ready), Some(Vec::new()));
        assert!(!machine.state().is_playing);
    }

    #[test]
    fn toggle_pauses_then_resumes() {
        let mut machine = machine_with(&["/a.mp3"]);

        assert_eq!(machine.toggle_play_pause(), vec![Command::Pause]);
        assert!(machine.state().user_paused);
        assert!(!machine.state().is_playing);

        let commands = machine.toggle_play_pause();
        assert_eq!(
            commands,
            vec![Command::Play {
                epoch: machine.epoch(),
                reason: PlayReason::User,
            }]
        );
        assert!(!machine.state().user_paused);
        assert!(machine.state().is_playing);
    }

    #[test]
    fn ended_advances_and_ready_resumes_with_wraparound_preload() {
        let mut machine = machine_with(&["/A.mp3", "/B.m4a"]);
        let ended = notify(&machine, DeviceEvent::Ended);
        let commands = machine.on_device_event(ended).unwrap();

        assert_eq!(machine.state().current_index, 1);
        assert_eq!(
            commands,
            vec![Command::Load {
                epoch: machine.epoch(),
                source: MediaSource::new("/B.m4a", "audio/mp4"),
            }]
        );

        let ready = notify(&machine, DeviceEvent::ReadyToPlay);
        let commands = machine.on_device_event(ready).unwrap();
        assert!(machine.state().is_playing);
        assert_eq!(
            commands,
            vec![
                Command::Play {
                    epoch: machine.epoch(),
                    reason: PlayReason::TrackReady,
                },
                Command::Preload(MediaSource::new("/A.mp3", "audio/mpeg")),
            ]
        );
    }

    #[test]
    fn single_track_catalog_never_preloads() {
        let mut machine = machine_with(&["/only.mp3"]);
        let ready = notify(&machine, DeviceEvent::ReadyToPlay);
        let commands = machine.on_device_event(ready).unwrap();
        assert!(!commands.iter().any(|c| matches!(c, Command::Preload(_))));
    }

    #[test]
    fn stale_events_are_discarded() {
        let mut machine = machine_with(&["/a.mp3", "/b.mp3", "/c.mp3"]);
        let stale_epoch = machine.epoch();
        machine.skip_next();
        machine.skip_next();

        let stale_ended = DeviceNotification::new(stale_epoch, DeviceEvent::Ended);
        assert_eq!(machine.on_device_event(stale_ended), None);
        assert_eq!(machine.state().current_index, 2);

        let stale_time =
            DeviceNotification::new(stale_epoch, DeviceEvent::TimeAdvanced(Duration::from_secs(9)));
        assert_eq!(machine.on_device_event(stale_time), None);
        assert_eq!(machine.state().current_time, Duration::ZERO);
    }

    #[test]
    fn user_pause_survives_ready_and_watchdog() {
        let mut machine = machine_with(&["/a.mp3", "/b.mp3"]);
        machine.toggle_play_pause();
        machine.skip_next();

        let ready = notify(&machine, DeviceEvent::ReadyToPlay);
        assert_eq!(machine.on_device_event(ready), Some(Vec::new()));

        let stalled = DeviceSnapshot {
            paused: true,
            ..healthy_snapshot()
        };
        assert_eq!(machine.check_stall(&stalled), WatchdogVerdict::Disarmed);
        assert!(machine.recover().is_empty());
    }

    #[test]
    fn seek_maps_fraction_against_duration() {
        let mut machine = machine_with(&["/a.mp3"]);
        assert!(machine.seek(SeekTarget::Fraction(0.5)).is_empty());

        let known = notify(&machine, DeviceEvent::DurationKnown(Duration::from_secs(200)));
        machine.on_device_event(known);

        assert_eq!(
            machine.seek(SeekTarget::Fraction(0.25)),
            vec![Command::SeekTo(Duration::from_secs(50))]
        );
        assert_eq!(machine.state().current_time, Duration::from_secs(50));

        assert_eq!(
            machine.seek(SeekTarget::Fraction(1.7)),
            vec![Command::SeekTo(Duration::from_secs(200))]
        );
        assert!(machine.seek(SeekTarget::Fraction(f64::NAN)).is_empty());
        assert_eq!(
            machine.seek(SeekTarget::Position(Duration::from_secs(500))),
            vec![Command::SeekTo(Duration::from_secs(200))]
        );
    }

    #[test]
    fn device_play_state_tracks_reality() {
        let mut machine = machine_with(&["/a.mp3"]);
        machine.on_device_event(notify(&machine, DeviceEvent::PlayStateChanged(false)));
        assert!(!machine.state().is_playing);
        assert!(!machine.state().user_paused);

        machine.on_device_event(notify(&machine, DeviceEvent::PlayStateChanged(true)));
        assert!(machine.state().is_playing);
    }

    #[test]
    fn play_rejection_policy() {
        let mut machine = machine_with(&["/a.mp3"]);
        let epoch = machine.epoch();

        assert!(machine.play_rejected(epoch, PlayReason::Recovery, false));
        assert!(machine.state().is_playing);

        assert!(machine.play_rejected(epoch, PlayReason::Autoplay, true));
        assert!(!machine.state().is_playing);

        machine.toggle_play_pause();
        assert!(!machine.play_rejected(epoch.next().next(), PlayReason::User, false));
        assert!(machine.state().is_playing);
    }

    #[test]
    fn refused_autoplay_holds_until_user_plays() {
        let mut machine = machine_with(&["/a.mp3", "/b.mp3"]);
        let epoch = machine.epoch();

        assert!(machine.play_rejected(epoch, PlayReason::Autoplay, true));
        assert!(machine.awaiting_gesture());

        let ready = notify(&machine, DeviceEvent::ReadyToPlay);
        assert_eq!(machine.on_device_event(ready), Some(Vec::new()));
        assert!(!machine.state().is_playing);
        assert!(!machine.watchdog_armed());

        let commands = machine.toggle_play_pause();
        assert_eq!(
            commands,
            vec![Command::Play {
                epoch,
                reason: PlayReason::User,
            }]
        );
        assert!(!machine.awaiting_gesture());
    }

    #[test]
    fn watchdog_verdicts() {
        let machine = machine_with(&["/a.mp3"]);
        assert_eq!(machine.check_stall(&healthy_snapshot()), WatchdogVerdict::Healthy);

        let buffering = DeviceSnapshot {
            ready_state: ReadyState::HaveCurrentData,
            ..healthy_snapshot()
        };
        assert_eq!(machine.check_stall(&buffering), WatchdogVerdict::Stalled);

        let not_started = DeviceSnapshot {
            current_time: Duration::ZERO,
            ..healthy_snapshot()
        };
        assert_eq!(machine.check_stall(&not_started), WatchdogVerdict::Stalled);

        let ended = DeviceSnapshot {
            ended: true,
            ..healthy_snapshot()
        };
        assert_eq!(machine.check_stall(&ended), WatchdogVerdict::Stalled);
        assert_eq!(machine.recover().len(), 1);
    }
}
