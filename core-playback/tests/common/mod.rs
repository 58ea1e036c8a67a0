//! Recording media device shared by the controller and watchdog tests.

#![allow(dead_code)]

use bridge_traits::error::{BridgeError, Result};
use bridge_traits::playback::{DeviceSnapshot, MediaDevice, MediaSource, ReadyState, SwitchEpoch};
use core_runtime::events::{CoreEvent, PlaybackEvent, Receiver};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::time::Duration;

/// One call made against the device, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    Load(SwitchEpoch, String),
    Play,
    Pause,
    SeekTo(Duration),
    Preload(String),
    Snapshot,
}

/// Scripted result of the next `play()` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayOutcome {
    Accept,
    NotAllowed,
    Fail,
}

#[derive(Default)]
pub struct RecordingDevice {
    calls: Mutex<Vec<Call>>,
    play_outcomes: Mutex<VecDeque<PlayOutcome>>,
    snapshot: Mutex<Option<DeviceSnapshot>>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue outcomes for upcoming `play()` calls; unqueued calls succeed.
    pub fn script_play(&self, outcomes: impl IntoIterator<Item = PlayOutcome>) {
        self.play_outcomes.lock().extend(outcomes);
    }

    /// Set what `snapshot()` reports. `None` makes it fail.
    pub fn set_snapshot(&self, snapshot: Option<DeviceSnapshot>) {
        *self.snapshot.lock() = snapshot;
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn clear(&self) {
        self.calls.lock().clear();
    }

    pub fn play_count(&self) -> usize {
        self.calls().iter().filter(|c| **c == Call::Play).count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

#[async_trait::async_trait]
impl MediaDevice for RecordingDevice {
    async fn load(&self, epoch: SwitchEpoch, source: &MediaSource) -> Result<()> {
        self.record(Call::Load(epoch, source.url.clone()));
        Ok(())
    }

    async fn play(&self) -> Result<()> {
        self.record(Call::Play);
        let outcome = self
            .play_outcomes
            .lock()
            .pop_front()
            .unwrap_or(PlayOutcome::Accept);
        match outcome {
            PlayOutcome::Accept => Ok(()),
            PlayOutcome::NotAllowed => Err(BridgeError::NotAllowed("NotAllowedError".into())),
            PlayOutcome::Fail => Err(BridgeError::OperationFailed("AbortError".into())),
        }
    }

    async fn pause(&self) -> Result<()> {
        self.record(Call::Pause);
        Ok(())
    }

    async fn seek_to(&self, position: Duration) -> Result<()> {
        self.record(Call::SeekTo(position));
        Ok(())
    }

    async fn preload(&self, source: &MediaSource) -> Result<()> {
        self.record(Call::Preload(source.url.clone()));
        Ok(())
    }

    async fn snapshot(&self) -> Result<DeviceSnapshot> {
        self.record(Call::Snapshot);
        (*self.snapshot.lock())
            .ok_or_else(|| BridgeError::NotAvailable("audio element detached".into()))
    }
}

pub fn playing_snapshot() -> DeviceSnapshot {
    DeviceSnapshot {
        paused: false,
        ended: false,
        current_time: Duration::from_secs(12),
        ready_state: ReadyState::HaveEnoughData,
    }
}

pub fn stalled_snapshot() -> DeviceSnapshot {
    DeviceSnapshot {
        paused: true,
        ..playing_snapshot()
    }
}

/// Drain every playback event currently buffered on `receiver`.
pub fn drain_playback_events(receiver: &mut Receiver<CoreEvent>) -> Vec<PlaybackEvent> {
    let mut events = Vec::new();
    while let Ok(event) = receiver.try_recv() {
        if let CoreEvent::Playback(event) = event {
            events.push(event);
        }
    }
    events
}
