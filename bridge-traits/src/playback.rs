//! Playback bridge traits and supporting media-device types.
//!
//! The core playback controller drives a single media-output handle (an HTML
//! `<audio>` element on the web) through the [`MediaDevice`] trait. Devices
//! report lifecycle changes asynchronously as [`DeviceNotification`]s, each
//! tagged with the [`SwitchEpoch`] of the load that produced it so the
//! controller can discard events from superseded track switches.

use crate::{error::Result, platform::PlatformSendSync};
use futures::channel::mpsc;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Monotonic counter identifying one load-and-play attempt.
///
/// Every call to [`MediaDevice::load`] carries a fresh epoch; events emitted
/// by the device afterwards are tagged with it.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct SwitchEpoch(u64);

impl SwitchEpoch {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(self) -> u64 {
        self.0
    }

    /// Returns the epoch that supersedes this one.
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

impl fmt::Display for SwitchEpoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "epoch#{}", self.0)
    }
}

/// Media resource handed to a device: URL plus declared MIME type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MediaSource {
    pub url: String,
    pub mime_type: String,
}

impl MediaSource {
    pub fn new(url: impl Into<String>, mime_type: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            mime_type: mime_type.into(),
        }
    }
}

/// Buffering readiness reported by a device.
///
/// Mirrors the five `HTMLMediaElement.readyState` levels so browser adapters
/// can convert directly.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ReadyState {
    #[default]
    HaveNothing = 0,
    HaveMetadata = 1,
    HaveCurrentData = 2,
    HaveFutureData = 3,
    HaveEnoughData = 4,
}

impl ReadyState {
    /// Convert a raw `readyState` value. Values above 4 saturate.
    pub fn from_level(level: u16) -> Self {
        match level {
            0 => ReadyState::HaveNothing,
            1 => ReadyState::HaveMetadata,
            2 => ReadyState::HaveCurrentData,
            3 => ReadyState::HaveFutureData,
            _ => ReadyState::HaveEnoughData,
        }
    }

    pub fn level(self) -> u16 {
        self as u16
    }
}

/// Point-in-time view of what the device is actually doing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceSnapshot {
    pub paused: bool,
    pub ended: bool,
    pub current_time: Duration,
    pub ready_state: ReadyState,
}

/// Lifecycle events emitted by a media device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceEvent {
    /// Enough data is buffered to start playback of the loaded source.
    ReadyToPlay,
    /// The loaded source played to its end.
    Ended,
    /// Playback position moved.
    TimeAdvanced(Duration),
    /// Total length of the loaded source became known.
    DurationKnown(Duration),
    /// The device started (`true`) or stopped (`false`) producing audio.
    PlayStateChanged(bool),
}

/// A [`DeviceEvent`] tagged with the epoch of the load that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeviceNotification {
    pub epoch: SwitchEpoch,
    pub event: DeviceEvent,
}

impl DeviceNotification {
    pub fn new(epoch: SwitchEpoch, event: DeviceEvent) -> Self {
        Self { epoch, event }
    }
}

/// Sending half used by device implementations to publish notifications.
pub type DeviceEventSender = mpsc::UnboundedSender<DeviceNotification>;

/// Receiving half consumed by the playback controller.
pub type DeviceEventReceiver = mpsc::UnboundedReceiver<DeviceNotification>;

/// Create the channel connecting a device to its controller.
pub fn device_event_channel() -> (DeviceEventSender, DeviceEventReceiver) {
    mpsc::unbounded()
}

/// Single media-output handle driven by the playback controller.
///
/// Implementations must treat `play()` on an already-playing device as a
/// no-op so that concurrent resume requests cannot double-trigger playback.
/// A `play()` refused by the host's autoplay policy must be reported as
/// [`BridgeError::NotAllowed`](crate::error::BridgeError::NotAllowed).
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait MediaDevice: PlatformSendSync {
    /// Replace the current source. Events emitted afterwards carry `epoch`.
    async fn load(&self, epoch: SwitchEpoch, source: &MediaSource) -> Result<()>;

    /// Start or resume playback of the loaded source.
    async fn play(&self) -> Result<()>;

    async fn pause(&self) -> Result<()>;

    /// Jump to an absolute position within the loaded source.
    async fn seek_to(&self, position: Duration) -> Result<()>;

    /// Begin fetching `source` into a cache-warm state without touching the
    /// currently loaded track.
    async fn preload(&self, source: &MediaSource) -> Result<()>;

    /// Inspect current device reality.
    async fn snapshot(&self) -> Result<DeviceSnapshot>;
}
