//! # Event Bus System
//!
//! Provides an event-driven architecture for the player core using `tokio::sync::broadcast`.
//! This module enables decoupled communication between the playback controller,
//! the offline asset cache, the app shell and any observers (UI, tests, logs).
//!
//! ## Overview
//!
//! The event bus system consists of:
//! - **Event Types**: Strongly-typed enum hierarchies for each domain
//! - **EventBus**: Central broadcast channel for publishing events
//! - **EventStream**: Wrapper for consuming events with filtering
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────┐  emit   ┌───────────┐
//! │ PlaybackController  ├────────>│           │
//! └─────────────────────┘         │           │   subscribe   ┌────────────┐
//! ┌─────────────────────┐  emit   │ EventBus  ├──────────────>│ Rendering  │
//! │ OfflineAssetCache   ├────────>│ (broadcast│               └────────────┘
//! └─────────────────────┘         │  channel) │   subscribe   ┌────────────┐
//! ┌─────────────────────┐  emit   │           ├──────────────>│ Test probe │
//! │ PlayerService       ├────────>│           │               └────────────┘
//! └─────────────────────┘         └───────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let event_bus = EventBus::new(100);
//! let mut stream = event_bus.subscribe();
//!
//! event_bus
//!     .emit(CoreEvent::Playback(PlaybackEvent::Playing { index: 0 }))
//!     .ok();
//!
//! let event = stream.recv().await.unwrap();
//! assert_eq!(event.description(), "Playback started");
//! # }
//! ```
//!
//! ## Error Handling
//!
//! - **`RecvError::Lagged(n)`**: Subscriber was too slow and missed `n` events.
//!   Non-fatal; the subscriber keeps receiving newer events.
//! - **`RecvError::Closed`**: All senders have been dropped. Treat as shutdown.
//!
//! Producers ignore `SendError` (no subscribers): observing is optional.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for the event bus channel.
///
/// Subscribers that can't keep up will receive `RecvError::Lagged`.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Core Event Types
// ============================================================================

/// Top-level event enum encompassing all event categories.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    /// Playback controller and watchdog events
    Playback(PlaybackEvent),
    /// Offline asset cache events
    Cache(CacheEvent),
    /// App shell events (catalog, connectivity, install prompt)
    App(AppEvent),
}

impl CoreEvent {
    /// Returns a human-readable description of the event.
    pub fn description(&self) -> &str {
        match self {
            CoreEvent::Playback(e) => e.description(),
            CoreEvent::Cache(e) => e.description(),
            CoreEvent::App(e) => e.description(),
        }
    }

    /// Returns the severity level of the event.
    pub fn severity(&self) -> EventSeverity {
        match self {
            CoreEvent::Playback(PlaybackEvent::Error {
                recoverable: false, ..
            }) => EventSeverity::Error,
            CoreEvent::Cache(CacheEvent::InstallFailed { .. }) => EventSeverity::Error,
            CoreEvent::Playback(PlaybackEvent::Error { .. }) => EventSeverity::Warning,
            CoreEvent::Playback(PlaybackEvent::StallDetected { .. }) => EventSeverity::Warning,
            CoreEvent::Cache(CacheEvent::FetchFailed { .. }) => EventSeverity::Warning,
            CoreEvent::Playback(PlaybackEvent::TrackChanged { .. }) => EventSeverity::Info,
            CoreEvent::Cache(CacheEvent::Installed { .. }) => EventSeverity::Info,
            CoreEvent::Cache(CacheEvent::Activated { .. }) => EventSeverity::Info,
            CoreEvent::App(AppEvent::CatalogLoaded { .. }) => EventSeverity::Info,
            CoreEvent::App(AppEvent::ConnectivityChanged { .. }) => EventSeverity::Info,
            _ => EventSeverity::Debug,
        }
    }
}

/// Event severity levels for filtering and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EventSeverity {
    /// Debug-level events (verbose)
    Debug,
    /// Informational events
    Info,
    /// Warning events
    Warning,
    /// Error events
    Error,
}

// ============================================================================
// Playback Events
// ============================================================================

/// Events related to continuous playback.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    /// The current track index changed and the device was reloaded.
    TrackChanged {
        /// New index into the catalog.
        index: usize,
        /// Track URL.
        url: String,
        /// Display name derived from the URL.
        title: String,
    },
    /// A play request was issued to the device.
    Playing {
        /// Index of the track being played.
        index: usize,
    },
    /// Playback was paused by the user.
    Paused {
        /// Index of the paused track.
        index: usize,
        /// Position when paused (milliseconds).
        position_ms: u64,
    },
    /// The user moved the playhead.
    Seeked {
        /// New position (milliseconds).
        position_ms: u64,
    },
    /// A track finished playing naturally.
    TrackCompleted {
        /// Index of the track that ended.
        index: usize,
    },
    /// The watchdog found the device silently stopped and issued a resume.
    StallDetected {
        /// Index of the stalled track.
        index: usize,
        /// Device position when the stall was detected (milliseconds).
        position_ms: u64,
        /// Total recoveries issued by this watchdog so far.
        interventions: u64,
    },
    /// The next track was handed to the device for preloading.
    Preloaded {
        /// URL of the preloaded track.
        url: String,
    },
    /// A device call failed. Playback continues in a degraded state.
    Error {
        /// Index of the affected track, if any.
        index: Option<usize>,
        /// Human-readable error message.
        message: String,
        /// Whether the watchdog or a later user action can recover.
        recoverable: bool,
    },
}

impl PlaybackEvent {
    fn description(&self) -> &str {
        match self {
            PlaybackEvent::TrackChanged { .. } => "Track changed",
            PlaybackEvent::Playing { .. } => "Playback started",
            PlaybackEvent::Paused { .. } => "Playback paused",
            PlaybackEvent::Seeked { .. } => "Playback position changed",
            PlaybackEvent::TrackCompleted { .. } => "Track completed",
            PlaybackEvent::StallDetected { .. } => "Playback stall recovered",
            PlaybackEvent::Preloaded { .. } => "Next track preloaded",
            PlaybackEvent::Error { .. } => "Playback error",
        }
    }
}

// ============================================================================
// Offline Cache Events
// ============================================================================

/// Events related to the offline asset cache lifecycle and request serving.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum CacheEvent {
    /// Install started for a cache generation.
    Installing {
        /// Generation (bucket) name.
        generation: String,
        /// Number of manifest entries to fetch.
        manifest_len: usize,
    },
    /// Every manifest entry was fetched and stored.
    Installed {
        /// Generation (bucket) name.
        generation: String,
        /// Number of stored entries.
        entries: usize,
    },
    /// Install aborted; the generation was left absent.
    InstallFailed {
        /// Generation (bucket) name.
        generation: String,
        /// Human-readable error message.
        message: String,
    },
    /// The generation became current and stale buckets were removed.
    Activated {
        /// Generation (bucket) name.
        generation: String,
        /// Names of the deleted buckets.
        purged: Vec<String>,
    },
    /// An intercepted request was answered.
    Served {
        /// Request URL.
        url: String,
        /// `true` if the response came from storage.
        from_cache: bool,
    },
    /// An intercepted request could not be answered from cache or network.
    FetchFailed {
        /// Request URL.
        url: String,
        /// Human-readable error message.
        message: String,
    },
}

impl CacheEvent {
    fn description(&self) -> &str {
        match self {
            CacheEvent::Installing { .. } => "Offline cache installing",
            CacheEvent::Installed { .. } => "Offline cache installed",
            CacheEvent::InstallFailed { .. } => "Offline cache install failed",
            CacheEvent::Activated { .. } => "Offline cache activated",
            CacheEvent::Served { .. } => "Request served",
            CacheEvent::FetchFailed { .. } => "Request failed",
        }
    }
}

// ============================================================================
// App Shell Events
// ============================================================================

/// Events related to the surrounding app shell.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum AppEvent {
    /// The catalog finished loading.
    CatalogLoaded {
        /// Number of tracks in the catalog.
        track_count: usize,
        /// `true` if the configured fallback tracks were used.
        from_fallback: bool,
    },
    /// The device went online or offline.
    ConnectivityChanged {
        /// Current connectivity.
        online: bool,
    },
    /// The host captured an install prompt that can be shown.
    InstallPromptAvailable,
    /// The user answered the install prompt.
    InstallPromptResolved {
        /// Whether the user accepted.
        accepted: bool,
    },
}

impl AppEvent {
    fn description(&self) -> &str {
        match self {
            AppEvent::CatalogLoaded { .. } => "Catalog loaded",
            AppEvent::ConnectivityChanged { .. } => "Connectivity changed",
            AppEvent::InstallPromptAvailable => "Install prompt available",
            AppEvent::InstallPromptResolved { .. } => "Install prompt resolved",
        }
    }
}

// ============================================================================
// Event Bus
// ============================================================================

/// Central event bus for publishing and subscribing to events.
///
/// Uses `tokio::sync::broadcast` internally, which provides:
/// - Multiple producers (clone the `EventBus`)
/// - Multiple consumers (each `subscribe()` creates a new receiver)
/// - Non-blocking sends (events are cloned for each subscriber)
/// - Lagging detection (slow subscribers get `RecvError::Lagged`)
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    /// Creates a new event bus with the specified buffer size.
    ///
    /// # Arguments
    ///
    /// * `capacity` - Maximum number of events to buffer per subscriber.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Publishes an event to all subscribers.
    ///
    /// Returns the number of subscribers that received the event, or an error
    /// if there are no active subscribers.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Creates a new subscriber to receive events.
    ///
    /// Past events are not replayed.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ============================================================================
// Event Stream Wrapper
// ============================================================================

/// Type alias for event filter functions.
type EventFilter = Box<dyn Fn(&CoreEvent) -> bool + Send + Sync>;

/// A wrapper around `broadcast::Receiver` with filtering.
///
/// # Example
///
/// ```rust
/// use core_runtime::events::{CoreEvent, EventBus, EventStream};
///
/// let event_bus = EventBus::new(100);
/// let cache_only = EventStream::new(event_bus.subscribe())
///     .filter(|event| matches!(event, CoreEvent::Cache(_)));
/// ```
pub struct EventStream {
    receiver: Receiver<CoreEvent>,
    filter: Option<EventFilter>,
}

impl EventStream {
    /// Creates a new event stream from a receiver.
    pub fn new(receiver: Receiver<CoreEvent>) -> Self {
        Self {
            receiver,
            filter: None,
        }
    }

    /// Only events matching `predicate` will be returned.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&CoreEvent) -> bool + Send + Sync + 'static,
    {
        self.filter = Some(Box::new(predicate));
        self
    }

    /// Receives the next event that passes the filter (if any).
    ///
    /// # Errors
    ///
    /// Returns `RecvError::Lagged(n)` if the subscriber fell behind by `n` events.
    /// Returns `RecvError::Closed` if all senders have been dropped.
    pub async fn recv(&mut self) -> Result<CoreEvent, RecvError> {
        loop {
            let event = self.receiver.recv().await?;
            if self.accepts(&event) {
                return Ok(event);
            }
        }
    }

    /// Attempts to receive an event without blocking.
    ///
    /// Returns `None` if no matching events are currently available.
    pub fn try_recv(&mut self) -> Option<Result<CoreEvent, RecvError>> {
        loop {
            match self.receiver.try_recv() {
                Ok(event) => {
                    if self.accepts(&event) {
                        return Some(Ok(event));
                    }
                }
                Err(broadcast::error::TryRecvError::Empty) => return None,
                Err(broadcast::error::TryRecvError::Lagged(n)) => {
                    return Some(Err(RecvError::Lagged(n)))
                }
                Err(broadcast::error::TryRecvError::Closed) => return Some(Err(RecvError::Closed)),
            }
        }
    }

    fn accepts(&self, event: &CoreEvent) -> bool {
        self.filter.as_ref().map_or(true, |filter| filter(event))
    }
}

impl fmt::Debug for EventStream {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventStream")
            .field("has_filter", &self.filter.is_some())
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn track_changed(index: usize) -> CoreEvent {
        CoreEvent::Playback(PlaybackEvent::TrackChanged {
            index,
            url: format!("/songs/{index}.mp3"),
            title: index.to_string(),
        })
    }

    #[tokio::test]
    async fn test_event_emission_no_subscribers() {
        let bus = EventBus::default();
        assert!(bus.emit(track_changed(0)).is_err());
    }

    #[tokio::test]
    async fn test_multiple_subscribers_receive_same_event() {
        let bus = EventBus::new(10);
        let mut first = bus.subscribe();
        let mut second = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        assert_eq!(bus.emit(track_changed(1)).unwrap(), 2);
        assert_eq!(first.recv().await.unwrap(), track_changed(1));
        assert_eq!(second.recv().await.unwrap(), track_changed(1));
    }

    #[tokio::test]
    async fn test_event_stream_with_filter() {
        let bus = EventBus::new(10);
        let mut stream = EventStream::new(bus.subscribe())
            .filter(|event| matches!(event, CoreEvent::Cache(_)));

        bus.emit(track_changed(0)).unwrap();
        bus.emit(CoreEvent::Cache(CacheEvent::Served {
            url: "/index.html".to_string(),
            from_cache: true,
        }))
        .unwrap();

        let event = stream.recv().await.unwrap();
        assert!(matches!(
            event,
            CoreEvent::Cache(CacheEvent::Served {
                from_cache: true,
                ..
            })
        ));
        assert!(stream.try_recv().is_none());
    }

    #[tokio::test]
    async fn test_lagged_subscriber() {
        let bus = EventBus::new(2);
        let mut sub = bus.subscribe();
        for i in 0..5 {
            bus.emit(track_changed(i)).unwrap();
        }
        assert!(matches!(sub.recv().await, Err(RecvError::Lagged(_))));
    }

    #[test]
    fn test_event_severity() {
        let fatal = CoreEvent::Playback(PlaybackEvent::Error {
            index: None,
            message: "device gone".to_string(),
            recoverable: false,
        });
        assert_eq!(fatal.severity(), EventSeverity::Error);

        let stall = CoreEvent::Playback(PlaybackEvent::StallDetected {
            index: 0,
            position_ms: 1200,
            interventions: 1,
        });
        assert_eq!(stall.severity(), EventSeverity::Warning);

        let activated = CoreEvent::Cache(CacheEvent::Activated {
            generation: "baby-song-cache-v1".to_string(),
            purged: vec![],
        });
        assert_eq!(activated.severity(), EventSeverity::Info);

        let seek = CoreEvent::Playback(PlaybackEvent::Seeked { position_ms: 10 });
        assert_eq!(seek.severity(), EventSeverity::Debug);
    }

    #[test]
    fn test_event_description() {
        assert_eq!(track_changed(0).description(), "Track changed");
        assert_eq!(
            CoreEvent::App(AppEvent::InstallPromptAvailable).description(),
            "Install prompt available"
        );
    }

    #[test]
    fn test_event_serialization() {
        let event = CoreEvent::App(AppEvent::ConnectivityChanged { online: false });
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "App");
        assert_eq!(json["payload"]["event"], "ConnectivityChanged");
        assert_eq!(json["payload"]["online"], false);

        let back: CoreEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}
