//! # Continuous-Playback Controller
//!
//! Owns the [`PlaybackMachine`] and executes the commands it produces
//! against a [`MediaDevice`].
//!
//! ## Overview
//!
//! The controller is the only component that touches the device. User
//! intents, device notifications and watchdog ticks all go through the
//! same path:
//!
//! 1. lock the machine, apply the transition, collect commands, unlock
//! 2. run each command against the device
//! 3. log failures and publish them as [`PlaybackEvent::Error`]
//!
//! Device failures never propagate to callers. The machine lock is never
//! held across an `.await`.

use bridge_traits::playback::{
    DeviceEvent, DeviceEventReceiver, DeviceNotification, MediaDevice, SwitchEpoch,
};
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use futures::StreamExt;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, instrument, warn};

use crate::config::PlayerConfig;
use crate::machine::{Command, PlayReason, PlaybackMachine, SeekTarget, WatchdogVerdict};
use crate::preloader::Preloader;
use crate::state::PlaybackState;
use crate::track::{display_name, Catalog, Track};

/// Continuous-playback controller.
pub struct PlaybackController {
    machine: Mutex<PlaybackMachine>,
    device: Arc<dyn MediaDevice>,
    preloader: Preloader,
    event_bus: Option<Arc<EventBus>>,
    interventions: AtomicU64,
}

impl PlaybackController {
    pub fn new(config: &PlayerConfig, device: Arc<dyn MediaDevice>) -> Self {
        Self {
            machine: Mutex::new(PlaybackMachine::new(config)),
            preloader: Preloader::new(Arc::clone(&device)),
            device,
            event_bus: None,
            interventions: AtomicU64::new(0),
        }
    }

    /// Set event bus for playback events.
    pub fn with_event_bus(mut self, event_bus: Arc<EventBus>) -> Self {
        self.event_bus = Some(event_bus);
        self
    }

    // ========================================================================
    // Read accessors
    // ========================================================================

    pub fn state(&self) -> PlaybackState {
        self.machine.lock().state()
    }

    pub fn current_track(&self) -> Option<Track> {
        self.machine.lock().current_track().cloned()
    }

    pub fn catalog(&self) -> Catalog {
        self.machine.lock().catalog().clone()
    }

    /// Epoch of the most recent track load.
    pub fn epoch(&self) -> SwitchEpoch {
        self.machine.lock().epoch()
    }

    /// Number of stall recoveries issued so far.
    pub fn interventions(&self) -> u64 {
        self.interventions.load(Ordering::Relaxed)
    }

    // ========================================================================
    // User intents
    // ========================================================================

    /// Replace the catalog, load the first track and attempt autoplay.
    #[instrument(skip(self, catalog), fields(tracks = catalog.len()))]
    pub async fn load_catalog(&self, catalog: Catalog) {
        self.preloader.reset();
        let commands = { self.machine.lock().load_catalog(catalog) };
        if commands.is_empty() {
            info!("Catalog is empty, nothing to play");
        }
        self.execute(commands).await;
    }

    #[instrument(skip(self))]
    pub async fn toggle_play_pause(&self) {
        let commands = { self.machine.lock().toggle_play_pause() };
        self.execute(commands).await;
    }

    #[instrument(skip(self))]
    pub async fn skip_next(&self) {
        let commands = { self.machine.lock().skip_next() };
        self.execute(commands).await;
    }

    #[instrument(skip(self))]
    pub async fn skip_previous(&self) {
        let commands = { self.machine.lock().skip_previous() };
        self.execute(commands).await;
    }

    #[instrument(skip(self))]
    pub async fn seek(&self, target: SeekTarget) {
        let commands = { self.machine.lock().seek(target) };
        if commands.is_empty() {
            debug!("Seek ignored, duration unknown or nothing loaded");
        }
        self.execute(commands).await;
    }

    // ========================================================================
    // Device notifications
    // ========================================================================

    /// Apply one device notification. Notifications from superseded loads
    /// are dropped.
    pub async fn handle_device_event(&self, notification: DeviceNotification) {
        let outcome = {
            let mut machine = self.machine.lock();
            let index = machine.state().current_index;
            machine
                .on_device_event(notification)
                .map(|commands| (index, commands))
        };

        let Some((index, commands)) = outcome else {
            debug!(
                epoch = %notification.epoch,
                event = ?notification.event,
                "Ignoring event from superseded load"
            );
            return;
        };

        if notification.event == DeviceEvent::Ended {
            info!(index, "Track completed, advancing");
            self.emit(PlaybackEvent::TrackCompleted { index });
        }
        self.execute(commands).await;
    }

    /// Drain device notifications until the device drops its sender.
    pub async fn pump_device_events(self: Arc<Self>, mut receiver: DeviceEventReceiver) {
        while let Some(notification) = receiver.next().await {
            self.handle_device_event(notification).await;
        }
        debug!("Device event stream closed");
    }

    // ========================================================================
    // Watchdog
    // ========================================================================

    /// Run one stall check: compare intent against the device and issue at
    /// most one resume.
    pub async fn watchdog_tick(&self) -> WatchdogVerdict {
        if !self.machine.lock().watchdog_armed() {
            return WatchdogVerdict::Disarmed;
        }

        let snapshot = match self.device.snapshot().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                warn!(error = %e, "Watchdog could not inspect device, skipping tick");
                return WatchdogVerdict::Unavailable;
            }
        };

        let (verdict, commands, index) = {
            let machine = self.machine.lock();
            let verdict = machine.check_stall(&snapshot);
            let commands = if verdict == WatchdogVerdict::Stalled {
                machine.recover()
            } else {
                Vec::new()
            };
            (verdict, commands, machine.state().current_index)
        };

        if verdict == WatchdogVerdict::Stalled {
            let interventions = self.interventions.fetch_add(1, Ordering::Relaxed) + 1;
            warn!(
                index,
                position_ms = snapshot.current_time.as_millis() as u64,
                paused = snapshot.paused,
                ended = snapshot.ended,
                ready_state = snapshot.ready_state.level(),
                interventions,
                "Playback stalled, restarting"
            );
            self.emit(PlaybackEvent::StallDetected {
                index,
                position_ms: snapshot.current_time.as_millis() as u64,
                interventions,
            });
            self.execute(commands).await;
        }

        verdict
    }

    // ========================================================================
    // Command execution
    // ========================================================================

    async fn execute(&self, commands: Vec<Command>) {
        for command in commands {
            match command {
                Command::Load { epoch, source } => {
                    let index = self.state().current_index;
                    debug!(index, %epoch, url = %source.url, "Loading track");
                    self.emit(PlaybackEvent::TrackChanged {
                        index,
                        url: source.url.clone(),
                        title: display_name(&source.url),
                    });
                    if let Err(e) = self.device.load(epoch, &source).await {
                        error!(url = %source.url, error = %e, "Failed to load track");
                        self.emit_error(Some(index), format!("Failed to load track: {e}"), true);
                    }
                }
                Command::Play { epoch, reason } => self.play(epoch, reason).await,
                Command::Pause => {
                    let state = self.state();
                    match self.device.pause().await {
                        Ok(()) => self.emit(PlaybackEvent::Paused {
                            index: state.current_index,
                            position_ms: state.current_time.as_millis() as u64,
                        }),
                        Err(e) => {
                            warn!(error = %e, "Failed to pause");
                            self.emit_error(
                                Some(state.current_index),
                                format!("Failed to pause: {e}"),
                                true,
                            );
                        }
                    }
                }
                Command::SeekTo(position) => match self.device.seek_to(position).await {
                    Ok(()) => self.emit(PlaybackEvent::Seeked {
                        position_ms: position.as_millis() as u64,
                    }),
                    Err(e) => {
                        warn!(error = %e, "Failed to seek");
                        self.emit_error(None, format!("Failed to seek: {e}"), true);
                    }
                },
                Command::Preload(source) => {
                    if self.preloader.prime(&source).await {
                        self.emit(PlaybackEvent::Preloaded { url: source.url });
                    }
                }
            }
        }
    }

    async fn play(&self, epoch: SwitchEpoch, reason: PlayReason) {
        let index = self.state().current_index;
        let error = match self.device.play().await {
            Ok(()) => {
                debug!(index, ?reason, "Play requested");
                self.emit(PlaybackEvent::Playing { index });
                return;
            }
            Err(e) => e,
        };

        let not_allowed = error.is_not_allowed();
        let current = { self.machine.lock().play_rejected(epoch, reason, not_allowed) };
        if !current {
            debug!(%epoch, "Play rejected for superseded load");
            return;
        }

        if not_allowed && reason == PlayReason::Autoplay {
            info!("Auto-play prevented. Waiting for user interaction.");
            return;
        }

        let recoverable = !not_allowed;
        warn!(index, ?reason, error = %error, "Play request rejected");
        self.emit_error(Some(index), format!("Play rejected: {error}"), recoverable);
    }

    fn emit(&self, event: PlaybackEvent) {
        if let Some(event_bus) = &self.event_bus {
            let _ = event_bus.emit(CoreEvent::Playback(event));
        }
    }

    fn emit_error(&self, index: Option<usize>, message: String, recoverable: bool) {
        self.emit(PlaybackEvent::Error {
            index,
            message,
            recoverable,
        });
    }
}
