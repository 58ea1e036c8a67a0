//! # Player Service
//!
//! Façade that owns the playback controller and everything around it.
//!
//! ## Overview
//!
//! [`PlayerService::start`] brings the player up:
//! 1. spawn the device-event pump and the stall watchdog
//! 2. read connectivity
//! 3. load the catalog, falling back to the configured tracks
//! 4. hand the catalog to the controller, which loads the first track and
//!    attempts autoplay
//!
//! The service also holds the deferred install prompt and the online flag,
//! and composes [`PlayerView`] snapshots for the UI.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use bridge_traits::catalog::CatalogProvider;
use bridge_traits::install::{InstallOutcome, InstallPrompt};
use bridge_traits::network::NetworkMonitor;
use bridge_traits::playback::{DeviceEventReceiver, MediaDevice};
use core_playback::{
    load_with_fallback, CatalogLoad, LoadPhase, PlaybackController, PlayerConfig, SeekTarget,
    StallWatchdog, WatchdogHandle,
};
use core_runtime::events::{AppEvent, CoreEvent, EventBus, Receiver};
use parking_lot::Mutex;
use tracing::{debug, info, instrument};

use crate::error::{CoreError, Result};
use crate::view::PlayerView;

/// Host-provided bridges the player needs.
pub struct PlayerDependencies {
    pub media_device: Arc<dyn MediaDevice>,
    /// Notifications emitted by `media_device`.
    pub device_events: DeviceEventReceiver,
    pub catalog_provider: Arc<dyn CatalogProvider>,
    pub network_monitor: Option<Arc<dyn NetworkMonitor>>,
}

impl PlayerDependencies {
    pub fn new(
        media_device: Arc<dyn MediaDevice>,
        device_events: DeviceEventReceiver,
        catalog_provider: Arc<dyn CatalogProvider>,
    ) -> Self {
        Self {
            media_device,
            device_events,
            catalog_provider,
            network_monitor: None,
        }
    }

    pub fn with_network_monitor(mut self, network_monitor: Arc<dyn NetworkMonitor>) -> Self {
        self.network_monitor = Some(network_monitor);
        self
    }
}

/// Primary façade exposed to host applications.
pub struct PlayerService {
    config: PlayerConfig,
    controller: Arc<PlaybackController>,
    catalog_provider: Arc<dyn CatalogProvider>,
    network_monitor: Option<Arc<dyn NetworkMonitor>>,
    event_bus: Arc<EventBus>,
    device_events: Mutex<Option<DeviceEventReceiver>>,
    watchdog: Mutex<Option<WatchdogHandle>>,
    load_phase: Mutex<LoadPhase>,
    online: AtomicBool,
    install_prompt: Mutex<Option<Arc<dyn InstallPrompt>>>,
}

impl PlayerService {
    /// Create a new service from the provided dependencies.
    pub fn new(config: PlayerConfig, deps: PlayerDependencies) -> Result<Self> {
        config.validate().map_err(CoreError::InvalidConfig)?;

        let event_bus = Arc::new(EventBus::default());
        let controller = Arc::new(
            PlaybackController::new(&config, deps.media_device)
                .with_event_bus(Arc::clone(&event_bus)),
        );

        Ok(Self {
            config,
            controller,
            catalog_provider: deps.catalog_provider,
            network_monitor: deps.network_monitor,
            event_bus,
            device_events: Mutex::new(Some(deps.device_events)),
            watchdog: Mutex::new(None),
            load_phase: Mutex::new(LoadPhase::Loading),
            online: AtomicBool::new(true),
            install_prompt: Mutex::new(None),
        })
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    pub fn controller(&self) -> &Arc<PlaybackController> {
        &self.controller
    }

    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }

    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.event_bus.subscribe()
    }

    // ========================================================================
    // Lifecycle
    // ========================================================================

    /// Start background loops and load the catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CoreError::AlreadyStarted`] on a second call.
    #[instrument(skip(self))]
    pub async fn start(&self) -> Result<()> {
        let device_events = { self.device_events.lock().take() };
        let device_events = device_events.ok_or(CoreError::AlreadyStarted)?;

        core_async::spawn(Arc::clone(&self.controller).pump_device_events(device_events));
        let watchdog = StallWatchdog::new(self.config.watchdog_interval).spawn(&self.controller);
        *self.watchdog.lock() = Some(watchdog);

        self.refresh_connectivity().await;
        let phase = self.reload_catalog().await;
        info!(?phase, "Player started");
        Ok(())
    }

    /// Stop the stall watchdog. The device-event pump ends with the device.
    pub fn stop(&self) {
        if let Some(watchdog) = self.watchdog.lock().take() {
            watchdog.stop();
        }
    }

    /// Fetch the catalog again and restart playback from its first track.
    #[instrument(skip(self))]
    pub async fn reload_catalog(&self) -> LoadPhase {
        *self.load_phase.lock() = LoadPhase::Loading;

        let CatalogLoad {
            catalog,
            from_fallback,
        } = load_with_fallback(self.catalog_provider.as_ref(), &self.config.fallback_tracks).await;

        let phase = if catalog.is_empty() {
            LoadPhase::Empty
        } else {
            LoadPhase::Ready
        };
        self.emit(AppEvent::CatalogLoaded {
            track_count: catalog.len(),
            from_fallback,
        });

        self.controller.load_catalog(catalog).await;
        *self.load_phase.lock() = phase;
        phase
    }

    pub fn load_phase(&self) -> LoadPhase {
        *self.load_phase.lock()
    }

    // ========================================================================
    // User intents
    // ========================================================================

    pub async fn toggle_play_pause(&self) {
        self.controller.toggle_play_pause().await;
    }

    pub async fn skip_next(&self) {
        self.controller.skip_next().await;
    }

    pub async fn skip_previous(&self) {
        self.controller.skip_previous().await;
    }

    pub async fn seek(&self, target: SeekTarget) {
        self.controller.seek(target).await;
    }

    /// Snapshot for the rendering layer.
    pub fn view(&self) -> PlayerView {
        let state = self.controller.state();
        let track = self.controller.current_track();
        let track_count = self.controller.catalog().len();

        PlayerView::compose(
            self.load_phase(),
            track_count,
            &state,
            track.as_ref(),
            self.is_online(),
            self.can_install(),
        )
    }

    // ========================================================================
    // Install prompt
    // ========================================================================

    /// Keep a deferred install prompt until the user asks to install.
    pub fn capture_install_prompt(&self, prompt: Arc<dyn InstallPrompt>) {
        *self.install_prompt.lock() = Some(prompt);
        info!("Install prompt captured");
        self.emit(AppEvent::InstallPromptAvailable);
    }

    pub fn can_install(&self) -> bool {
        self.install_prompt.lock().is_some()
    }

    /// Show the captured prompt and wait for the answer.
    ///
    /// Returns `Ok(None)` when no prompt is held. A prompt is single-use:
    /// it is released before showing, whatever the outcome.
    #[instrument(skip(self))]
    pub async fn request_install(&self) -> Result<Option<InstallOutcome>> {
        let prompt = { self.install_prompt.lock().take() };
        let Some(prompt) = prompt else {
            debug!("No install prompt captured");
            return Ok(None);
        };

        prompt.prompt().await?;
        let outcome = prompt.user_choice().await?;
        info!(?outcome, "Install prompt answered");
        self.emit(AppEvent::InstallPromptResolved {
            accepted: outcome == InstallOutcome::Accepted,
        });
        Ok(Some(outcome))
    }

    // ========================================================================
    // Connectivity
    // ========================================================================

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    /// Re-read connectivity. Without a monitor the player assumes online.
    pub async fn refresh_connectivity(&self) -> bool {
        let online = match &self.network_monitor {
            Some(monitor) => monitor.is_connected().await,
            None => true,
        };
        self.set_online(online);
        online
    }

    /// Follow online/offline transitions until the monitor's stream ends.
    pub async fn watch_connectivity(&self) -> Result<()> {
        let Some(monitor) = &self.network_monitor else {
            return Ok(());
        };

        let mut changes = monitor.subscribe_changes().await?;
        while let Some(info) = changes.next().await {
            self.set_online(info.is_online());
        }
        Ok(())
    }

    fn set_online(&self, online: bool) {
        if self.online.swap(online, Ordering::AcqRel) != online {
            info!(online, "Connectivity changed");
            self.emit(AppEvent::ConnectivityChanged { online });
        }
    }

    fn emit(&self, event: AppEvent) {
        let _ = self.event_bus.emit(CoreEvent::App(event));
    }
}

impl Drop for PlayerService {
    fn drop(&mut self) {
        self.stop();
    }
}
