//! # Stall Watchdog
//!
//! Periodic check that the controller's playing intent matches what the
//! device is actually doing. Background-tab throttling and transient
//! buffering can stop audio without any pause notification; polling is the
//! only reliable detector.
//!
//! The loop holds a [`Weak`] reference so it never keeps a dropped
//! controller alive, and stops on the first tick after
//! [`WatchdogHandle::stop`] or after the controller is gone.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use tracing::{debug, info};

use crate::controller::PlaybackController;
use crate::machine::WatchdogVerdict;

/// Spawns and owns the periodic stall check.
pub struct StallWatchdog {
    interval: Duration,
}

impl StallWatchdog {
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Start checking `controller` every interval on the current runtime.
    pub fn spawn(&self, controller: &Arc<PlaybackController>) -> WatchdogHandle {
        let stopped = Arc::new(AtomicBool::new(false));
        let handle = WatchdogHandle {
            stopped: Arc::clone(&stopped),
        };

        let interval = self.interval;
        let controller = Arc::downgrade(controller);
        info!(interval_ms = interval.as_millis() as u64, "Stall watchdog started");

        core_async::spawn(run(controller, interval, stopped));
        handle
    }
}

/// Stops a running watchdog loop.
///
/// Dropping the handle does not stop the loop; call [`Self::stop`].
#[derive(Debug, Clone)]
pub struct WatchdogHandle {
    stopped: Arc<AtomicBool>,
}

impl WatchdogHandle {
    pub fn stop(&self) {
        self.stopped.store(true, Ordering::Release);
    }

    pub fn is_stopped(&self) -> bool {
        self.stopped.load(Ordering::Acquire)
    }
}

async fn run(controller: Weak<PlaybackController>, interval: Duration, stopped: Arc<AtomicBool>) {
    loop {
        core_async::sleep(interval).await;

        if stopped.load(Ordering::Acquire) {
            debug!("Stall watchdog stopped");
            break;
        }

        let Some(controller) = controller.upgrade() else {
            debug!("Controller dropped, stall watchdog exiting");
            break;
        };

        let verdict = controller.watchdog_tick().await;
        if verdict == WatchdogVerdict::Healthy {
            debug!("Heartbeat healthy");
        }
    }
}
