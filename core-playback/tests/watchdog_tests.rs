//! Tests for the stall watchdog
//!
//! Timing tests run on a paused tokio clock: sleeping in the test advances
//! virtual time, firing the watchdog's own timer first.

mod common;

use common::{drain_playback_events, playing_snapshot, stalled_snapshot, Call, RecordingDevice};
use core_playback::{Catalog, PlaybackController, PlayerConfig, StallWatchdog, WatchdogVerdict};
use core_runtime::events::{EventBus, PlaybackEvent};
use std::sync::Arc;
use std::time::Duration;

const INTERVAL: Duration = Duration::from_secs(5);

async fn playing_controller() -> (Arc<RecordingDevice>, Arc<PlaybackController>, Arc<EventBus>) {
    let device = Arc::new(RecordingDevice::new());
    let bus = Arc::new(EventBus::new(64));
    let controller = Arc::new(
        PlaybackController::new(&PlayerConfig::default(), device.clone())
            .with_event_bus(bus.clone()),
    );
    controller
        .load_catalog(Catalog::from_urls(["/songs/A.mp3", "/songs/B.m4a"]))
        .await;
    device.clear();
    (device, controller, bus)
}

/// Let `ticks` watchdog intervals elapse, landing between ticks.
async fn elapse(ticks: u32) {
    tokio::time::sleep(INTERVAL * ticks + Duration::from_millis(100)).await;
}

#[tokio::test]
async fn test_healthy_device_gets_no_resume() {
    let (device, controller, _bus) = playing_controller().await;
    device.set_snapshot(Some(playing_snapshot()));

    assert_eq!(controller.watchdog_tick().await, WatchdogVerdict::Healthy);
    assert_eq!(device.calls(), vec![Call::Snapshot]);
    assert_eq!(controller.interventions(), 0);
}

#[tokio::test]
async fn test_stalled_device_gets_exactly_one_resume() {
    let (device, controller, bus) = playing_controller().await;
    let mut events = bus.subscribe();
    device.set_snapshot(Some(stalled_snapshot()));

    assert_eq!(controller.watchdog_tick().await, WatchdogVerdict::Stalled);
    assert_eq!(device.calls(), vec![Call::Snapshot, Call::Play]);
    assert_eq!(controller.interventions(), 1);

    let published = drain_playback_events(&mut events);
    assert!(matches!(
        published.as_slice(),
        [
            PlaybackEvent::StallDetected {
                index: 0,
                position_ms: 12_000,
                interventions: 1,
            },
            PlaybackEvent::Playing { index: 0 },
        ]
    ));
}

#[tokio::test]
async fn test_insufficient_readiness_counts_as_stall() {
    let (device, controller, _bus) = playing_controller().await;
    let mut snapshot = playing_snapshot();
    snapshot.ready_state = bridge_traits::playback::ReadyState::HaveCurrentData;
    device.set_snapshot(Some(snapshot));

    assert_eq!(controller.watchdog_tick().await, WatchdogVerdict::Stalled);
}

#[tokio::test]
async fn test_user_pause_disarms_watchdog() {
    let (device, controller, _bus) = playing_controller().await;
    device.set_snapshot(Some(stalled_snapshot()));
    controller.toggle_play_pause().await;
    device.clear();

    assert_eq!(controller.watchdog_tick().await, WatchdogVerdict::Disarmed);
    assert!(device.calls().is_empty());
}

#[tokio::test]
async fn test_snapshot_failure_skips_tick() {
    let (device, controller, _bus) = playing_controller().await;
    device.set_snapshot(None);

    assert_eq!(controller.watchdog_tick().await, WatchdogVerdict::Unavailable);
    assert_eq!(device.play_count(), 0);
}

#[tokio::test]
async fn test_failed_recovery_keeps_intent_for_next_tick() {
    let (device, controller, _bus) = playing_controller().await;
    device.set_snapshot(Some(stalled_snapshot()));
    device.script_play([common::PlayOutcome::Fail]);

    assert_eq!(controller.watchdog_tick().await, WatchdogVerdict::Stalled);
    assert!(controller.state().is_playing);
    assert_eq!(controller.watchdog_tick().await, WatchdogVerdict::Stalled);
    assert_eq!(device.play_count(), 2);
}

#[tokio::test(start_paused = true)]
async fn test_spawned_watchdog_resumes_once_per_interval() {
    let (device, controller, _bus) = playing_controller().await;
    device.set_snapshot(Some(stalled_snapshot()));

    let handle = StallWatchdog::new(INTERVAL).spawn(&controller);

    elapse(0).await;
    assert_eq!(device.play_count(), 0);

    elapse(1).await;
    assert_eq!(device.play_count(), 1);

    elapse(2).await;
    assert_eq!(device.play_count(), 3);
    assert_eq!(controller.interventions(), 3);

    handle.stop();
    elapse(3).await;
    assert_eq!(device.play_count(), 3);
    assert!(handle.is_stopped());
}

#[tokio::test(start_paused = true)]
async fn test_spawned_watchdog_stays_quiet_when_healthy() {
    let (device, controller, _bus) = playing_controller().await;
    device.set_snapshot(Some(playing_snapshot()));

    let handle = StallWatchdog::new(INTERVAL).spawn(&controller);
    elapse(4).await;

    assert_eq!(device.play_count(), 0);
    assert_eq!(
        device.calls().iter().filter(|c| **c == Call::Snapshot).count(),
        4
    );
    handle.stop();
}

#[tokio::test(start_paused = true)]
async fn test_watchdog_exits_when_controller_dropped() {
    let (device, controller, _bus) = playing_controller().await;
    device.set_snapshot(Some(stalled_snapshot()));

    let _handle = StallWatchdog::new(INTERVAL).spawn(&controller);
    drop(controller);
    elapse(2).await;

    assert!(device.calls().is_empty());
}
