//! # Playback Module
//!
//! Continuous playback, stall recovery and offline assets for the player.
//!
//! ## Overview
//!
//! This module handles:
//! - Track and catalog model with modular navigation
//! - A pure playback state machine and the controller that drives a media device
//! - A stall watchdog that resumes silently stopped playback
//! - Next-track preloading
//! - The offline asset cache (feature `offline-cache`)

pub mod catalog;
pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod machine;
pub mod preloader;
pub mod state;
pub mod track;
pub mod watchdog;

#[cfg(feature = "offline-cache")]
pub mod cache;

pub use catalog::{load_with_fallback, CatalogLoad, StaticCatalog};
pub use config::PlayerConfig;
pub use controller::PlaybackController;
pub use display::{format_duration, format_time, progress_percent};
pub use error::{PlaybackError, Result};
pub use machine::{Command, PlayReason, PlaybackMachine, SeekTarget, WatchdogVerdict};
pub use preloader::Preloader;
pub use state::{LoadPhase, PlaybackState};
pub use track::{display_name, mime_type_for, Catalog, Track};
pub use watchdog::{StallWatchdog, WatchdogHandle};
