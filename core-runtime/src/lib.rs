//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the player core:
//! - Logging and tracing infrastructure
//! - Event bus system
//! - Shared runtime error type
//!
//! ## Overview
//!
//! This crate contains the runtime utilities that other modules depend on.
//! It establishes the logging conventions and the event broadcasting used to
//! observe playback, offline-cache and app-shell activity.

pub mod error;
pub mod events;
pub mod logging;

pub use error::{Error, Result};
