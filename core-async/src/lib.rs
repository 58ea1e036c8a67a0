//! Runtime-agnostic async abstraction layer for the player core.
//!
//! This crate provides a unified async API that works across different runtime environments:
//! - Native platforms (tests, tooling): Uses Tokio runtime
//! - WebAssembly: Uses the browser's event loop with wasm-bindgen-futures
//!
//! # Architecture
//!
//! The crate uses conditional compilation (`#[cfg]`) to provide platform-specific
//! implementations while maintaining a consistent API surface. Core crates spawn
//! background loops (device-event pump, stall watchdog) and sleep through this
//! crate instead of depending on tokio directly.
//!
//! # Modules
//!
//! - `task`: Task spawning
//! - `time`: Sleeping and durations
//!
//! # Examples
//!
//! ```rust
//! use core_async::task;
//! use core_async::time::{sleep, Duration};
//!
//! async fn example() {
//!     let handle = task::spawn(async {
//!         sleep(Duration::from_secs(1)).await;
//!         42
//!     });
//!     // On native, this is tokio::task::JoinHandle
//!     // On WASM, the task runs via wasm_bindgen_futures::spawn_local
//! }
//! ```

pub mod task;
pub mod time;

// Re-export commonly used types at crate root for convenience
pub use task::spawn;
pub use time::{sleep, Duration};
