//! Time-related abstractions.
//!
//! - On native platforms: Uses `tokio::time::sleep`, so paused-clock tests
//!   (`#[tokio::test(start_paused = true)]`) advance instantly
//! - On WASM: Uses `gloo-timers` (`setTimeout`)

pub use std::time::Duration;

#[cfg(not(target_arch = "wasm32"))]
pub use tokio::time::sleep;

#[cfg(target_arch = "wasm32")]
/// Sleeps for the specified duration using the browser's `setTimeout`.
///
/// # Examples
///
/// ```rust
/// use core_async::time::{sleep, Duration};
///
/// # async fn example() {
/// sleep(Duration::from_millis(100)).await;
/// # }
/// ```
pub async fn sleep(duration: Duration) {
    gloo_timers::future::sleep(duration).await
}
