//! Task spawning abstractions.
//!
//! - On native platforms: Uses `tokio::task::spawn`; tasks must be `Send`
//! - On WASM: Uses `wasm_bindgen_futures::spawn_local`; tasks only need `'static`
//!
//! Both variants return an awaitable `JoinHandle`.

// ============================================================================
// Native Implementation (Tokio)
// ============================================================================

#[cfg(not(target_arch = "wasm32"))]
pub use tokio::task::{JoinError, JoinHandle};

#[cfg(not(target_arch = "wasm32"))]
/// Spawns a new asynchronous task using the Tokio runtime.
///
/// # Examples
///
/// ```rust
/// use core_async::task::spawn;
///
/// # async fn example() {
/// let handle = spawn(async { 42 });
/// assert_eq!(handle.await.unwrap(), 42);
/// # }
/// ```
pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
where
    F: std::future::Future + Send + 'static,
    F::Output: Send + 'static,
{
    tokio::task::spawn(future)
}

// ============================================================================
// WASM Implementation
// ============================================================================

#[cfg(target_arch = "wasm32")]
pub use self::local::{spawn, JoinError, JoinHandle};

#[cfg(target_arch = "wasm32")]
mod local {
    use futures::channel::oneshot;
    use std::fmt;
    use std::future::Future;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    /// The task was dropped before producing a value.
    #[derive(Debug, Clone)]
    pub struct JoinError;

    impl JoinError {
        pub fn is_cancelled(&self) -> bool {
            true
        }
    }

    impl fmt::Display for JoinError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "task was cancelled")
        }
    }

    impl std::error::Error for JoinError {}

    /// Awaitable handle to a task running on the browser event loop.
    pub struct JoinHandle<T> {
        receiver: oneshot::Receiver<T>,
    }

    impl<T> Future for JoinHandle<T> {
        type Output = Result<T, JoinError>;

        fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
            Pin::new(&mut self.receiver)
                .poll(cx)
                .map(|result| result.map_err(|_| JoinError))
        }
    }

    /// Spawns a task onto the browser's event loop.
    pub fn spawn<F>(future: F) -> JoinHandle<F::Output>
    where
        F: Future + 'static,
        F::Output: 'static,
    {
        let (sender, receiver) = oneshot::channel();
        wasm_bindgen_futures::spawn_local(async move {
            let _ = sender.send(future.await);
        });
        JoinHandle { receiver }
    }
}

// ============================================================================
// Common Types
// ============================================================================

/// Result type for task operations.
pub type Result<T> = std::result::Result<T, JoinError>;
