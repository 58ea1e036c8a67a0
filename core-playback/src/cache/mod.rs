//! # Offline Cache Module
//!
//! Keeps the app shell and audio tracks available without network access.
//!
//! ## Overview
//!
//! The offline cache sits between the app and the network and answers
//! intercepted requests from named storage buckets ("generations"):
//! - Install fetches a fixed manifest into the current generation, all or nothing
//! - Activate deletes every other generation and takes control of open clients
//! - Media requests are cached on first successful fetch
//! - Other requests are answered from any generation, or fetched live
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────┐
//! │     OfflineAssetCache                  │
//! │  - start() / install() / activate()    │
//! │  - handle_fetch()                      │
//! │  - stats()                             │
//! └────────┬───────────────────────────────┘
//!          │
//!          ├──> RequestClass (media / static / bypass)
//!          ├──> CacheStorage (Cache API or in-memory)
//!          └──> HttpClient (network)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use core_playback::cache::{CacheConfig, OfflineAssetCache};
//! use bridge_traits::http::HttpRequest;
//!
//! # async fn example(cache: &OfflineAssetCache) -> core_playback::Result<()> {
//! cache.start().await?;
//!
//! let response = cache.handle_fetch(HttpRequest::get("/songs/amma1.mp3")).await?;
//! assert!(response.is_success());
//!
//! let stats = cache.stats();
//! println!("Hit rate: {:.0}%", stats.hit_rate());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod lifecycle;
pub mod manager;
pub mod memory;
pub mod policy;
pub mod stats;

// Re-export commonly used types
pub use config::{CacheConfig, DEFAULT_GENERATION};
pub use lifecycle::WorkerPhase;
pub use manager::OfflineAssetCache;
pub use memory::MemoryCacheStorage;
pub use policy::{is_media_url, RequestClass};
pub use stats::CacheStats;
