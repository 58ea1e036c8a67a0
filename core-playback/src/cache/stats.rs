//! Cache statistics and monitoring

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Statistics about intercepted requests since the cache was created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Requests answered from storage
    pub hits: u64,

    /// Cacheable requests with no stored entry
    pub misses: u64,

    /// Requests that reached the network (misses and pass-through)
    pub network_fetches: u64,

    /// Media responses stored after a miss
    pub writes: u64,

    /// Media responses that could not be stored (still served)
    pub write_failures: u64,

    /// Requests forwarded untouched (cache not active yet, or not cacheable)
    pub pass_through: u64,

    /// Total body bytes written to storage (install and media writes)
    pub bytes_stored: u64,

    /// Timestamp when stats were calculated
    pub calculated_at: i64,
}

impl CacheStats {
    /// Requests that went through the cache policy.
    pub fn cacheable_requests(&self) -> u64 {
        self.hits + self.misses
    }

    /// Hit rate percentage over cacheable requests.
    pub fn hit_rate(&self) -> f64 {
        let total = self.cacheable_requests();
        if total == 0 {
            return 0.0;
        }

        (self.hits as f64 / total as f64) * 100.0
    }

    /// Format stored bytes as human-readable string.
    pub fn stored_size_string(&self) -> String {
        format_bytes(self.bytes_stored)
    }
}

/// Lock-free counters updated on the request path.
#[derive(Debug, Default)]
pub(crate) struct CacheCounters {
    hits: AtomicU64,
    misses: AtomicU64,
    network_fetches: AtomicU64,
    writes: AtomicU64,
    write_failures: AtomicU64,
    pass_through: AtomicU64,
    bytes_stored: AtomicU64,
}

impl CacheCounters {
    pub(crate) fn hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn network_fetch(&self) {
        self.network_fetches.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn write(&self, bytes: usize) {
        self.writes.fetch_add(1, Ordering::Relaxed);
        self.stored(bytes);
    }

    pub(crate) fn stored(&self, bytes: usize) {
        self.bytes_stored.fetch_add(bytes as u64, Ordering::Relaxed);
    }

    pub(crate) fn write_failure(&self) {
        self.write_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn pass_through(&self) {
        self.pass_through.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn snapshot(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            network_fetches: self.network_fetches.load(Ordering::Relaxed),
            writes: self.writes.load(Ordering::Relaxed),
            write_failures: self.write_failures.load(Ordering::Relaxed),
            pass_through: self.pass_through.load(Ordering::Relaxed),
            bytes_stored: self.bytes_stored.load(Ordering::Relaxed),
            calculated_at: chrono::Utc::now().timestamp(),
        }
    }
}

/// Format bytes as human-readable string.
fn format_bytes(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else if bytes < 1024 * 1024 * 1024 {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    } else {
        format!("{:.1} GB", bytes as f64 / (1024.0 * 1024.0 * 1024.0))
    }
}
