//! In-memory [`CacheStorage`] for native hosts and tests.

use bridge_traits::error::Result as BridgeResult;
use bridge_traits::storage::{CacheStorage, CachedResponse, RequestKey};
use parking_lot::Mutex;
use std::collections::HashMap;

type Bucket = HashMap<RequestKey, CachedResponse>;

/// Bucketed response store kept in process memory.
///
/// Buckets are kept in creation order so `match_any` behaves like the
/// browser Cache API.
#[derive(Debug, Default)]
pub struct MemoryCacheStorage {
    buckets: Mutex<Vec<(String, Bucket)>>,
}

impl MemoryCacheStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of entries in `bucket`, or `None` if it does not exist.
    pub fn entry_count(&self, bucket: &str) -> Option<usize> {
        self.buckets
            .lock()
            .iter()
            .find(|(name, _)| name == bucket)
            .map(|(_, entries)| entries.len())
    }
}

#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
impl CacheStorage for MemoryCacheStorage {
    async fn bucket_names(&self) -> BridgeResult<Vec<String>> {
        Ok(self
            .buckets
            .lock()
            .iter()
            .map(|(name, _)| name.clone())
            .collect())
    }

    async fn open_bucket(&self, bucket: &str) -> BridgeResult<()> {
        let mut buckets = self.buckets.lock();
        if !buckets.iter().any(|(name, _)| name == bucket) {
            buckets.push((bucket.to_string(), Bucket::new()));
        }
        Ok(())
    }

    async fn delete_bucket(&self, bucket: &str) -> BridgeResult<bool> {
        let mut buckets = self.buckets.lock();
        let before = buckets.len();
        buckets.retain(|(name, _)| name != bucket);
        Ok(buckets.len() != before)
    }

    async fn get(&self, bucket: &str, key: &RequestKey) -> BridgeResult<Option<CachedResponse>> {
        Ok(self
            .buckets
            .lock()
            .iter()
            .find(|(name, _)| name == bucket)
            .and_then(|(_, entries)| entries.get(key).cloned()))
    }

    async fn put(&self, bucket: &str, key: RequestKey, response: CachedResponse) -> BridgeResult<()> {
        let mut buckets = self.buckets.lock();
        match buckets.iter_mut().find(|(name, _)| name == bucket) {
            Some((_, entries)) => {
                entries.insert(key, response);
            }
            None => {
                let mut entries = Bucket::new();
                entries.insert(key, response);
                buckets.push((bucket.to_string(), entries));
            }
        }
        Ok(())
    }

    async fn keys(&self, bucket: &str) -> BridgeResult<Vec<RequestKey>> {
        Ok(self
            .buckets
            .lock()
            .iter()
            .find(|(name, _)| name == bucket)
            .map(|(_, entries)| entries.keys().cloned().collect())
            .unwrap_or_default())
    }
}
