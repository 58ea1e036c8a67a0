//! Asset Cache Storage Abstraction
//!
//! Named buckets of captured HTTP responses, keyed by request identity.
//! On the web this is the Cache API (`caches.open`, `cache.put`, ...); tests
//! and native hosts can use an in-memory implementation.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

use crate::error::Result;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::platform::PlatformSendSync;

/// Identity of a cached request: method plus absolute or origin-relative URL.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestKey {
    pub method: HttpMethod,
    pub url: String,
}

impl RequestKey {
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
        }
    }

    pub fn get(url: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, url)
    }
}

impl From<&HttpRequest> for RequestKey {
    fn from(request: &HttpRequest) -> Self {
        Self::new(request.method, request.url.clone())
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.url)
    }
}

/// Captured response body and headers stored under a [`RequestKey`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CachedResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Bytes,
    /// Unix timestamp (seconds) when the entry was written.
    pub stored_at: i64,
}

impl CachedResponse {
    /// Capture a copy of a live response.
    pub fn capture(response: &HttpResponse) -> Self {
        Self {
            status: response.status,
            headers: response.headers.clone(),
            body: response.body.clone(),
            stored_at: chrono::Utc::now().timestamp(),
        }
    }

    pub fn to_response(&self) -> HttpResponse {
        HttpResponse {
            status: self.status,
            headers: self.headers.clone(),
            body: self.body.clone(),
        }
    }

    pub fn size(&self) -> usize {
        self.body.len()
    }
}

/// Bucketed response storage.
///
/// Bucket order matters for [`CacheStorage::match_any`]: buckets are searched
/// in creation order, as the browser Cache API does.
#[cfg_attr(target_arch = "wasm32", async_trait::async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait::async_trait)]
pub trait CacheStorage: PlatformSendSync {
    /// Names of every existing bucket, in creation order.
    async fn bucket_names(&self) -> Result<Vec<String>>;

    /// Create the bucket if it does not exist yet.
    async fn open_bucket(&self, bucket: &str) -> Result<()>;

    /// Delete a bucket and all of its entries. Returns `false` if it did not exist.
    async fn delete_bucket(&self, bucket: &str) -> Result<bool>;

    /// Look up one entry in a specific bucket.
    async fn get(&self, bucket: &str, key: &RequestKey) -> Result<Option<CachedResponse>>;

    /// Store an entry, replacing any previous value for the key.
    async fn put(&self, bucket: &str, key: RequestKey, response: CachedResponse) -> Result<()>;

    /// All keys stored in a bucket.
    async fn keys(&self, bucket: &str) -> Result<Vec<RequestKey>>;

    /// Look up a key across every bucket, first match wins.
    async fn match_any(&self, key: &RequestKey) -> Result<Option<CachedResponse>> {
        for bucket in self.bucket_names().await? {
            if let Some(hit) = self.get(&bucket, key).await? {
                return Ok(Some(hit));
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_key_from_request() {
        let request = HttpRequest::get("/songs/amma1.mp3");
        let key = RequestKey::from(&request);
        assert_eq!(key, RequestKey::get("/songs/amma1.mp3"));
        assert_eq!(key.to_string(), "GET /songs/amma1.mp3");
    }

    #[test]
    fn captured_response_converts_back() {
        let live = HttpResponse::new(200, "body").with_header("content-type", "audio/mpeg");
        let cached = CachedResponse::capture(&live);
        assert_eq!(cached.size(), 4);
        assert_eq!(cached.to_response(), live);
    }
}
