//! Cache API implementation of the `CacheStorage` bridge trait.
//!
//! Buckets map to named caches in `caches`. Stored entries are real
//! `Response` objects so the service worker can hand them back to the page
//! untouched; the capture time travels in an extra header.

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::http::HttpMethod;
use bridge_traits::storage::{CacheStorage, CachedResponse, RequestKey};
use js_sys::{Array, Object, Uint8Array};
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{Cache, Headers, Request, Response, ResponseInit};

use crate::error::{js_error, WasmResult};
use crate::http::WasmHttpClient;
use crate::scope::GlobalScope;

const STORED_AT_HEADER: &str = "x-lullaby-stored-at";

/// Bucketed storage over the browser Cache API.
pub struct BrowserCacheStorage {
    caches: web_sys::CacheStorage,
}

impl BrowserCacheStorage {
    /// Bind to `caches` of the current page or worker.
    pub fn new() -> WasmResult<Self> {
        Ok(Self {
            caches: GlobalScope::current()?.caches()?,
        })
    }

    async fn open(&self, bucket: &str) -> BridgeResult<Cache> {
        JsFuture::from(self.caches.open(bucket))
            .await
            .map_err(|err| js_error("caches.open", err))?
            .dyn_into::<Cache>()
            .map_err(|_| BridgeError::OperationFailed("caches.open returned non-Cache".into()))
    }

    /// Open `bucket` only if it already exists.
    async fn existing(&self, bucket: &str) -> BridgeResult<Option<Cache>> {
        let exists = JsFuture::from(self.caches.has(bucket))
            .await
            .map_err(|err| js_error("caches.has", err))?
            .as_bool()
            .unwrap_or(false);
        if exists {
            self.open(bucket).await.map(Some)
        } else {
            Ok(None)
        }
    }
}

#[async_trait(?Send)]
impl CacheStorage for BrowserCacheStorage {
    async fn bucket_names(&self) -> BridgeResult<Vec<String>> {
        let names = JsFuture::from(self.caches.keys())
            .await
            .map_err(|err| js_error("caches.keys", err))?;
        Ok(Array::from(&names)
            .iter()
            .filter_map(|name| name.as_string())
            .collect())
    }

    async fn open_bucket(&self, bucket: &str) -> BridgeResult<()> {
        self.open(bucket).await.map(|_| ())
    }

    async fn delete_bucket(&self, bucket: &str) -> BridgeResult<bool> {
        let deleted = JsFuture::from(self.caches.delete(bucket))
            .await
            .map_err(|err| js_error("caches.delete", err))?;
        Ok(deleted.as_bool().unwrap_or(false))
    }

    async fn get(&self, bucket: &str, key: &RequestKey) -> BridgeResult<Option<CachedResponse>> {
        let Some(cache) = self.existing(bucket).await? else {
            return Ok(None);
        };
        let matched = JsFuture::from(cache.match_with_str(&key.url))
            .await
            .map_err(|err| js_error("cache.match", err))?;
        from_match(matched).await
    }

    async fn put(&self, bucket: &str, key: RequestKey, response: CachedResponse) -> BridgeResult<()> {
        let cache = self.open(bucket).await?;
        let response = to_browser_response(&response)?;
        JsFuture::from(cache.put_with_str(&key.url, &response))
            .await
            .map_err(|err| js_error("cache.put", err))?;
        Ok(())
    }

    async fn keys(&self, bucket: &str) -> BridgeResult<Vec<RequestKey>> {
        let Some(cache) = self.existing(bucket).await? else {
            return Ok(Vec::new());
        };
        let requests = JsFuture::from(cache.keys())
            .await
            .map_err(|err| js_error("cache.keys", err))?;

        Ok(Array::from(&requests)
            .iter()
            .filter_map(|value| value.dyn_into::<Request>().ok())
            .map(|request| {
                let method = HttpMethod::parse(&request.method()).unwrap_or(HttpMethod::Get);
                RequestKey::new(method, request.url())
            })
            .collect())
    }

    async fn match_any(&self, key: &RequestKey) -> BridgeResult<Option<CachedResponse>> {
        let matched = JsFuture::from(self.caches.match_with_str(&key.url))
            .await
            .map_err(|err| js_error("caches.match", err))?;
        from_match(matched).await
    }
}

async fn from_match(matched: JsValue) -> BridgeResult<Option<CachedResponse>> {
    if matched.is_undefined() || matched.is_null() {
        return Ok(None);
    }
    let response = matched
        .dyn_into::<Response>()
        .map_err(|_| BridgeError::OperationFailed("cache match returned non-Response".into()))?;

    let mut headers = WasmHttpClient::collect_headers(&response)?;
    let stored_at = headers
        .remove(STORED_AT_HEADER)
        .and_then(|value| value.parse().ok())
        .unwrap_or_default();
    let body = WasmHttpClient::read_body(&response).await?;

    Ok(Some(CachedResponse {
        status: response.status(),
        headers,
        body,
        stored_at,
    }))
}

fn to_browser_response(entry: &CachedResponse) -> BridgeResult<Response> {
    let headers = Headers::new().map_err(|err| js_error("create headers", err))?;
    for (key, value) in &entry.headers {
        headers
            .set(key, value)
            .map_err(|err| js_error("set header", err))?;
    }
    headers
        .set(STORED_AT_HEADER, &entry.stored_at.to_string())
        .map_err(|err| js_error("set header", err))?;

    let init = ResponseInit::new();
    init.set_status(entry.status);
    init.set_headers(&headers);

    let body = Uint8Array::from(entry.body.as_ref());
    let body: &Object = &body;
    Response::new_with_opt_buffer_source_and_init(Some(body), &init)
        .map_err(|err| js_error("build response", err))
}
