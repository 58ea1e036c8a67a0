//! WASM bindings for the player service
//!
//! Exposes the player, its event stream and the offline cache to
//! JavaScript/TypeScript.

use std::rc::Rc;
use std::sync::Arc;

use bridge_wasm::{BrowserInstallPrompt, WasmBridgeConfig};
use core_playback::{PlayerConfig, SeekTarget};
use core_runtime::events::{CoreEvent, Receiver, RecvError};
use core_runtime::logging::{init_logging, LogFormat, LogLevel, LoggingConfig};
use js_sys::Promise;
use tracing::warn;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::future_to_promise;

use crate::{bootstrap_wasm, PlayerService};

// =============================================================================
// Error Handling
// =============================================================================

fn to_js_error<E: std::fmt::Display>(err: E) -> JsValue {
    JsValue::from_str(&err.to_string())
}

// =============================================================================
// Logging
// =============================================================================

/// Route `tracing` output to the browser console.
#[wasm_bindgen(js_name = enableConsoleLogging)]
pub fn enable_console_logging() -> Result<(), JsValue> {
    init_logging(
        LoggingConfig::default()
            .with_format(LogFormat::Compact)
            .with_level(LogLevel::Debug),
    )
    .map_err(to_js_error)
}

// =============================================================================
// Player
// =============================================================================

/// JavaScript-accessible player
#[wasm_bindgen]
pub struct JsPlayer {
    service: Rc<PlayerService>,
}

#[wasm_bindgen]
impl JsPlayer {
    /// Create a player over the `<audio>` element with the given id.
    ///
    /// `tracks` is an array of track URLs. `fallback` replaces the built-in
    /// fallback list when given.
    #[wasm_bindgen(constructor)]
    pub fn new(
        tracks: JsValue,
        fallback: JsValue,
        element_id: Option<String>,
    ) -> Result<JsPlayer, JsValue> {
        let tracks: Vec<String> = serde_wasm_bindgen::from_value(tracks).map_err(to_js_error)?;

        let mut player_config = PlayerConfig::default();
        if !fallback.is_undefined() && !fallback.is_null() {
            let fallback: Vec<String> =
                serde_wasm_bindgen::from_value(fallback).map_err(to_js_error)?;
            player_config = player_config.with_fallback_tracks(fallback);
        }

        let bridge_config = element_id
            .map(WasmBridgeConfig::new)
            .unwrap_or_default();

        let service = bootstrap_wasm(bridge_config, player_config, tracks).map_err(to_js_error)?;
        Ok(Self {
            service: Rc::new(service),
        })
    }

    /// Load the catalog and start playback. Resolves once the first track
    /// has been handed to the element.
    pub fn start(&self) -> Promise {
        let service = Rc::clone(&self.service);
        future_to_promise(async move {
            service.start().await.map_err(to_js_error)?;

            let watcher = Rc::clone(&service);
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(err) = watcher.watch_connectivity().await {
                    warn!(error = %err, "Connectivity watch ended");
                }
            });
            Ok(JsValue::UNDEFINED)
        })
    }

    pub fn stop(&self) {
        self.service.stop();
    }

    #[wasm_bindgen(js_name = togglePlayPause)]
    pub fn toggle_play_pause(&self) -> Promise {
        let service = Rc::clone(&self.service);
        future_to_promise(async move {
            service.toggle_play_pause().await;
            Ok(JsValue::UNDEFINED)
        })
    }

    #[wasm_bindgen(js_name = skipNext)]
    pub fn skip_next(&self) -> Promise {
        let service = Rc::clone(&self.service);
        future_to_promise(async move {
            service.skip_next().await;
            Ok(JsValue::UNDEFINED)
        })
    }

    #[wasm_bindgen(js_name = skipPrevious)]
    pub fn skip_previous(&self) -> Promise {
        let service = Rc::clone(&self.service);
        future_to_promise(async move {
            service.skip_previous().await;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Seek to a fraction (0.0 - 1.0) of the current track, e.g. from a
    /// click on the progress bar.
    #[wasm_bindgen(js_name = seekFraction)]
    pub fn seek_fraction(&self, fraction: f64) -> Promise {
        let service = Rc::clone(&self.service);
        future_to_promise(async move {
            service.seek(SeekTarget::Fraction(fraction)).await;
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Current UI snapshot as a plain object.
    pub fn view(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.service.view()).map_err(to_js_error)
    }

    // -------------------------------------------------------------------------
    // Install prompt
    // -------------------------------------------------------------------------

    /// Capture `beforeinstallprompt` so it can be shown later.
    #[wasm_bindgen(js_name = listenForInstallPrompt)]
    pub fn listen_for_install_prompt(&self) -> Result<(), JsValue> {
        let service = Rc::clone(&self.service);
        BrowserInstallPrompt::listen(move |prompt| {
            service.capture_install_prompt(Arc::new(prompt));
        })
        .map_err(to_js_error)
    }

    #[wasm_bindgen(js_name = canInstall)]
    pub fn can_install(&self) -> bool {
        self.service.can_install()
    }

    /// Show the captured install prompt.
    ///
    /// Resolves to `"accepted"`, `"dismissed"` or `null` when nothing was captured.
    #[wasm_bindgen(js_name = requestInstall)]
    pub fn request_install(&self) -> Promise {
        let service = Rc::clone(&self.service);
        future_to_promise(async move {
            let outcome = service.request_install().await.map_err(to_js_error)?;
            Ok(outcome
                .map(|outcome| JsValue::from_str(outcome.as_str()))
                .unwrap_or(JsValue::NULL))
        })
    }

    // -------------------------------------------------------------------------
    // Events
    // -------------------------------------------------------------------------

    pub fn subscribe(&self) -> JsEventReceiver {
        JsEventReceiver {
            receiver: self.service.subscribe(),
        }
    }
}

/// JavaScript-accessible event receiver
#[wasm_bindgen]
pub struct JsEventReceiver {
    receiver: Receiver<CoreEvent>,
}

#[wasm_bindgen]
impl JsEventReceiver {
    /// Receive the next event as a plain object.
    ///
    /// Skips over events dropped while the receiver lagged; rejects once
    /// the player is gone.
    #[wasm_bindgen]
    pub async fn recv(&mut self) -> Result<JsValue, JsValue> {
        loop {
            match self.receiver.recv().await {
                Ok(event) => return serde_wasm_bindgen::to_value(&event).map_err(to_js_error),
                Err(RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Event receiver lagged");
                }
                Err(err @ RecvError::Closed) => return Err(to_js_error(err)),
            }
        }
    }

    /// Receive without waiting (returns null if no events)
    #[wasm_bindgen(js_name = tryRecv)]
    pub fn try_recv(&mut self) -> JsValue {
        match self.receiver.try_recv() {
            Ok(event) => serde_wasm_bindgen::to_value(&event).unwrap_or(JsValue::NULL),
            Err(_) => JsValue::NULL,
        }
    }
}

// =============================================================================
// Offline cache
// =============================================================================

#[cfg(feature = "offline-cache")]
pub use offline::JsOfflineCache;

#[cfg(feature = "offline-cache")]
mod offline {
    use std::rc::Rc;

    use bridge_traits::http::{HttpMethod, HttpRequest, HttpResponse, RequestMode};
    use bytes::Bytes;
    use core_playback::cache::{CacheConfig, OfflineAssetCache};
    use js_sys::{try_iter, Array, Object, Promise, Uint8Array};
    use wasm_bindgen::prelude::*;
    use wasm_bindgen_futures::{future_to_promise, JsFuture};
    use web_sys::{Headers, Request, Response, ResponseInit};

    use super::to_js_error;

    /// Offline asset cache for use inside the service worker.
    #[wasm_bindgen]
    pub struct JsOfflineCache {
        inner: Rc<OfflineAssetCache>,
    }

    #[wasm_bindgen]
    impl JsOfflineCache {
        /// `origin` is the worker's `self.location.origin`; `generation`
        /// overrides the default bucket name.
        #[wasm_bindgen(constructor)]
        pub fn new(origin: String, generation: Option<String>) -> Result<JsOfflineCache, JsValue> {
            let bridges = bridge_wasm::build_worker_bridges().map_err(to_js_error)?;

            let mut config = CacheConfig::default().with_origin(origin);
            if let Some(generation) = generation {
                config = config.with_generation(generation);
            }
            config.validate().map_err(to_js_error)?;

            Ok(Self {
                inner: Rc::new(OfflineAssetCache::new(
                    config,
                    bridges.cache_storage,
                    bridges.http_client,
                )),
            })
        }

        /// Install handler: precache the manifest, then activate when configured.
        pub fn start(&self) -> Promise {
            let cache = Rc::clone(&self.inner);
            future_to_promise(async move {
                cache.start().await.map_err(to_js_error)?;
                Ok(JsValue::UNDEFINED)
            })
        }

        /// Activate handler: resolves to the deleted generation names.
        pub fn activate(&self) -> Promise {
            let cache = Rc::clone(&self.inner);
            future_to_promise(async move {
                let purged = cache.activate().await.map_err(to_js_error)?;
                serde_wasm_bindgen::to_value(&purged).map_err(to_js_error)
            })
        }

        /// Fetch handler: takes `event.request` and resolves to the
        /// `Response` for `respondWith`.
        #[wasm_bindgen(js_name = handleFetch)]
        pub fn handle_fetch(&self, request: Request) -> Promise {
            let cache = Rc::clone(&self.inner);
            future_to_promise(async move {
                let request = from_browser_request(&request).await?;
                let response = cache.handle_fetch(request).await.map_err(to_js_error)?;
                to_browser_response(&response).map(JsValue::from)
            })
        }

        #[wasm_bindgen(js_name = isActive)]
        pub fn is_active(&self) -> bool {
            self.inner.is_active()
        }

        pub fn stats(&self) -> Result<JsValue, JsValue> {
            serde_wasm_bindgen::to_value(&self.inner.stats()).map_err(to_js_error)
        }
    }

    /// Copy method, URL, headers, mode and body out of an intercepted request.
    async fn from_browser_request(request: &Request) -> Result<HttpRequest, JsValue> {
        let method = request.method();
        let method = HttpMethod::parse(&method)
            .ok_or_else(|| to_js_error(format!("unsupported method: {method}")))?;
        let mut forwarded = HttpRequest::new(method, request.url());

        let entries = try_iter(&JsValue::from(request.headers()))?
            .ok_or_else(|| to_js_error("request headers are not iterable"))?;
        for entry in entries {
            let pair = Array::from(&entry?);
            if let (Some(key), Some(value)) = (pair.get(0).as_string(), pair.get(1).as_string()) {
                forwarded = forwarded.header(key, value);
            }
        }

        let mode = JsValue::from(request.mode()).as_string();
        if let Some(mode) = mode.as_deref().and_then(RequestMode::parse) {
            forwarded = forwarded.mode(mode);
        }

        if !matches!(method, HttpMethod::Get | HttpMethod::Head) {
            let buffer = JsFuture::from(request.array_buffer()?).await?;
            forwarded = forwarded.body(Bytes::from(Uint8Array::new(&buffer).to_vec()));
        }
        Ok(forwarded)
    }

    fn to_browser_response(response: &HttpResponse) -> Result<Response, JsValue> {
        let headers = Headers::new()?;
        for (key, value) in &response.headers {
            headers.set(key, value)?;
        }

        let init = ResponseInit::new();
        init.set_status(response.status);
        init.set_headers(&headers);

        let body = Uint8Array::from(response.body.as_ref());
        let body: &Object = &body;
        Response::new_with_opt_buffer_source_and_init(Some(body), &init)
    }
}
