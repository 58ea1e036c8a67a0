//! Access to the global scope the module runs in.
//!
//! The player page runs on a `Window`; the offline cache runs inside a
//! service worker. `fetch`, `caches` and `navigator.onLine` exist in both,
//! behind different web-sys types.

use js_sys::Promise;
use wasm_bindgen::JsCast;
use web_sys::{CacheStorage, EventTarget, Request, Window, WorkerGlobalScope};

use crate::error::{WasmError, WasmResult};

/// The current JavaScript global.
#[derive(Clone)]
pub enum GlobalScope {
    Window(Window),
    Worker(WorkerGlobalScope),
}

impl GlobalScope {
    /// Detect the global of the running context.
    pub fn current() -> WasmResult<Self> {
        let global = js_sys::global();
        if let Some(window) = global.dyn_ref::<Window>() {
            return Ok(GlobalScope::Window(window.clone()));
        }
        global
            .dyn_into::<WorkerGlobalScope>()
            .map(GlobalScope::Worker)
            .map_err(|_| WasmError::Unavailable("no window or worker global".into()))
    }

    /// Target for `online` / `offline` listeners.
    pub fn event_target(&self) -> &EventTarget {
        match self {
            GlobalScope::Window(window) => window,
            GlobalScope::Worker(worker) => worker,
        }
    }

    pub fn fetch(&self, request: &Request) -> Promise {
        match self {
            GlobalScope::Window(window) => window.fetch_with_request(request),
            GlobalScope::Worker(worker) => worker.fetch_with_request(request),
        }
    }

    pub fn caches(&self) -> WasmResult<CacheStorage> {
        let caches = match self {
            GlobalScope::Window(window) => window.caches(),
            GlobalScope::Worker(worker) => worker.caches(),
        };
        caches.map_err(|err| WasmError::from_js("caches", err))
    }

    pub fn on_line(&self) -> bool {
        match self {
            GlobalScope::Window(window) => window.navigator().on_line(),
            GlobalScope::Worker(worker) => worker.navigator().on_line(),
        }
    }
}
