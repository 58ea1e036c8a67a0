//! Deferred `beforeinstallprompt` event as an `InstallPrompt`.

use async_trait::async_trait;
use bridge_traits::error::{BridgeError, Result as BridgeResult};
use bridge_traits::install::{InstallOutcome, InstallPrompt};
use js_sys::{Function, Promise, Reflect};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::Event;

use crate::error::{js_error, WasmError, WasmResult};

/// A captured install prompt the page can show later.
pub struct BrowserInstallPrompt {
    event: Event,
}

impl BrowserInstallPrompt {
    /// Take over a `beforeinstallprompt` event, suppressing the browser's
    /// own mini-infobar.
    pub fn from_event(event: Event) -> Self {
        event.prevent_default();
        Self { event }
    }

    /// Register a window listener that hands every captured prompt to
    /// `handler`. The listener lives for the rest of the page.
    pub fn listen(handler: impl Fn(BrowserInstallPrompt) + 'static) -> WasmResult<()> {
        let window =
            web_sys::window().ok_or_else(|| WasmError::Unavailable("window".into()))?;
        let callback = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            handler(BrowserInstallPrompt::from_event(event));
        });
        window
            .add_event_listener_with_callback("beforeinstallprompt", callback.as_ref().unchecked_ref())
            .map_err(|err| WasmError::from_js("addEventListener", err))?;
        callback.forget();
        Ok(())
    }

    fn property(&self, name: &str) -> BridgeResult<JsValue> {
        Reflect::get(&self.event, &JsValue::from_str(name))
            .map_err(|err| js_error("read install prompt", err))
    }
}

#[async_trait(?Send)]
impl InstallPrompt for BrowserInstallPrompt {
    async fn prompt(&self) -> BridgeResult<()> {
        let prompt = self
            .property("prompt")?
            .dyn_into::<Function>()
            .map_err(|_| BridgeError::NotAvailable("beforeinstallprompt.prompt".into()))?;
        let result = prompt
            .call0(&self.event)
            .map_err(|err| js_error("prompt", err))?;

        if let Some(promise) = result.dyn_ref::<Promise>() {
            JsFuture::from(promise.clone())
                .await
                .map_err(|err| js_error("prompt", err))?;
        }
        Ok(())
    }

    async fn user_choice(&self) -> BridgeResult<InstallOutcome> {
        let choice = self
            .property("userChoice")?
            .dyn_into::<Promise>()
            .map_err(|_| BridgeError::NotAvailable("beforeinstallprompt.userChoice".into()))?;
        let choice = JsFuture::from(choice)
            .await
            .map_err(|err| js_error("userChoice", err))?;

        let outcome = Reflect::get(&choice, &JsValue::from_str("outcome"))
            .map_err(|err| js_error("userChoice.outcome", err))?
            .as_string()
            .unwrap_or_default();
        Ok(InstallOutcome::from_outcome(&outcome))
    }
}
