//! `navigator.onLine` implementation of the `NetworkMonitor` bridge trait.

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::network::{NetworkChangeStream, NetworkInfo, NetworkMonitor};
use futures::channel::mpsc;
use futures::StreamExt;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Event, EventTarget};

use crate::error::{WasmError, WasmResult};
use crate::scope::GlobalScope;

type Listener = Closure<dyn FnMut(Event)>;

/// Reports connectivity from the browser's online flag.
pub struct BrowserNetworkMonitor {
    scope: GlobalScope,
}

impl BrowserNetworkMonitor {
    pub fn new() -> WasmResult<Self> {
        Ok(Self {
            scope: GlobalScope::current()?,
        })
    }

    fn current(&self) -> NetworkInfo {
        if self.scope.on_line() {
            NetworkInfo::online()
        } else {
            NetworkInfo::offline()
        }
    }
}

#[async_trait(?Send)]
impl NetworkMonitor for BrowserNetworkMonitor {
    async fn get_network_info(&self) -> BridgeResult<NetworkInfo> {
        Ok(self.current())
    }

    async fn subscribe_changes(&self) -> BridgeResult<Box<dyn NetworkChangeStream>> {
        let (sender, receiver) = mpsc::unbounded();
        let target = self.scope.event_target().clone();
        let mut listeners = Vec::with_capacity(2);

        for (event, info) in [
            ("online", NetworkInfo::online()),
            ("offline", NetworkInfo::offline()),
        ] {
            let sender = sender.clone();
            let callback = Listener::new(move |_event: Event| {
                let _ = sender.unbounded_send(info.clone());
            });
            target
                .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
                .map_err(|err| WasmError::from_js("addEventListener", err))?;
            listeners.push((event, callback));
        }

        Ok(Box::new(BrowserNetworkChanges {
            receiver,
            target,
            listeners,
        }))
    }
}

/// Online/offline transitions; listeners are removed on drop.
pub struct BrowserNetworkChanges {
    receiver: mpsc::UnboundedReceiver<NetworkInfo>,
    target: EventTarget,
    listeners: Vec<(&'static str, Listener)>,
}

#[async_trait(?Send)]
impl NetworkChangeStream for BrowserNetworkChanges {
    async fn next(&mut self) -> Option<NetworkInfo> {
        self.receiver.next().await
    }
}

impl Drop for BrowserNetworkChanges {
    fn drop(&mut self) {
        for (event, callback) in self.listeners.drain(..) {
            let _ = self
                .target
                .remove_event_listener_with_callback(event, callback.as_ref().unchecked_ref());
        }
    }
}
