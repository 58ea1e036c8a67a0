//! `<audio>` element implementation of the `MediaDevice` bridge trait.
//!
//! The device owns one page-level `<audio>` element for playback and a
//! detached element used only to warm the HTTP cache for the next track.
//! Media element events are forwarded to the device event channel, tagged
//! with the epoch of the load that was current when they fired.

use std::cell::Cell;
use std::rc::Rc;
use std::time::Duration;

use async_trait::async_trait;
use bridge_traits::error::Result as BridgeResult;
use bridge_traits::playback::{
    DeviceEvent, DeviceEventSender, DeviceNotification, DeviceSnapshot, MediaDevice, MediaSource,
    ReadyState, SwitchEpoch,
};
use tracing::{debug, warn};
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Event, HtmlAudioElement, HtmlSourceElement};

use crate::error::{js_error, WasmError, WasmResult};

/// Id of the playback element created when the page has none.
pub const DEFAULT_AUDIO_ELEMENT_ID: &str = "lullaby-audio";

type Listener = Closure<dyn FnMut(Event)>;

/// Media device backed by an `HTMLAudioElement`.
pub struct HtmlAudioDevice {
    element: HtmlAudioElement,
    preload_element: HtmlAudioElement,
    epoch: Rc<Cell<SwitchEpoch>>,
    listeners: Vec<(&'static str, Listener)>,
}

impl HtmlAudioDevice {
    /// Attach to the element with `element_id`, creating it if missing, and
    /// start forwarding its events to `sender`.
    pub fn attach(element_id: &str, sender: DeviceEventSender) -> WasmResult<Self> {
        let element = get_or_create_audio_element(element_id)?;
        let preload_element =
            HtmlAudioElement::new().map_err(|err| WasmError::from_js("new Audio", err))?;
        preload_element.set_preload("auto");

        let mut device = Self {
            element,
            preload_element,
            epoch: Rc::new(Cell::new(SwitchEpoch::default())),
            listeners: Vec::new(),
        };

        device.listen("canplay", &sender, |_| Some(DeviceEvent::ReadyToPlay))?;
        device.listen("ended", &sender, |_| Some(DeviceEvent::Ended))?;
        device.listen("timeupdate", &sender, |audio| {
            seconds(audio.current_time()).map(DeviceEvent::TimeAdvanced)
        })?;
        device.listen("durationchange", &sender, |audio| {
            seconds(audio.duration())
                .filter(|duration| !duration.is_zero())
                .map(DeviceEvent::DurationKnown)
        })?;
        device.listen("play", &sender, |_| Some(DeviceEvent::PlayStateChanged(true)))?;
        device.listen("pause", &sender, |_| Some(DeviceEvent::PlayStateChanged(false)))?;

        debug!(element_id, "Audio device attached");
        Ok(device)
    }

    fn listen(
        &mut self,
        event: &'static str,
        sender: &DeviceEventSender,
        map: fn(&HtmlAudioElement) -> Option<DeviceEvent>,
    ) -> WasmResult<()> {
        let element = self.element.clone();
        let epoch = Rc::clone(&self.epoch);
        let sender = sender.clone();

        let callback = Listener::new(move |_event: Event| {
            if let Some(device_event) = map(&element) {
                // Receiver gone means the player was torn down.
                let _ = sender.unbounded_send(DeviceNotification::new(epoch.get(), device_event));
            }
        });
        self.element
            .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
            .map_err(|err| WasmError::from_js("addEventListener", err))?;
        self.listeners.push((event, callback));
        Ok(())
    }

    fn document(&self) -> WasmResult<Document> {
        self.element
            .owner_document()
            .ok_or_else(|| WasmError::Unavailable("audio element has no document".into()))
    }

    fn replace_source(&self, source: &MediaSource) -> WasmResult<()> {
        self.element
            .remove_attribute("src")
            .map_err(|err| WasmError::from_js("removeAttribute", err))?;
        while let Some(child) = self.element.first_child() {
            self.element
                .remove_child(&child)
                .map_err(|err| WasmError::from_js("removeChild", err))?;
        }

        let source_element: HtmlSourceElement = self
            .document()?
            .create_element("source")
            .map_err(|err| WasmError::from_js("createElement", err))?
            .dyn_into()
            .map_err(|_| WasmError::JavaScript("<source> is not an HTMLSourceElement".into()))?;
        source_element.set_src(&source.url);
        source_element.set_type(&source.mime_type);

        self.element
            .append_child(&source_element)
            .map_err(|err| WasmError::from_js("appendChild", err))?;
        Ok(())
    }
}

impl Drop for HtmlAudioDevice {
    fn drop(&mut self) {
        for (event, callback) in self.listeners.drain(..) {
            let _ = self
                .element
                .remove_event_listener_with_callback(event, callback.as_ref().unchecked_ref());
        }
    }
}

#[async_trait(?Send)]
impl MediaDevice for HtmlAudioDevice {
    async fn load(&self, epoch: SwitchEpoch, source: &MediaSource) -> BridgeResult<()> {
        self.epoch.set(epoch);
        self.replace_source(source)?;
        self.element.load();
        Ok(())
    }

    async fn play(&self) -> BridgeResult<()> {
        let promise = self.element.play().map_err(|err| js_error("play", err))?;
        JsFuture::from(promise)
            .await
            .map(|_| ())
            .map_err(|err| js_error("play", err))
    }

    async fn pause(&self) -> BridgeResult<()> {
        self.element.pause().map_err(|err| js_error("pause", err))
    }

    async fn seek_to(&self, position: Duration) -> BridgeResult<()> {
        self.element.set_current_time(position.as_secs_f64());
        Ok(())
    }

    async fn preload(&self, source: &MediaSource) -> BridgeResult<()> {
        self.preload_element.set_src(&source.url);
        self.preload_element.load();
        Ok(())
    }

    async fn snapshot(&self) -> BridgeResult<DeviceSnapshot> {
        Ok(DeviceSnapshot {
            paused: self.element.paused(),
            ended: self.element.ended(),
            current_time: seconds(self.element.current_time()).unwrap_or_default(),
            ready_state: ReadyState::from_level(self.element.ready_state()),
        })
    }
}

fn get_or_create_audio_element(element_id: &str) -> WasmResult<HtmlAudioElement> {
    let document = web_sys::window()
        .and_then(|window| window.document())
        .ok_or_else(|| WasmError::Unavailable("document".into()))?;

    if let Some(existing) = document.get_element_by_id(element_id) {
        return existing
            .dyn_into::<HtmlAudioElement>()
            .map_err(|_| WasmError::Unsupported(format!("#{element_id} is not an <audio> element")));
    }

    let audio: HtmlAudioElement = document
        .create_element("audio")
        .map_err(|err| WasmError::from_js("createElement", err))?
        .dyn_into()
        .map_err(|_| WasmError::JavaScript("<audio> is not an HTMLAudioElement".into()))?;
    audio.set_id(element_id);
    audio.set_preload("auto");

    let body = document
        .body()
        .ok_or_else(|| WasmError::Unavailable("document.body".into()))?;
    body.append_child(&audio)
        .map_err(|err| WasmError::from_js("appendChild", err))?;

    warn!(element_id, "No audio element on the page, created one");
    Ok(audio)
}

/// Media element times are seconds as `f64`; NaN and infinity mean unknown.
fn seconds(value: f64) -> Option<Duration> {
    (value.is_finite() && value >= 0.0).then(|| Duration::from_secs_f64(value))
}
