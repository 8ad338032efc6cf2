// Notification cue playback through an <audio> element

use anyhow::Result;
use wasm_bindgen_futures::JsFuture;
use web_sys::HtmlAudioElement;

use super::js::js_err;

pub struct NotificationSound {
    element: HtmlAudioElement,
}

impl NotificationSound {
    pub fn new(url: &str) -> Result<Self> {
        let element = HtmlAudioElement::new_with_src(url).map_err(js_err)?;
        Ok(Self { element })
    }

    /// Whether this context can construct audio elements at all
    pub fn is_available() -> bool {
        js_sys::Reflect::has(&js_sys::global(), &"Audio".into()).unwrap_or(false)
    }

    /// Rewind and play once. Resolves when playback has started.
    pub async fn play(&self) -> Result<()> {
        self.element.set_current_time(0.0);
        let promise = self.element.play().map_err(js_err)?;
        JsFuture::from(promise).await.map_err(js_err)?;
        Ok(())
    }
}
