// chrome.offscreen document hosting

use anyhow::Result;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use super::js::{js_err, to_js};
use super::runtime;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["chrome", "offscreen"], js_name = createDocument, catch)]
    fn create_document(parameters: JsValue) -> Result<js_sys::Promise, JsValue>;
}

#[derive(Serialize)]
struct CreateParameters<'a> {
    url: &'a str,
    reasons: [&'static str; 1],
    justification: &'a str,
}

/// Whether `chrome.offscreen` exists in this browser
pub fn is_available() -> bool {
    let chrome = match js_sys::Reflect::get(&js_sys::global(), &"chrome".into()) {
        Ok(chrome) if chrome.is_object() => chrome,
        _ => return false,
    };
    js_sys::Reflect::get(&chrome, &"offscreen".into())
        .and_then(|offscreen| js_sys::Reflect::get(&offscreen, &"createDocument".into()))
        .map(|create| create.is_function())
        .unwrap_or(false)
}

pub async fn exists(url: &str) -> Result<bool> {
    let count = runtime::count_contexts("OFFSCREEN_DOCUMENT", &runtime::get_url(url)).await?;
    Ok(count > 0)
}

pub async fn create(url: &str, justification: &str) -> Result<()> {
    let parameters = to_js(&CreateParameters {
        url,
        reasons: ["AUDIO_PLAYBACK"],
        justification,
    })?;
    let promise = create_document(parameters).map_err(js_err)?;
    JsFuture::from(promise).await.map_err(js_err)?;
    log::info!("Offscreen document {} created", url);
    Ok(())
}
