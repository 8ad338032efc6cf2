// chrome.runtime messaging and context queries

use anyhow::{Context, Result};
use nosleep_core::Request;
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use super::js::{from_js, js_err, json_value, to_js};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["chrome", "runtime"], js_name = sendMessage, catch)]
    fn send_message(message: JsValue) -> Result<js_sys::Promise, JsValue>;

    #[wasm_bindgen(js_namespace = ["chrome", "runtime"], js_name = getContexts, catch)]
    fn get_contexts(filter: JsValue) -> Result<js_sys::Promise, JsValue>;

    /// Absolute chrome-extension:// URL for a packaged file
    #[wasm_bindgen(js_namespace = ["chrome", "runtime"], js_name = getURL)]
    pub fn get_url(path: &str) -> String;
}

/// Broadcast a request to the other extension contexts and return the
/// raw reply. Rejects when no context listens for it.
pub async fn send(request: &Request) -> Result<serde_json::Value> {
    let promise = send_message(to_js(request)?).map_err(js_err)?;
    let reply = JsFuture::from(promise)
        .await
        .map_err(js_err)
        .with_context(|| format!("sendMessage({}) failed", request.action()))?;
    json_value(&reply)
}

/// Same as [`send`], decoding the reply.
pub async fn request<T: DeserializeOwned>(request: &Request) -> Result<T> {
    let promise = send_message(to_js(request)?).map_err(js_err)?;
    let reply = JsFuture::from(promise).await.map_err(js_err)?;
    from_js(&reply).with_context(|| format!("Unexpected reply to {}", request.action()))
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContextFilter<'a> {
    context_types: [&'a str; 1],
    document_urls: [&'a str; 1],
}

/// Number of open contexts of `context_type` showing `document_url`.
pub async fn count_contexts(context_type: &str, document_url: &str) -> Result<usize> {
    let filter = to_js(&ContextFilter {
        context_types: [context_type],
        document_urls: [document_url],
    })?;
    let promise = get_contexts(filter).map_err(js_err)?;
    let contexts = JsFuture::from(promise).await.map_err(js_err)?;
    Ok(js_sys::Array::from(&contexts).length() as usize)
}
