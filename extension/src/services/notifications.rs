// chrome.notifications

use anyhow::{Context, Result};
use nosleep_core::config::NotificationConfig;
use nosleep_core::Notification;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use super::js::{js_err, to_js};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["chrome", "notifications"], catch)]
    fn create(options: JsValue) -> Result<js_sys::Promise, JsValue>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct NotificationOptions<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    icon_url: &'a str,
    title: &'a str,
    message: &'a str,
    priority: i8,
}

/// Show a basic notification, returns the id Chrome assigned.
pub async fn show(notification: &Notification, config: &NotificationConfig) -> Result<String> {
    let options = to_js(&NotificationOptions {
        kind: "basic",
        icon_url: &config.icon_url,
        title: &notification.title,
        message: &notification.message,
        priority: config.priority,
    })?;

    let promise = create(options).map_err(js_err)?;
    let id = JsFuture::from(promise)
        .await
        .map_err(js_err)
        .with_context(|| format!("Notification \"{}\" failed", notification.title))?;
    Ok(id.as_string().unwrap_or_default())
}
