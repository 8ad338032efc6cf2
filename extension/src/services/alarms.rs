// chrome.alarms, used only to wake the service worker periodically

use anyhow::Result;
use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use super::js::{js_err, to_js};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["chrome", "alarms"], catch)]
    fn create(name: &str, info: JsValue) -> Result<js_sys::Promise, JsValue>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AlarmInfo {
    period_in_minutes: f64,
}

pub async fn create_periodic(name: &str, period_minutes: f64) -> Result<()> {
    let info = to_js(&AlarmInfo {
        period_in_minutes: period_minutes,
    })?;
    let promise = create(name, info).map_err(js_err)?;
    JsFuture::from(promise).await.map_err(js_err)?;
    log::debug!("Alarm {} every {} min", name, period_minutes);
    Ok(())
}
