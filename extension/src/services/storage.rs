// Chrome Storage API Integration
// One boolean under "enabled", nothing else is persisted

use anyhow::Result;
use async_trait::async_trait;
use nosleep_core::FlagStore;
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;

use super::js::js_err;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["chrome", "storage", "local"])]
    fn get(keys: JsValue) -> js_sys::Promise;

    #[wasm_bindgen(js_namespace = ["chrome", "storage", "local"])]
    fn set(items: JsValue) -> js_sys::Promise;
}

const ENABLED_KEY: &str = "enabled";

pub struct StorageManager;

impl StorageManager {
    pub fn new() -> Self {
        Self
    }
}

impl Default for StorageManager {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl FlagStore for StorageManager {
    async fn load_enabled(&self) -> Result<bool> {
        let keys = js_sys::Array::new();
        keys.push(&ENABLED_KEY.into());

        let result = JsFuture::from(get(keys.into())).await.map_err(js_err)?;
        let value = js_sys::Reflect::get(&result, &ENABLED_KEY.into()).map_err(js_err)?;
        Ok(value.as_bool().unwrap_or(false))
    }

    async fn save_enabled(&self, enabled: bool) -> Result<()> {
        let obj = js_sys::Object::new();
        js_sys::Reflect::set(&obj, &ENABLED_KEY.into(), &enabled.into()).map_err(js_err)?;

        JsFuture::from(set(obj.into())).await.map_err(js_err)?;
        log::debug!("Stored enabled={}", enabled);
        Ok(())
    }
}
