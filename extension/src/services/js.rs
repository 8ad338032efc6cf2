// JsValue <-> serde bridge through the JSON global

use anyhow::{anyhow, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use wasm_bindgen::JsValue;

/// Turn a thrown value or rejected promise into an error.
pub fn js_err(value: JsValue) -> anyhow::Error {
    if let Some(text) = value.as_string() {
        return anyhow!(text);
    }
    match js_sys::Reflect::get(&value, &"message".into()) {
        Ok(message) if message.is_string() => anyhow!(message.as_string().unwrap_or_default()),
        _ => anyhow!("{:?}", value),
    }
}

/// Error for the wasm_bindgen boundary
pub fn to_js_err(err: anyhow::Error) -> JsValue {
    JsValue::from_str(&format!("{:#}", err))
}

pub fn to_js<T: Serialize>(value: &T) -> Result<JsValue> {
    let text = serde_json::to_string(value)?;
    js_sys::JSON::parse(&text).map_err(js_err)
}

/// `undefined` and `null` both come back as `Value::Null`.
pub fn json_value(value: &JsValue) -> Result<serde_json::Value> {
    if value.is_undefined() || value.is_null() {
        return Ok(serde_json::Value::Null);
    }
    let text: String = js_sys::JSON::stringify(value).map_err(js_err)?.into();
    Ok(serde_json::from_str(&text)?)
}

pub fn from_js<T: DeserializeOwned>(value: &JsValue) -> Result<T> {
    Ok(serde_json::from_value(json_value(value)?)?)
}
