// Toolbar badge

use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["chrome", "action"], js_name = setBadgeText)]
    fn set_badge_text(details: &js_sys::Object);

    #[wasm_bindgen(js_namespace = ["chrome", "action"], js_name = setBadgeBackgroundColor)]
    fn set_badge_background_color(details: &js_sys::Object);
}

const BADGE_TEXT: &str = "ON";
const BADGE_COLOR: &str = "#4CAF50";

fn details(key: &str, value: &str) -> Result<js_sys::Object, JsValue> {
    let obj = js_sys::Object::new();
    js_sys::Reflect::set(&obj, &key.into(), &value.into())?;
    Ok(obj)
}

pub fn set_badge(enabled: bool) -> Result<(), JsValue> {
    if enabled {
        set_badge_background_color(&details("color", BADGE_COLOR)?);
        set_badge_text(&details("text", BADGE_TEXT)?);
    } else {
        set_badge_text(&details("text", "")?);
    }
    Ok(())
}
