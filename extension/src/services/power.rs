// chrome.power keep-awake requests

use nosleep_core::KeepAwakeLevel;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["chrome", "power"], js_name = requestKeepAwake)]
    fn request_keep_awake(level: &str);

    #[wasm_bindgen(js_namespace = ["chrome", "power"], js_name = releaseKeepAwake)]
    fn release_keep_awake();
}

pub fn request(level: KeepAwakeLevel) {
    request_keep_awake(level.as_str());
}

pub fn release() {
    release_keep_awake();
}
