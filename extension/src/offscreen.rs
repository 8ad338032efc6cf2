// Offscreen document: audio playback and the battery sensor
// Minimal dependencies - no Dioxus, built with --no-default-features

use std::cell::OnceCell;

use nosleep_core::{Relay, Request};
use nosleep_extension::platform::{forward_over_runtime, DomRelayHost};
use nosleep_extension::services::js::{from_js, to_js, to_js_err};
use nosleep_extension::{init_logging, load_config};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

// Dummy main for binary target
fn main() {}

thread_local! {
    static RELAY: OnceCell<Relay<DomRelayHost>> = const { OnceCell::new() };
}

fn relay() -> Option<Relay<DomRelayHost>> {
    RELAY.with(|cell| cell.get().cloned())
}

/// Called once when offscreen.html loads
#[wasm_bindgen]
pub fn init_offscreen() {
    if relay().is_some() {
        return;
    }
    init_logging();

    let config = load_config();
    let relay = Relay::new(
        DomRelayHost::new(config.sound.url.clone(), forward_over_runtime()),
        &config.sound,
    );
    RELAY.with(|cell| {
        let _ = cell.set(relay.clone());
    });
    log::info!("Offscreen relay ready");

    spawn_local(async move { relay.start_battery_monitoring().await });
}

#[wasm_bindgen]
pub fn handle_offscreen_message(message: JsValue) -> js_sys::Promise {
    future_to_promise(async move {
        let request: Request = from_js(&message).map_err(to_js_err)?;
        let relay = relay().ok_or_else(|| JsValue::from_str("Offscreen relay not initialized"))?;

        match relay.dispatch(&request).await {
            Some(response) => to_js(&response).map_err(to_js_err),
            None => Ok(JsValue::UNDEFINED),
        }
    })
}
