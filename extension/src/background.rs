// Background service worker for No Sleep
// Minimal dependencies - no Dioxus, built with --no-default-features
// All business logic in Rust, JavaScript is just glue to Chrome APIs

use std::cell::OnceCell;
use std::rc::Rc;

use nosleep_core::{
    BatteryReading, CapabilityKind, CapabilityProvider, Config, Coordinator, DirectCapabilities,
    OffscreenGuard, ProxiedCapabilities, Relay, Request, UnsupportedCapabilities,
};
use nosleep_extension::platform::{
    detect_support, ChromeDocumentHost, ChromeHost, DomRelayHost, RuntimeChannel,
};
use nosleep_extension::services::js::{from_js, to_js, to_js_err};
use nosleep_extension::services::{alarms, storage::StorageManager};
use nosleep_extension::{init_logging, load_config};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

// Dummy main for binary target
fn main() {}

thread_local! {
    static COORDINATOR: OnceCell<Rc<Coordinator>> = const { OnceCell::new() };
}

fn coordinator() -> Option<Rc<Coordinator>> {
    COORDINATOR.with(|cell| cell.get().cloned())
}

fn capabilities(config: &Config) -> Rc<dyn CapabilityProvider> {
    let support = detect_support();
    match CapabilityKind::select(&support) {
        CapabilityKind::Proxied => Rc::new(ProxiedCapabilities::new(
            OffscreenGuard::new(ChromeDocumentHost::new(config.offscreen.clone())),
            RuntimeChannel,
        )),
        CapabilityKind::Direct => {
            // Readings come back through the same coordinator, never re-entrantly
            let forward = Box::new(|reading: BatteryReading| {
                if let Some(coordinator) = coordinator() {
                    spawn_local(async move { coordinator.battery_update(reading).await });
                }
            });
            let host = DomRelayHost::new(config.sound.url.clone(), forward);
            Rc::new(DirectCapabilities::new(Relay::new(host, &config.sound)))
        }
        CapabilityKind::Unsupported => {
            log::warn!("No offscreen API and no DOM audio, sound and battery disabled");
            Rc::new(UnsupportedCapabilities)
        }
    }
}

/// Initialize background service worker
/// Called from JavaScript glue on every worker start
#[wasm_bindgen]
pub fn init_background() {
    if coordinator().is_some() {
        return;
    }
    init_logging();

    let config = load_config();
    let coordinator = Rc::new(Coordinator::new(
        config.clone(),
        Rc::new(ChromeHost::new(config.notifications.clone())),
        Rc::new(StorageManager::new()),
        capabilities(&config),
    ));
    COORDINATOR.with(|cell| {
        let _ = cell.set(coordinator.clone());
    });
    log::info!("No Sleep background service initialized");

    spawn_local(async move {
        let keep_alive = &coordinator.config().keep_alive;
        if let Err(e) =
            alarms::create_periodic(&keep_alive.alarm_name, keep_alive.period_minutes).await
        {
            log::warn!("Keep-alive alarm not created: {:#}", e);
        }
        coordinator.startup().await;
    });
}

/// Handle extension installation or update
#[wasm_bindgen]
pub fn handle_install() {
    log::info!("Extension installed or updated");
    if let Some(coordinator) = coordinator() {
        spawn_local(async move { coordinator.startup().await });
    }
}

/// Handle a runtime message, resolves to the response object or
/// `undefined` when there is nothing to answer.
#[wasm_bindgen]
pub fn handle_message(message: JsValue) -> js_sys::Promise {
    future_to_promise(async move {
        let request: Request = match from_js(&message) {
            Ok(request) => request,
            Err(e) => {
                log::debug!("Ignoring message: {:#}", e);
                return Ok(JsValue::UNDEFINED);
            }
        };
        let coordinator =
            coordinator().ok_or_else(|| JsValue::from_str("Background not initialized"))?;

        match coordinator.dispatch(request).await {
            Some(response) => to_js(&response).map_err(to_js_err),
            None => Ok(JsValue::UNDEFINED),
        }
    })
}

/// Handle a chrome.alarms tick
#[wasm_bindgen]
pub fn handle_alarm(name: String) {
    if let Some(coordinator) = coordinator() {
        spawn_local(async move {
            if !coordinator.on_alarm(&name).await {
                log::debug!("Ignoring alarm {}", name);
            }
        });
    }
}
