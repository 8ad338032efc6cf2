// navigator.getBattery() subscription

use anyhow::{anyhow, Result};
use nosleep_core::BatteryReading;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::JsFuture;
use web_sys::BatteryManager;

use super::js::js_err;

fn read(manager: &BatteryManager) -> Option<BatteryReading> {
    BatteryReading::from_sensor(
        manager.level(),
        manager.charging(),
        manager.charging_time(),
        manager.discharging_time(),
    )
}

async fn battery_manager() -> Result<BatteryManager> {
    let navigator = js_sys::Reflect::get(&js_sys::global(), &"navigator".into()).map_err(js_err)?;
    let get_battery = js_sys::Reflect::get(&navigator, &"getBattery".into())
        .map_err(js_err)?
        .dyn_into::<js_sys::Function>()
        .map_err(|_| anyhow!("navigator.getBattery is not available"))?;

    let promise = get_battery
        .call0(&navigator)
        .map_err(js_err)?
        .dyn_into::<js_sys::Promise>()
        .map_err(|_| anyhow!("navigator.getBattery did not return a promise"))?;

    let manager = JsFuture::from(promise).await.map_err(js_err)?;
    Ok(manager.unchecked_into())
}

/// Call `on_change` on every level or charging change for the lifetime
/// of the document. Returns the current reading. Samples without a
/// finite level are dropped.
pub async fn watch(on_change: Box<dyn Fn(BatteryReading)>) -> Result<Option<BatteryReading>> {
    let manager = battery_manager().await?;

    let reader = manager.clone();
    let callback = Closure::wrap(Box::new(move || {
        match read(&reader) {
            Some(reading) => on_change(reading),
            None => log::debug!("Battery event without a level, skipped"),
        }
    }) as Box<dyn Fn()>);

    for event in ["levelchange", "chargingchange"] {
        manager
            .add_event_listener_with_callback(event, callback.as_ref().unchecked_ref())
            .map_err(js_err)?;
    }
    callback.forget();

    Ok(read(&manager))
}
