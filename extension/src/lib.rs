#[cfg(feature = "popup")]
use dioxus::prelude::*;

#[cfg(feature = "popup")]
pub mod icons;
pub mod platform;
pub mod services;

use nosleep_core::Config;

/// Configuration bundled into every context at build time
pub fn load_config() -> Config {
    Config::from_toml_or_default(include_str!("../nosleep.toml"))
}

/// Install the console logger for this context
pub fn init_logging() {
    wasm_logger::init(wasm_logger::Config::default());
}

#[cfg(feature = "popup")]
mod popup {
    use super::*;
    use nosleep_core::{BatteryReading, PopupView, Request, StatusResponse, ToggleResponse};

    use crate::services::runtime;

    #[component]
    pub fn App() -> Element {
        let mut enabled = use_signal(|| false);
        let mut battery = use_signal(|| None::<BatteryReading>);
        let mut error = use_signal(|| None::<String>);

        // Status is queried on every open, nothing is kept between opens
        use_future(move || async move {
            match runtime::request::<StatusResponse>(&Request::GetStatus).await {
                Ok(status) => {
                    enabled.set(status.enabled);
                    battery.set(status.battery);
                }
                Err(e) => {
                    log::error!("getStatus failed: {:#}", e);
                    error.set(Some("Background not reachable".to_string()));
                }
            }
        });

        let view = PopupView::new(enabled(), battery().as_ref());
        let error_text = error().unwrap_or_default();

        let on_toggle = move |_: MouseEvent| {
            let next = !enabled();
            spawn(async move {
                match runtime::request::<ToggleResponse>(&Request::Toggle { enabled: next }).await {
                    Ok(reply) if reply.success => enabled.set(reply.enabled),
                    Ok(_) => log::warn!("Toggle was not applied"),
                    Err(e) => {
                        log::error!("Toggle failed: {:#}", e);
                        error.set(Some("Toggle failed".to_string()));
                    }
                }
            });
        };

        let on_test = move |_: MouseEvent| {
            spawn(async move {
                if let Err(e) = runtime::send(&Request::TestNotification).await {
                    log::error!("Test notification failed: {:#}", e);
                }
            });
        };

        rsx! {
            div { class: "container",
                div { class: "header",
                    icons::Power { class: Some("icon".to_string()) }
                    h1 { "No Sleep" }
                }

                p { id: "statusText", class: "status", "{view.status_text}" }

                button {
                    id: "toggleBtn",
                    class: "{view.button_class}",
                    onclick: on_toggle,
                    "{view.button_label}"
                }

                div { id: "batteryInfo", class: "battery",
                    match battery().map(|b| b.charging) {
                        Some(true) => rsx! { icons::BatteryCharging { class: Some("icon-sm".to_string()) } },
                        Some(false) => rsx! { icons::Battery { class: Some("icon-sm".to_string()) } },
                        None => rsx! {},
                    }
                    span { "{view.battery_text}" }
                }

                button { class: "test-btn", onclick: on_test,
                    icons::Bell { class: Some("icon-sm".to_string()) }
                    span { "Test Notification" }
                }

                if !error_text.is_empty() {
                    p { class: "error", "{error_text}" }
                }
            }
        }
    }
}

#[cfg(feature = "popup")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn run() {
    init_logging();
    log::info!("No Sleep popup starting...");
    dioxus::launch(popup::App);
}
