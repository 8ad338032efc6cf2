// Chrome implementations of the core platform traits

use anyhow::Result;
use async_trait::async_trait;
use futures::future::LocalBoxFuture;
use nosleep_core::config::{NotificationConfig, OffscreenConfig};
use nosleep_core::relay::RelayHost;
use nosleep_core::{
    BatteryReading, DocumentHost, Host, KeepAwakeLevel, Notification, PlatformSupport,
    RelayChannel, Request,
};
use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use crate::services::audio::NotificationSound;
use crate::services::{action, battery, notifications, offscreen, power, runtime};

/// What the current context offers
pub fn detect_support() -> PlatformSupport {
    PlatformSupport {
        offscreen_api: offscreen::is_available(),
        dom_audio: NotificationSound::is_available(),
    }
}

/// Power, badge and notifications of the service worker.
pub struct ChromeHost {
    notifications: NotificationConfig,
}

impl ChromeHost {
    pub fn new(notifications: NotificationConfig) -> Self {
        Self { notifications }
    }
}

#[async_trait(?Send)]
impl Host for ChromeHost {
    fn request_keep_awake(&self, level: KeepAwakeLevel) {
        power::request(level);
    }

    fn release_keep_awake(&self) {
        power::release();
    }

    fn set_badge(&self, enabled: bool) {
        if let Err(e) = action::set_badge(enabled) {
            log::warn!("Could not update badge: {:?}", e);
        }
    }

    async fn show_notification(&self, notification: &Notification) -> Result<()> {
        let id = notifications::show(notification, &self.notifications).await?;
        log::debug!("Notification {} shown: {}", id, notification.title);
        Ok(())
    }
}

pub struct ChromeDocumentHost {
    config: OffscreenConfig,
}

impl ChromeDocumentHost {
    pub fn new(config: OffscreenConfig) -> Self {
        Self { config }
    }
}

#[async_trait(?Send)]
impl DocumentHost for ChromeDocumentHost {
    async fn has_document(&self) -> Result<bool> {
        offscreen::exists(&self.config.url).await
    }

    async fn create_document(&self) -> Result<()> {
        offscreen::create(&self.config.url, &self.config.justification).await
    }
}

/// Relay requests over `chrome.runtime.sendMessage`.
pub struct RuntimeChannel;

#[async_trait(?Send)]
impl RelayChannel for RuntimeChannel {
    async fn send(&self, request: &Request) -> Result<serde_json::Value> {
        runtime::send(request).await
    }
}

/// Relay side: DOM audio, the battery sensor and a way back to the
/// coordinator.
pub struct DomRelayHost {
    sound_url: String,
    sound: RefCell<Option<Rc<NotificationSound>>>,
    forward: Box<dyn Fn(BatteryReading)>,
}

impl DomRelayHost {
    pub fn new(sound_url: impl Into<String>, forward: Box<dyn Fn(BatteryReading)>) -> Self {
        Self {
            sound_url: sound_url.into(),
            sound: RefCell::new(None),
            forward,
        }
    }

    /// Audio element, created on first play
    fn sound(&self) -> Result<Rc<NotificationSound>> {
        let mut slot = self.sound.borrow_mut();
        if let Some(sound) = slot.as_ref() {
            return Ok(sound.clone());
        }
        let sound = Rc::new(NotificationSound::new(&self.sound_url)?);
        *slot = Some(sound.clone());
        Ok(sound)
    }
}

#[async_trait(?Send)]
impl RelayHost for DomRelayHost {
    async fn play_cue(&self) -> Result<()> {
        let sound = self.sound()?;
        sound.play().await
    }

    async fn sleep(&self, duration: Duration) {
        gloo_timers::future::sleep(duration).await;
    }

    fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
        wasm_bindgen_futures::spawn_local(task);
    }

    async fn watch_battery(
        &self,
        on_change: Box<dyn Fn(BatteryReading)>,
    ) -> Result<Option<BatteryReading>> {
        battery::watch(on_change).await
    }

    fn forward_battery(&self, reading: BatteryReading) {
        (self.forward)(reading);
    }
}

/// Forward readings from the offscreen document as `batteryUpdate`.
pub fn forward_over_runtime() -> Box<dyn Fn(BatteryReading)> {
    Box::new(|reading| {
        wasm_bindgen_futures::spawn_local(async move {
            if let Err(e) = runtime::send(&Request::BatteryUpdate(reading)).await {
                log::warn!("Battery update not delivered: {:#}", e);
            }
        });
    })
}
