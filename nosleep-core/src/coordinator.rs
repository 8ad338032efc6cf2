// Background coordinator
//
// Owns the enabled flag, the keep-awake request and the battery alert
// debounce. Every runtime message for the background goes through
// `dispatch`.

use std::cell::RefCell;
use std::rc::Rc;

use crate::capability::CapabilityProvider;
use crate::config::Config;
use crate::message::{BatteryReading, Request, Response, StatusResponse, ToggleResponse};
use crate::notification::Notification;
use crate::platform::{FlagStore, Host};
use crate::state::{CoordinatorState, Effect};

pub struct Coordinator {
    config: Config,
    host: Rc<dyn Host>,
    store: Rc<dyn FlagStore>,
    capabilities: Rc<dyn CapabilityProvider>,
    state: RefCell<CoordinatorState>,
}

impl Coordinator {
    pub fn new(
        config: Config,
        host: Rc<dyn Host>,
        store: Rc<dyn FlagStore>,
        capabilities: Rc<dyn CapabilityProvider>,
    ) -> Self {
        log::debug!("Coordinator using {:?} capabilities", capabilities.kind());
        Self {
            config,
            host,
            store,
            capabilities,
            state: RefCell::new(CoordinatorState::default()),
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Snapshot of the current state
    pub fn state(&self) -> CoordinatorState {
        self.state.borrow().clone()
    }

    pub fn is_enabled(&self) -> bool {
        self.state.borrow().enabled
    }

    /// Restore the persisted flag. Runs on worker start and on install.
    pub async fn startup(&self) {
        let generation = self.state.borrow().generation;
        let enabled = match self.store.load_enabled().await {
            Ok(enabled) => enabled,
            Err(e) => {
                log::warn!("Could not read stored state, assuming disabled: {:#}", e);
                false
            }
        };

        let effects = self.state.borrow_mut().restore(enabled, generation);
        if enabled && !effects.is_empty() {
            log::info!("No Sleep mode restored from storage");
        }
        self.apply(effects).await;
    }

    /// Route a runtime message. `None` means the action is not ours and
    /// no response should be sent.
    pub async fn dispatch(&self, request: Request) -> Option<Response> {
        match request {
            Request::Toggle { enabled } => Some(Response::Toggle(self.toggle(enabled).await)),
            Request::GetStatus => Some(Response::Status(self.status())),
            Request::BatteryUpdate(reading) => {
                self.battery_update(reading).await;
                Some(Response::ok())
            }
            Request::TestNotification => {
                self.test_notification().await;
                Some(Response::ok())
            }
            Request::PlaySound | Request::StartBatteryMonitoring | Request::GetBattery => None,
        }
    }

    pub async fn toggle(&self, enabled: bool) -> ToggleResponse {
        let effects = self.state.borrow_mut().toggle(enabled);
        log::info!("No Sleep mode {}", if enabled { "enabled" } else { "disabled" });
        self.apply(effects).await;
        ToggleResponse {
            success: true,
            enabled,
        }
    }

    pub fn status(&self) -> StatusResponse {
        self.state.borrow().status()
    }

    pub async fn battery_update(&self, reading: BatteryReading) {
        let effects = self.state.borrow_mut().battery_update(reading);
        self.apply(effects).await;
    }

    pub async fn test_notification(&self) {
        self.notify(&Notification::test()).await;
    }

    /// Handle a chrome.alarms tick. Returns true for the keep-alive alarm.
    ///
    /// While enabled the tick also re-arms battery monitoring, since Chrome
    /// may have closed an idle offscreen document in the meantime.
    pub async fn on_alarm(&self, name: &str) -> bool {
        if name != self.config.keep_alive.alarm_name {
            return false;
        }
        if self.is_enabled() {
            log::info!("Keep alive ping");
            self.apply(vec![Effect::StartBatteryMonitoring]).await;
        }
        true
    }

    async fn apply(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::RequestKeepAwake => self.host.request_keep_awake(self.config.power.level),
                Effect::ReleaseKeepAwake => self.host.release_keep_awake(),
                Effect::Badge(enabled) => self.host.set_badge(enabled),
                Effect::PersistEnabled(enabled) => {
                    if let Err(e) = self.store.save_enabled(enabled).await {
                        log::error!("Failed to persist enabled={}: {:#}", enabled, e);
                    }
                }
                Effect::StartBatteryMonitoring => {
                    if let Err(e) = self.capabilities.start_battery_monitoring().await {
                        log::warn!("Battery monitoring unavailable: {:#}", e);
                    }
                }
                Effect::Notify(notification) => self.notify(&notification).await,
            }
        }
    }

    /// Sound first, then the notification itself.
    async fn notify(&self, notification: &Notification) {
        if let Err(e) = self.capabilities.play_sound().await {
            log::warn!("Could not play sound: {:#}", e);
        }
        if let Err(e) = self.host.show_notification(notification).await {
            log::error!("Failed to show notification '{}': {:#}", notification.title, e);
        }
    }
}
