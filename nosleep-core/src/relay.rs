// Audio/sensor relay
//
// Runs in the context that can reach HTMLAudioElement and navigator.getBattery
// (the offscreen document, or the background itself when it has a DOM).
// Plays the notification cue and forwards battery changes to the coordinator.

use anyhow::Result;
use async_trait::async_trait;
use futures::future::{FutureExt, LocalBoxFuture};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use std::time::Duration;

use crate::config::SoundConfig;
use crate::message::{BatteryReading, BatteryResponse, Request, Response};

/// Browser capabilities of the relay context.
#[async_trait(?Send)]
pub trait RelayHost {
    /// Play the notification cue once from the start
    async fn play_cue(&self) -> Result<()>;

    async fn sleep(&self, duration: Duration);

    /// Run a task detached from the caller
    fn spawn(&self, task: LocalBoxFuture<'static, ()>);

    /// Subscribe to level and charging changes.
    ///
    /// Returns the current reading, `None` while the sensor has no level
    /// yet. Fails when the sensor is unavailable.
    async fn watch_battery(
        &self,
        on_change: Box<dyn Fn(BatteryReading)>,
    ) -> Result<Option<BatteryReading>>;

    /// Deliver a reading to the coordinator
    fn forward_battery(&self, reading: BatteryReading);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Monitoring {
    Idle,
    Starting,
    Running,
    Unsupported,
}

pub struct Relay<H: RelayHost + 'static> {
    inner: Rc<RelayInner<H>>,
}

impl<H: RelayHost + 'static> Clone for Relay<H> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

struct RelayInner<H> {
    host: H,
    plays: u32,
    spacing: Duration,
    battery: RefCell<Option<BatteryReading>>,
    monitoring: Cell<Monitoring>,
}

impl<H: RelayHost + 'static> Relay<H> {
    pub fn new(host: H, sound: &SoundConfig) -> Self {
        Self {
            inner: Rc::new(RelayInner {
                host,
                plays: sound.plays.max(1),
                spacing: sound.spacing(),
                battery: RefCell::new(None),
                monitoring: Cell::new(Monitoring::Idle),
            }),
        }
    }

    pub fn host(&self) -> &H {
        &self.inner.host
    }

    pub fn battery(&self) -> Option<BatteryReading> {
        *self.inner.battery.borrow()
    }

    pub fn monitoring(&self) -> Monitoring {
        self.inner.monitoring.get()
    }

    /// Handle a runtime message addressed to the relay.
    ///
    /// Returns `None` for actions owned by the coordinator.
    pub async fn dispatch(&self, request: &Request) -> Option<Response> {
        match request {
            Request::PlaySound => {
                self.play_sound();
                Some(Response::ok())
            }
            Request::StartBatteryMonitoring => {
                self.start_battery_monitoring().await;
                Some(Response::ok())
            }
            Request::GetBattery => Some(Response::Battery(BatteryResponse {
                battery: self.battery(),
            })),
            _ => None,
        }
    }

    /// Start the cue sequence in the background and return immediately.
    pub fn play_sound(&self) {
        self.inner.host.spawn(self.sound_sequence());
    }

    /// The cue played `plays` times, `spacing` apart. Failed plays are
    /// logged and do not stop the sequence.
    pub fn sound_sequence(&self) -> LocalBoxFuture<'static, ()> {
        let inner = self.inner.clone();
        async move {
            for attempt in 0..inner.plays {
                if attempt > 0 {
                    inner.host.sleep(inner.spacing).await;
                }
                if let Err(e) = inner.host.play_cue().await {
                    log::error!("Error playing sound (play {}): {:#}", attempt + 1, e);
                }
            }
        }
        .boxed_local()
    }

    /// Subscribe to the sensor once per relay lifetime.
    pub async fn start_battery_monitoring(&self) {
        if self.inner.monitoring.get() != Monitoring::Idle {
            log::debug!("Battery monitoring already {:?}", self.inner.monitoring.get());
            return;
        }
        self.inner.monitoring.set(Monitoring::Starting);

        let weak: Weak<RelayInner<H>> = Rc::downgrade(&self.inner);
        let on_change = Box::new(move |reading: BatteryReading| {
            if let Some(inner) = weak.upgrade() {
                Relay { inner }.record(reading);
            }
        });

        match self.inner.host.watch_battery(on_change).await {
            Ok(initial) => {
                self.inner.monitoring.set(Monitoring::Running);
                log::info!("Battery monitoring started");
                if let Some(reading) = initial {
                    self.record(reading);
                }
            }
            Err(e) => {
                self.inner.monitoring.set(Monitoring::Unsupported);
                log::warn!("Battery API not supported: {:#}", e);
            }
        }
    }

    fn record(&self, reading: BatteryReading) {
        log::debug!("Battery: {}% charging={}", reading.level, reading.charging);
        *self.inner.battery.borrow_mut() = Some(reading);
        self.inner.host.forward_battery(reading);
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use futures::executor::block_on;

    #[derive(Default)]
    pub(crate) struct FakeRelayHost {
        pub events: RefCell<Vec<String>>,
        pub spawned: RefCell<Vec<LocalBoxFuture<'static, ()>>>,
        pub forwarded: RefCell<Vec<BatteryReading>>,
        pub on_change: RefCell<Option<Box<dyn Fn(BatteryReading)>>>,
        pub watch_calls: Cell<u32>,
        pub fail_plays: Cell<u32>,
        pub no_sensor: bool,
        pub no_level: bool,
    }

    impl FakeRelayHost {
        pub(crate) fn run_spawned(&self) {
            let tasks: Vec<_> = self.spawned.borrow_mut().drain(..).collect();
            for task in tasks {
                block_on(task);
            }
        }

        pub(crate) fn emit(&self, reading: BatteryReading) {
            if let Some(cb) = self.on_change.borrow().as_ref() {
                cb(reading);
            }
        }
    }

    #[async_trait(?Send)]
    impl RelayHost for FakeRelayHost {
        async fn play_cue(&self) -> Result<()> {
            self.events.borrow_mut().push("play".into());
            if self.fail_plays.get() > 0 {
                self.fail_plays.set(self.fail_plays.get() - 1);
                anyhow::bail!("autoplay blocked");
            }
            Ok(())
        }

        async fn sleep(&self, duration: Duration) {
            self.events
                .borrow_mut()
                .push(format!("sleep {}ms", duration.as_millis()));
        }

        fn spawn(&self, task: LocalBoxFuture<'static, ()>) {
            self.spawned.borrow_mut().push(task);
        }

        async fn watch_battery(
            &self,
            on_change: Box<dyn Fn(BatteryReading)>,
        ) -> Result<Option<BatteryReading>> {
            self.watch_calls.set(self.watch_calls.get() + 1);
            if self.no_sensor {
                anyhow::bail!("navigator.getBattery is undefined");
            }
            *self.on_change.borrow_mut() = Some(on_change);
            if self.no_level {
                return Ok(None);
            }
            Ok(Some(BatteryReading::new(80, true)))
        }

        fn forward_battery(&self, reading: BatteryReading) {
            self.forwarded.borrow_mut().push(reading);
        }
    }

    fn relay(host: FakeRelayHost) -> Relay<FakeRelayHost> {
        Relay::new(host, &SoundConfig::default())
    }

    #[test]
    fn test_play_sound_is_detached() {
        let relay = relay(FakeRelayHost::default());
        let resp = block_on(relay.dispatch(&Request::PlaySound));

        assert_eq!(resp, Some(Response::ok()));
        // Nothing played until the spawned task runs
        assert!(relay.host().events.borrow().is_empty());

        relay.host().run_spawned();
        assert_eq!(
            *relay.host().events.borrow(),
            vec!["play", "sleep 2000ms", "play"]
        );
    }

    #[test]
    fn test_failed_play_continues_sequence() {
        let host = FakeRelayHost::default();
        host.fail_plays.set(1);
        let relay = relay(host);

        block_on(relay.sound_sequence());
        assert_eq!(relay.host().events.borrow().len(), 3);
    }

    #[test]
    fn test_monitoring_starts_once_and_forwards() {
        let relay = relay(FakeRelayHost::default());
        block_on(relay.start_battery_monitoring());
        block_on(relay.start_battery_monitoring());

        assert_eq!(relay.host().watch_calls.get(), 1);
        assert_eq!(relay.monitoring(), Monitoring::Running);

        relay.host().emit(BatteryReading::new(79, false));
        assert_eq!(
            *relay.host().forwarded.borrow(),
            vec![BatteryReading::new(80, true), BatteryReading::new(79, false)]
        );

        let resp = block_on(relay.dispatch(&Request::GetBattery));
        assert_eq!(
            resp,
            Some(Response::Battery(BatteryResponse {
                battery: Some(BatteryReading::new(79, false))
            }))
        );
    }

    #[test]
    fn test_missing_sensor_is_not_fatal() {
        let relay = relay(FakeRelayHost {
            no_sensor: true,
            ..Default::default()
        });
        block_on(relay.start_battery_monitoring());
        block_on(relay.start_battery_monitoring());

        assert_eq!(relay.monitoring(), Monitoring::Unsupported);
        assert_eq!(relay.host().watch_calls.get(), 1);
        assert_eq!(relay.battery(), None);
    }

    #[test]
    fn test_sensor_without_level_forwards_nothing_until_change() {
        let relay = relay(FakeRelayHost {
            no_level: true,
            ..Default::default()
        });
        block_on(relay.start_battery_monitoring());

        assert_eq!(relay.monitoring(), Monitoring::Running);
        assert_eq!(relay.battery(), None);
        assert!(relay.host().forwarded.borrow().is_empty());

        relay.host().emit(BatteryReading::new(55, false));
        assert_eq!(relay.battery(), Some(BatteryReading::new(55, false)));
    }

    #[test]
    fn test_ignores_coordinator_actions() {
        let relay = relay(FakeRelayHost::default());
        assert_eq!(block_on(relay.dispatch(&Request::GetStatus)), None);
    }
}
