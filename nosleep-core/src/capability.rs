// Sound and battery capabilities as seen from the coordinator
//
// The background service worker has neither HTMLAudioElement nor
// navigator.getBattery. Depending on what the browser offers, the relay
// logic either runs in-process (Direct) or behind an offscreen document
// reached over runtime messaging (Proxied).

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;

use crate::message::{Ack, BatteryReading, BatteryResponse, Request};
use crate::offscreen::{DocumentHost, OffscreenGuard};
use crate::relay::{Relay, RelayHost};

#[async_trait(?Send)]
pub trait CapabilityProvider {
    fn kind(&self) -> CapabilityKind;

    /// Trigger the notification cue. Returns once the relay accepted it,
    /// not when playback ends.
    async fn play_sound(&self) -> Result<()>;

    async fn start_battery_monitoring(&self) -> Result<()>;

    async fn get_battery(&self) -> Result<Option<BatteryReading>>;
}

/// What the running browser offers to the background context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlatformSupport {
    /// chrome.offscreen is available
    pub offscreen_api: bool,
    /// The background context has a DOM with Audio
    pub dom_audio: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityKind {
    Direct,
    Proxied,
    Unsupported,
}

impl CapabilityKind {
    pub fn select(support: &PlatformSupport) -> Self {
        if support.offscreen_api {
            CapabilityKind::Proxied
        } else if support.dom_audio {
            CapabilityKind::Direct
        } else {
            CapabilityKind::Unsupported
        }
    }
}

/// Transport for relay requests, `chrome.runtime.sendMessage` in the extension.
#[async_trait(?Send)]
pub trait RelayChannel {
    async fn send(&self, request: &Request) -> Result<serde_json::Value>;
}

/// Relay logic running in the caller's own context.
pub struct DirectCapabilities<H: RelayHost + 'static> {
    relay: Relay<H>,
}

impl<H: RelayHost + 'static> DirectCapabilities<H> {
    pub fn new(relay: Relay<H>) -> Self {
        Self { relay }
    }

    pub fn relay(&self) -> &Relay<H> {
        &self.relay
    }
}

#[async_trait(?Send)]
impl<H: RelayHost + 'static> CapabilityProvider for DirectCapabilities<H> {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Direct
    }

    async fn play_sound(&self) -> Result<()> {
        self.relay.play_sound();
        Ok(())
    }

    async fn start_battery_monitoring(&self) -> Result<()> {
        self.relay.start_battery_monitoring().await;
        Ok(())
    }

    async fn get_battery(&self) -> Result<Option<BatteryReading>> {
        Ok(self.relay.battery())
    }
}

/// Relay in the offscreen document, created on demand.
pub struct ProxiedCapabilities<D: DocumentHost + 'static, C: RelayChannel> {
    guard: OffscreenGuard<D>,
    channel: C,
}

impl<D: DocumentHost + 'static, C: RelayChannel> ProxiedCapabilities<D, C> {
    pub fn new(guard: OffscreenGuard<D>, channel: C) -> Self {
        Self { guard, channel }
    }

    pub fn guard(&self) -> &OffscreenGuard<D> {
        &self.guard
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    async fn request<T: DeserializeOwned>(&self, request: Request) -> Result<T> {
        self.guard.ensure().await?;
        let reply = self
            .channel
            .send(&request)
            .await
            .with_context(|| format!("Relay did not answer {}", request.action()))?;
        serde_json::from_value(reply)
            .with_context(|| format!("Unexpected relay reply to {}", request.action()))
    }

    async fn request_ack(&self, request: Request) -> Result<()> {
        let action = request.action();
        let ack: Ack = self.request(request).await?;
        if !ack.success {
            bail!("Relay rejected {}", action);
        }
        Ok(())
    }
}

#[async_trait(?Send)]
impl<D: DocumentHost + 'static, C: RelayChannel> CapabilityProvider for ProxiedCapabilities<D, C> {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Proxied
    }

    async fn play_sound(&self) -> Result<()> {
        self.request_ack(Request::PlaySound).await
    }

    async fn start_battery_monitoring(&self) -> Result<()> {
        self.request_ack(Request::StartBatteryMonitoring).await
    }

    async fn get_battery(&self) -> Result<Option<BatteryReading>> {
        // No document means nobody has read the sensor yet
        if !self.guard.exists().await? {
            return Ok(None);
        }
        let reply: BatteryResponse = self.request(Request::GetBattery).await?;
        Ok(reply.battery)
    }
}

/// Neither offscreen documents nor DOM audio: skip quietly.
pub struct UnsupportedCapabilities;

#[async_trait(?Send)]
impl CapabilityProvider for UnsupportedCapabilities {
    fn kind(&self) -> CapabilityKind {
        CapabilityKind::Unsupported
    }

    async fn play_sound(&self) -> Result<()> {
        log::debug!("No audio capability, notification sound skipped");
        Ok(())
    }

    async fn start_battery_monitoring(&self) -> Result<()> {
        log::debug!("No battery capability, monitoring skipped");
        Ok(())
    }

    async fn get_battery(&self) -> Result<Option<BatteryReading>> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SoundConfig;
    use crate::offscreen::tests::FakeDocumentHost;
    use crate::relay::tests::FakeRelayHost;
    use futures::executor::block_on;
    use serde_json::json;
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeChannel {
        sent: RefCell<Vec<Request>>,
        reply: RefCell<Option<serde_json::Value>>,
    }

    #[async_trait(?Send)]
    impl RelayChannel for FakeChannel {
        async fn send(&self, request: &Request) -> Result<serde_json::Value> {
            self.sent.borrow_mut().push(request.clone());
            self.reply
                .borrow()
                .clone()
                .context("Receiving end does not exist")
        }
    }

    fn proxied() -> ProxiedCapabilities<FakeDocumentHost, FakeChannel> {
        ProxiedCapabilities::new(
            OffscreenGuard::new(FakeDocumentHost::default()),
            FakeChannel::default(),
        )
    }

    #[test]
    fn test_select_prefers_offscreen() {
        let both = PlatformSupport {
            offscreen_api: true,
            dom_audio: true,
        };
        assert_eq!(CapabilityKind::select(&both), CapabilityKind::Proxied);

        let dom_only = PlatformSupport {
            offscreen_api: false,
            dom_audio: true,
        };
        assert_eq!(CapabilityKind::select(&dom_only), CapabilityKind::Direct);

        assert_eq!(
            CapabilityKind::select(&PlatformSupport::default()),
            CapabilityKind::Unsupported
        );
    }

    #[test]
    fn test_proxied_creates_document_before_sending() {
        let caps = proxied();
        *caps.channel().reply.borrow_mut() = Some(json!({"success": true}));

        block_on(caps.play_sound()).unwrap();
        block_on(caps.play_sound()).unwrap();

        assert_eq!(caps.guard().host().created.get(), 1);
        assert_eq!(
            *caps.channel().sent.borrow(),
            vec![Request::PlaySound, Request::PlaySound]
        );
    }

    #[test]
    fn test_proxied_surfaces_creation_failure() {
        let caps = proxied();
        caps.guard().host().fail.set(true);

        assert!(block_on(caps.start_battery_monitoring()).is_err());
        assert!(caps.channel().sent.borrow().is_empty());
    }

    #[test]
    fn test_proxied_rejected_ack() {
        let caps = proxied();
        *caps.channel().reply.borrow_mut() = Some(json!({"success": false}));
        assert!(block_on(caps.play_sound()).is_err());
    }

    #[test]
    fn test_proxied_battery_without_document() {
        let caps = proxied();
        assert_eq!(block_on(caps.get_battery()).unwrap(), None);
        assert_eq!(caps.guard().host().created.get(), 0);

        caps.guard().host().open.set(true);
        *caps.channel().reply.borrow_mut() =
            Some(json!({"battery": {"level": 64, "charging": true}}));
        assert_eq!(
            block_on(caps.get_battery()).unwrap(),
            Some(crate::message::BatteryReading::new(64, true))
        );
    }

    #[test]
    fn test_direct_runs_relay_in_process() {
        let relay = Relay::new(FakeRelayHost::default(), &SoundConfig::default());
        let caps = DirectCapabilities::new(relay);

        block_on(caps.start_battery_monitoring()).unwrap();
        assert_eq!(
            block_on(caps.get_battery()).unwrap(),
            Some(BatteryReading::new(80, true))
        );

        block_on(caps.play_sound()).unwrap();
        assert_eq!(caps.relay().host().spawned.borrow().len(), 1);
    }
}
