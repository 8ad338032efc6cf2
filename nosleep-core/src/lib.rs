//! Platform-independent core of the No Sleep extension.
//!
//! The background coordinator, the audio/sensor relay and the popup view
//! are written against the traits in [`platform`], [`relay`],
//! [`offscreen`] and [`capability`]; the `extension` crate supplies the
//! Chrome implementations.

pub mod alerts;
pub mod capability;
pub mod config;
pub mod coordinator;
pub mod message;
pub mod notification;
pub mod offscreen;
pub mod platform;
pub mod relay;
pub mod state;
pub mod view;

pub use capability::{
    CapabilityKind, CapabilityProvider, DirectCapabilities, PlatformSupport, ProxiedCapabilities,
    RelayChannel, UnsupportedCapabilities,
};
pub use config::{Config, KeepAwakeLevel};
pub use coordinator::Coordinator;
pub use message::{
    Ack, BatteryReading, BatteryResponse, Request, Response, StatusResponse, ToggleResponse,
};
pub use notification::Notification;
pub use offscreen::{DocumentHost, OffscreenGuard};
pub use platform::{FlagStore, Host};
pub use relay::{Relay, RelayHost};
pub use view::PopupView;
