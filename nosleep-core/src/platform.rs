// Platform services the coordinator depends on
// Chrome implementations live in the extension crate, tests use fakes

use anyhow::Result;
use async_trait::async_trait;

use crate::config::KeepAwakeLevel;
use crate::notification::Notification;

/// Power, badge and notification APIs of the background context.
#[async_trait(?Send)]
pub trait Host {
    /// Assert the keep-awake request. Called at most once while held.
    fn request_keep_awake(&self, level: KeepAwakeLevel);

    fn release_keep_awake(&self);

    /// Reflect the enabled flag on the toolbar icon
    fn set_badge(&self, enabled: bool);

    async fn show_notification(&self, notification: &Notification) -> Result<()>;
}

/// Load/save boundary for the persisted enabled flag.
#[async_trait(?Send)]
pub trait FlagStore {
    /// Returns `false` when nothing was stored yet
    async fn load_enabled(&self) -> Result<bool>;

    async fn save_enabled(&self, enabled: bool) -> Result<()>;
}
