// Thin bindings over the extension and DOM APIs
// Everything returning a promise is async and maps rejections to anyhow

pub mod action;
pub mod alarms;
pub mod audio;
pub mod battery;
pub mod js;
pub mod notifications;
pub mod offscreen;
pub mod power;
pub mod runtime;
pub mod storage;
