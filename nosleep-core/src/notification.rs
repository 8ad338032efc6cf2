use serde::Serialize;

/// A user-visible notification, rendered by `chrome.notifications.create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
        }
    }

    pub fn enabled() -> Self {
        Self::new("No Sleep Enabled", "Your computer will stay awake")
    }

    pub fn disabled() -> Self {
        Self::new("No Sleep Disabled", "Your computer can sleep normally")
    }

    pub fn low_battery(level: u8) -> Self {
        Self::new(
            "Low Battery Warning",
            format!("Battery is at {}%. Consider charging your device.", level),
        )
    }

    pub fn full_battery(level: u8) -> Self {
        Self::new(
            "Battery Almost Full",
            format!(
                "Battery is at {}%. Consider unplugging to preserve battery health.",
                level
            ),
        )
    }

    pub fn test() -> Self {
        Self::new("Test Notification", "Notifications are working")
    }
}
