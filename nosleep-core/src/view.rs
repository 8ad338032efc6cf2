use crate::message::BatteryReading;

/// Text shown by the popup for a given status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopupView {
    pub status_text: &'static str,
    pub button_label: &'static str,
    pub button_class: &'static str,
    pub battery_text: String,
}

impl PopupView {
    pub fn new(enabled: bool, battery: Option<&BatteryReading>) -> Self {
        let (status_text, button_label, button_class) = if enabled {
            ("🟢 Active - Computer Won't Sleep", "Disable", "toggle-btn enabled")
        } else {
            ("🔴 Inactive - Normal Sleep Mode", "Enable", "toggle-btn disabled")
        };

        let battery_text = match battery {
            Some(b) => {
                let source = if b.charging { "🔌 Charging" } else { "🔋 On Battery" };
                format!("{} - {}%", source, b.level)
            }
            None => "Battery info not available".to_string(),
        };

        Self {
            status_text,
            button_label,
            button_class,
            battery_text,
        }
    }
}
