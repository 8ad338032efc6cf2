// Runtime messages exchanged between popup, background and offscreen document
// Wire shape is a JSON object tagged by `action`, e.g. {"action":"toggle","enabled":true}

use serde::{Deserialize, Deserializer, Serialize};

/// A battery sample as reported by the sensor in the relay document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatteryReading {
    /// Charge in percent, 0..=100
    #[serde(deserialize_with = "percent")]
    pub level: u8,
    pub charging: bool,
    /// Seconds until full, only when the sensor reports a finite value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub charging_time: Option<f64>,
    /// Seconds until empty, only when the sensor reports a finite value
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discharging_time: Option<f64>,
}

impl BatteryReading {
    pub fn new(level: u8, charging: bool) -> Self {
        Self {
            level: level.min(100),
            charging,
            charging_time: None,
            discharging_time: None,
        }
    }

    /// Build a reading from the raw BatteryManager values.
    ///
    /// The sensor reports charge as a fraction in 0.0..=1.0 and uses
    /// `Infinity` for unknown durations. A non-finite charge is no reading.
    pub fn from_sensor(
        fraction: f64,
        charging: bool,
        charging_time: f64,
        discharging_time: f64,
    ) -> Option<Self> {
        if !fraction.is_finite() {
            return None;
        }
        let finite = |v: f64| if v.is_finite() { Some(v) } else { None };

        Some(Self {
            level: to_percent(fraction * 100.0),
            charging,
            charging_time: finite(charging_time),
            discharging_time: finite(discharging_time),
        })
    }
}

fn to_percent(value: f64) -> u8 {
    value.round().clamp(0.0, 100.0) as u8
}

/// Levels from other contexts are clamped like sensor readings
fn percent<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u8, D::Error> {
    let value = f64::deserialize(deserializer)?;
    if !value.is_finite() {
        return Err(serde::de::Error::custom("battery level must be a number"));
    }
    Ok(to_percent(value))
}

/// Every action understood by one of the extension contexts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "camelCase")]
pub enum Request {
    // Popup -> background
    Toggle { enabled: bool },
    GetStatus,
    TestNotification,

    // Relay -> background
    BatteryUpdate(BatteryReading),

    // Background -> relay
    PlaySound,
    StartBatteryMonitoring,
    GetBattery,
}

impl Request {
    pub fn action(&self) -> &'static str {
        match self {
            Request::Toggle { .. } => "toggle",
            Request::GetStatus => "getStatus",
            Request::TestNotification => "testNotification",
            Request::BatteryUpdate(_) => "batteryUpdate",
            Request::PlaySound => "playSound",
            Request::StartBatteryMonitoring => "startBatteryMonitoring",
            Request::GetBattery => "getBattery",
        }
    }

    /// Actions answered by the offscreen relay rather than the background.
    pub fn is_relay_action(&self) -> bool {
        matches!(
            self,
            Request::PlaySound | Request::StartBatteryMonitoring | Request::GetBattery
        )
    }

    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ToggleResponse {
    pub success: bool,
    pub enabled: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    pub enabled: bool,
    pub battery: Option<BatteryReading>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ack {
    pub success: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BatteryResponse {
    pub battery: Option<BatteryReading>,
}

/// Reply to a [`Request`], one variant per reply shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Response {
    Toggle(ToggleResponse),
    Status(StatusResponse),
    Ack(Ack),
    Battery(BatteryResponse),
}

impl Response {
    pub fn ok() -> Self {
        Response::Ack(Ack { success: true })
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}
