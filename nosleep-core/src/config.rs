use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;

/// Extension settings, read from the `nosleep.toml` bundled with the build.
///
/// Every section and key is optional; missing values fall back to the
/// defaults below.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub power: PowerConfig,
    pub notifications: NotificationConfig,
    pub sound: SoundConfig,
    pub keep_alive: KeepAliveConfig,
    pub offscreen: OffscreenConfig,
}

/// Level passed to `chrome.power.requestKeepAwake`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KeepAwakeLevel {
    /// Keep the system running, the display may still turn off
    #[default]
    System,
    /// Keep both system and display on
    Display,
}

impl KeepAwakeLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            KeepAwakeLevel::System => "system",
            KeepAwakeLevel::Display => "display",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PowerConfig {
    pub level: KeepAwakeLevel,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    pub icon_url: String,
    /// chrome.notifications priority, -2..=2
    pub priority: i8,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            icon_url: "icons/icon128.png".to_string(),
            priority: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SoundConfig {
    pub url: String,
    pub plays: u32,
    pub spacing_ms: u64,
}

impl SoundConfig {
    pub fn spacing(&self) -> Duration {
        Duration::from_millis(self.spacing_ms)
    }
}

impl Default for SoundConfig {
    fn default() -> Self {
        Self {
            url: "sounds/notification.mp3".to_string(),
            plays: 2,
            spacing_ms: 2000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct KeepAliveConfig {
    pub alarm_name: String,
    pub period_minutes: f64,
}

impl Default for KeepAliveConfig {
    fn default() -> Self {
        Self {
            alarm_name: "keepAlive".to_string(),
            period_minutes: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OffscreenConfig {
    pub url: String,
    pub justification: String,
}

impl Default for OffscreenConfig {
    fn default() -> Self {
        Self {
            url: "offscreen.html".to_string(),
            justification: "Playing notification sound".to_string(),
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        let config: Config = toml::from_str(s).context("Failed to parse nosleep.toml")?;
        config.validate()?;
        Ok(config)
    }

    /// Parse the bundled config, falling back to defaults if it is broken.
    pub fn from_toml_or_default(s: &str) -> Self {
        match Self::from_toml_str(s) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Invalid configuration, using defaults: {:#}", e);
                Self::default()
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.sound.plays == 0 {
            anyhow::bail!("sound.plays must be at least 1");
        }
        if !(-2..=2).contains(&self.notifications.priority) {
            anyhow::bail!(
                "notifications.priority must be within -2..=2, got {}",
                self.notifications.priority
            );
        }
        // chrome.alarms rejects periods below 30 seconds
        if self.keep_alive.period_minutes < 0.5 {
            anyhow::bail!(
                "keep_alive.period_minutes must be at least 0.5, got {}",
                self.keep_alive.period_minutes
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.sound.plays, 2);
        assert_eq!(config.sound.spacing(), Duration::from_secs(2));
        assert_eq!(config.power.level, KeepAwakeLevel::System);
    }

    #[test]
    fn test_partial_override() {
        let config = Config::from_toml_str(
            r#"
            [power]
            level = "display"

            [sound]
            plays = 3
            "#,
        )
        .unwrap();

        assert_eq!(config.power.level.as_str(), "display");
        assert_eq!(config.sound.plays, 3);
        assert_eq!(config.sound.spacing_ms, 2000);
        assert_eq!(config.notifications.icon_url, "icons/icon128.png");
    }

    #[test]
    fn test_invalid_values_fall_back() {
        assert!(Config::from_toml_str("[sound]\nplays = 0").is_err());
        assert!(Config::from_toml_str("[keep_alive]\nperiod_minutes = 0.1").is_err());

        let config = Config::from_toml_or_default("[notifications]\npriority = 7");
        assert_eq!(config.notifications.priority, 2);
    }

    #[test]
    fn test_bundled_config_is_valid() {
        let bundled = include_str!("../../extension/nosleep.toml");
        assert_eq!(Config::from_toml_str(bundled).unwrap(), Config::default());
    }
}
