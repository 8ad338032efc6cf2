// Battery threshold rules with one-shot debounce
//
// Each rule fires when its condition becomes true and stays quiet until the
// condition has cleared at least once.

use crate::message::BatteryReading;
use crate::notification::Notification;

/// Alert below this level while discharging
pub const LOW_BATTERY_THRESHOLD: u8 = 20;
/// Alert above this level while charging
pub const FULL_BATTERY_THRESHOLD: u8 = 95;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryAlert {
    Low { level: u8 },
    Full { level: u8 },
}

impl BatteryAlert {
    pub fn notification(&self) -> Notification {
        match *self {
            BatteryAlert::Low { level } => Notification::low_battery(level),
            BatteryAlert::Full { level } => Notification::full_battery(level),
        }
    }
}

fn is_low(reading: &BatteryReading) -> bool {
    reading.level < LOW_BATTERY_THRESHOLD && !reading.charging
}

fn is_full(reading: &BatteryReading) -> bool {
    reading.level > FULL_BATTERY_THRESHOLD && reading.charging
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NotificationDebounce {
    pub low_battery_notified: bool,
    pub full_battery_notified: bool,
}

impl NotificationDebounce {
    /// Evaluate both rules against a new reading.
    ///
    /// Returns the alerts that should be shown now. The rules are
    /// independent, but their conditions are mutually exclusive on
    /// `charging`, so at most one alert is returned per reading.
    pub fn evaluate(&mut self, reading: &BatteryReading) -> Vec<BatteryAlert> {
        let mut alerts = Vec::new();

        if is_low(reading) {
            if !self.low_battery_notified {
                self.low_battery_notified = true;
                alerts.push(BatteryAlert::Low {
                    level: reading.level,
                });
            }
        } else {
            self.low_battery_notified = false;
        }

        if is_full(reading) {
            if !self.full_battery_notified {
                self.full_battery_notified = true;
                alerts.push(BatteryAlert::Full {
                    level: reading.level,
                });
            }
        } else {
            self.full_battery_notified = false;
        }

        alerts
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(debounce: &mut NotificationDebounce, levels: &[u8], charging: bool) -> Vec<BatteryAlert> {
        levels
            .iter()
            .flat_map(|&level| debounce.evaluate(&BatteryReading::new(level, charging)))
            .collect()
    }

    #[test]
    fn test_low_battery_fires_once_per_entry() {
        let mut debounce = NotificationDebounce::default();
        let alerts = run(&mut debounce, &[25, 18, 15, 22], false);
        assert_eq!(alerts, vec![BatteryAlert::Low { level: 18 }]);

        // Dropping below again after recovering re-arms the rule
        let alerts = run(&mut debounce, &[19], false);
        assert_eq!(alerts, vec![BatteryAlert::Low { level: 19 }]);
    }

    #[test]
    fn test_plugging_in_clears_low_condition() {
        let mut debounce = NotificationDebounce::default();
        assert_eq!(run(&mut debounce, &[10], false).len(), 1);
        assert!(run(&mut debounce, &[10], true).is_empty());
        assert!(!debounce.low_battery_notified);
        assert_eq!(run(&mut debounce, &[10], false).len(), 1);
    }

    #[test]
    fn test_full_battery_fires_once_while_charging() {
        let mut debounce = NotificationDebounce::default();
        let alerts = run(&mut debounce, &[96, 97, 97, 100], true);
        assert_eq!(alerts, vec![BatteryAlert::Full { level: 96 }]);
    }

    #[test]
    fn test_thresholds_are_strict() {
        let mut debounce = NotificationDebounce::default();
        assert!(run(&mut debounce, &[20], false).is_empty());
        assert!(run(&mut debounce, &[95], true).is_empty());
    }

    #[test]
    fn test_alert_messages() {
        let n = BatteryAlert::Low { level: 18 }.notification();
        assert_eq!(n.title, "Low Battery Warning");
        assert_eq!(n.message, "Battery is at 18%. Consider charging your device.");
    }
}
