// Coordinator state and its synchronous transitions
//
// Transitions only mutate memory and describe the platform work to do as a
// list of effects. The coordinator performs the effects afterwards, so no
// state borrow is ever held across an await.

use crate::alerts::NotificationDebounce;
use crate::message::{BatteryReading, StatusResponse};
use crate::notification::Notification;

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    RequestKeepAwake,
    ReleaseKeepAwake,
    PersistEnabled(bool),
    Badge(bool),
    StartBatteryMonitoring,
    Notify(Notification),
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct CoordinatorState {
    pub enabled: bool,
    pub battery: Option<BatteryReading>,
    pub debounce: NotificationDebounce,
    /// True while our keep-awake request is outstanding
    pub keep_awake_held: bool,
    /// Bumped on every toggle, lets startup detect a toggle that raced the storage read
    pub generation: u64,
}

impl CoordinatorState {
    pub fn status(&self) -> StatusResponse {
        StatusResponse {
            enabled: self.enabled,
            battery: self.battery,
        }
    }

    pub fn toggle(&mut self, enabled: bool) -> Vec<Effect> {
        self.enabled = enabled;
        self.generation += 1;

        let (mut effects, notification) = if enabled {
            (self.acquire(), Notification::enabled())
        } else {
            (self.release(), Notification::disabled())
        };

        // Power and badge calls are synchronous and go before the storage write
        let at = effects
            .iter()
            .position(|e| *e == Effect::StartBatteryMonitoring)
            .unwrap_or(effects.len());
        effects.insert(at, Effect::PersistEnabled(enabled));
        effects.push(Effect::Notify(notification));
        effects
    }

    /// Apply the flag loaded from storage at startup.
    ///
    /// Ignored when a toggle happened after `generation` was sampled.
    pub fn restore(&mut self, enabled: bool, generation: u64) -> Vec<Effect> {
        if self.generation != generation {
            return Vec::new();
        }
        self.enabled = enabled;
        if enabled {
            self.acquire()
        } else {
            Vec::new()
        }
    }

    pub fn battery_update(&mut self, reading: BatteryReading) -> Vec<Effect> {
        self.battery = Some(reading);
        if !self.enabled {
            return Vec::new();
        }

        self.debounce
            .evaluate(&reading)
            .into_iter()
            .map(|alert| Effect::Notify(alert.notification()))
            .collect()
    }

    fn acquire(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if !self.keep_awake_held {
            self.keep_awake_held = true;
            effects.push(Effect::RequestKeepAwake);
        }
        effects.push(Effect::Badge(true));
        effects.push(Effect::StartBatteryMonitoring);
        effects
    }

    fn release(&mut self) -> Vec<Effect> {
        let mut effects = Vec::new();
        if self.keep_awake_held {
            self.keep_awake_held = false;
            effects.push(Effect::ReleaseKeepAwake);
        }
        // Re-enabling starts a fresh session, so alerts re-arm
        self.debounce.reset();
        effects.push(Effect::Badge(false));
        effects
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn count(effects: &[Effect], wanted: &Effect) -> usize {
        effects.iter().filter(|e| *e == wanted).count()
    }

    #[test]
    fn test_enable_twice_requests_once() {
        let mut state = CoordinatorState::default();
        let first = state.toggle(true);
        let second = state.toggle(true);

        assert_eq!(count(&first, &Effect::RequestKeepAwake), 1);
        assert_eq!(count(&second, &Effect::RequestKeepAwake), 0);
        assert!(state.keep_awake_held);
    }

    #[test]
    fn test_toggle_touches_platform_before_storage() {
        let mut state = CoordinatorState::default();
        assert_eq!(
            state.toggle(true),
            vec![
                Effect::RequestKeepAwake,
                Effect::Badge(true),
                Effect::PersistEnabled(true),
                Effect::StartBatteryMonitoring,
                Effect::Notify(Notification::enabled()),
            ]
        );
        assert_eq!(
            state.toggle(false),
            vec![
                Effect::ReleaseKeepAwake,
                Effect::Badge(false),
                Effect::PersistEnabled(false),
                Effect::Notify(Notification::disabled()),
            ]
        );
    }

    #[test]
    fn test_disable_when_disabled_releases_nothing() {
        let mut state = CoordinatorState::default();
        let effects = state.toggle(false);
        assert_eq!(count(&effects, &Effect::ReleaseKeepAwake), 0);
        assert_eq!(count(&effects, &Effect::PersistEnabled(false)), 1);
    }

    #[test]
    fn test_battery_ignored_while_disabled() {
        let mut state = CoordinatorState::default();
        let effects = state.battery_update(BatteryReading::new(5, false));
        assert!(effects.is_empty());
        assert_eq!(state.battery, Some(BatteryReading::new(5, false)));
        assert!(!state.debounce.low_battery_notified);
    }

    #[test]
    fn test_restore_skipped_after_toggle() {
        let mut state = CoordinatorState::default();
        let generation = state.generation;
        state.toggle(false);

        assert!(state.restore(true, generation).is_empty());
        assert!(!state.enabled);
    }

    #[test]
    fn test_restore_enabled_acquires() {
        let mut state = CoordinatorState::default();
        let effects = state.restore(true, 0);
        assert!(state.enabled);
        assert_eq!(
            effects,
            vec![
                Effect::RequestKeepAwake,
                Effect::Badge(true),
                Effect::StartBatteryMonitoring
            ]
        );
    }
}
