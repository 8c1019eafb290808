//! Named countdown timers.
//!
//! A [`Cooldowns`] table belongs to one owner (an entity or a system). Timers
//! are plain `f64` seconds so the table serialises with its owner.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A table of named timers.
///
/// A timer is ready when it is absent or has run down to zero. Running down
/// stops at zero, so a long pause never banks extra uses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cooldowns {
    timers: BTreeMap<String, f64>,
}

impl Cooldowns {
    /// An empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `name` is ready.
    #[must_use]
    pub fn can_use(&self, name: &str) -> bool {
        self.timers.get(name).is_none_or(|t| *t <= 0.0)
    }

    /// Arm (or re-arm) `name` for `seconds`.
    pub fn use_for(&mut self, name: &str, seconds: f64) {
        match self.timers.get_mut(name) {
            Some(timer) => *timer = seconds,
            None => {
                self.timers.insert(name.to_string(), seconds);
            }
        }
    }

    /// Seconds left on `name`, zero when ready.
    #[must_use]
    pub fn remaining(&self, name: &str) -> f64 {
        self.timers.get(name).copied().unwrap_or(0.0).max(0.0)
    }

    /// Run every armed timer down by `delta` seconds, stopping at zero.
    pub fn update(&mut self, delta: f64) {
        for timer in self.timers.values_mut() {
            if *timer > 0.0 {
                *timer = (*timer - delta).max(0.0);
            }
        }
    }

    /// If `name` is ready, arm it for `interval` and return `true`.
    pub fn ready(&mut self, name: &str, interval: f64) -> bool {
        if !self.can_use(name) {
            return false;
        }
        self.use_for(name, interval);
        true
    }

    /// If `name` is ready, run `f` and arm `name` for `interval`.
    pub fn do_every<R>(&mut self, name: &str, interval: f64, f: impl FnOnce() -> R) -> Option<R> {
        if !self.can_use(name) {
            return None;
        }
        let result = f();
        self.use_for(name, interval);
        Some(result)
    }

    /// Whether no timer was ever armed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    /// Timers by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.timers.iter().map(|(name, t)| (name.as_str(), *t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_timer_is_ready() {
        let cd = Cooldowns::new();
        assert!(cd.can_use("shoot"));
        assert_eq!(cd.remaining("shoot"), 0.0);
    }

    #[test]
    fn test_use_then_update() {
        let mut cd = Cooldowns::new();
        cd.use_for("shoot", 1.0);
        assert!(!cd.can_use("shoot"));
        cd.update(0.6);
        assert!(!cd.can_use("shoot"));
        cd.update(0.6);
        assert!(cd.can_use("shoot"));
    }

    #[test]
    fn test_update_floors_at_zero() {
        let mut cd = Cooldowns::new();
        cd.use_for("shoot", 1.0);
        cd.update(1000.0);
        assert_eq!(cd.remaining("shoot"), 0.0);
        assert_eq!(cd.iter().next(), Some(("shoot", 0.0)));
        cd.use_for("shoot", 1.0);
        cd.update(0.5);
        assert!(!cd.can_use("shoot"));
    }

    #[test]
    fn test_do_every() {
        let mut cd = Cooldowns::new();
        let mut calls = 0;
        for _ in 0..10 {
            cd.do_every("exec", 0.3, || calls += 1);
            cd.update(0.1);
        }
        // Fires at t = 0.0, 0.3, 0.6, 0.9.
        assert_eq!(calls, 4);
    }

    #[test]
    fn test_serializes_as_plain_map() {
        let mut cd = Cooldowns::new();
        cd.use_for("shoot", 1.5);
        let json = serde_json::to_value(&cd).unwrap();
        assert_eq!(json, serde_json::json!({ "shoot": 1.5 }));

        let restored: Cooldowns = serde_json::from_value(json).unwrap();
        assert_eq!(restored, cd);
    }

    #[test]
    fn test_ready_arms_timer() {
        let mut cd = Cooldowns::new();
        assert!(cd.ready("plan", 5.0));
        assert!(!cd.ready("plan", 5.0));
        assert_eq!(cd.remaining("plan"), 5.0);
    }
}
