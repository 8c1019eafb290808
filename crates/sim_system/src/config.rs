//! Simulation configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Environment variable overriding [`SimConfig::seed`].
pub const SEED_ENV: &str = "SECTOR_SIM_SEED";

/// Tunables shared by every system.
///
/// Every field has a default, so a config file only needs to list what it
/// changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Target ticks per second in realtime mode.
    pub tick_rate: f64,
    /// Seed for the shared random generator.
    pub seed: u64,
    /// Seconds between path-table rebuilds.
    pub path_interval: f64,
    /// Seconds between spotting scans.
    pub spotting_interval: f64,
    /// How far spotting sees, in world units.
    pub spotting_range: f32,
    /// Faction relation at or below which two factions fight.
    pub hostility_threshold: f32,
    /// Distance at which a ship may dock.
    pub dock_distance: f32,
    /// Distance at which a ship picks up a collectible.
    pub collect_distance: f32,
    /// Radius around a sector's centre in which patrol waypoints are placed.
    pub patrol_radius: f32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            tick_rate: 10.0,
            seed: 0x5EC7_0125,
            path_interval: 10.0,
            spotting_interval: 1.0,
            spotting_range: 8.0,
            hostility_threshold: -50.0,
            dock_distance: 1.0,
            collect_distance: 1.0,
            patrol_radius: 6.0,
        }
    }
}

impl SimConfig {
    /// Parse a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] for malformed TOML or mistyped fields.
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Load a TOML file, then apply environment overrides.
    ///
    /// # Errors
    ///
    /// Fails if the file cannot be read or parsed, or an override is not a
    /// valid number.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml(&text)?.with_env_overrides()
    }

    /// Apply `SECTOR_SIM_SEED` if it is set.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Env`] if the variable is not an unsigned integer.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        match std::env::var(SEED_ENV) {
            Ok(value) => self.with_seed_str(&value),
            Err(_) => Ok(self),
        }
    }

    fn with_seed_str(self, value: &str) -> Result<Self, ConfigError> {
        let seed = value.trim().parse().map_err(|_| ConfigError::Env {
            var: SEED_ENV,
            value: value.to_string(),
        })?;
        Ok(self.with_seed(seed))
    }

    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    #[must_use]
    pub fn with_tick_rate(mut self, tick_rate: f64) -> Self {
        self.tick_rate = tick_rate;
        self
    }

    #[must_use]
    pub fn with_path_interval(mut self, seconds: f64) -> Self {
        self.path_interval = seconds;
        self
    }

    #[must_use]
    pub fn with_spotting(mut self, interval: f64, range: f32) -> Self {
        self.spotting_interval = interval;
        self.spotting_range = range;
        self
    }

    #[must_use]
    pub fn with_hostility_threshold(mut self, threshold: f32) -> Self {
        self.hostility_threshold = threshold;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config = SimConfig::from_toml("seed = 7\nspotting_range = 12.5\n").unwrap();
        assert_eq!(config.seed, 7);
        assert_eq!(config.spotting_range, 12.5);
        assert_eq!(config.path_interval, SimConfig::default().path_interval);
    }

    #[test]
    fn test_bad_toml_is_rejected() {
        assert!(matches!(
            SimConfig::from_toml("seed = \"many\""),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_seed_override_parsing() {
        let config = SimConfig::default().with_seed_str(" 42 ").unwrap();
        assert_eq!(config.seed, 42);
        assert!(SimConfig::default().with_seed_str("-1").is_err());
    }

    #[test]
    fn test_builders() {
        let config = SimConfig::default()
            .with_seed(3)
            .with_spotting(0.5, 4.0)
            .with_hostility_threshold(-10.0);
        assert_eq!(config.seed, 3);
        assert_eq!(config.spotting_interval, 0.5);
        assert_eq!(config.hostility_threshold, -10.0);
    }
}
