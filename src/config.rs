//! Runtime configuration.
//!
//! Timing knobs and the RNG seed, loadable from a TOML file. Every field
//! has a default, so an empty file (or no file at all) yields a playable
//! setup; unknown keys are rejected rather than silently dropped.

use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use thiserror::Error;

/// Errors from loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Game timing and seeding knobs.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GameConfig {
    /// Idle sleep of the game thread between queue polls, in milliseconds.
    pub poll_interval_ms: u64,
    /// Pause between the incorrect cue and the LEDs going dark.
    pub mismatch_delay_ms: u64,
    /// Pause between LEDs during the winning sweep.
    pub sweep_step_ms: u64,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 5,
            mismatch_delay_ms: 500,
            sweep_step_ms: 100,
            seed: None,
        }
    }
}

impl GameConfig {
    /// Load a configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&text)?)
    }

    /// Zeroed delays, for tests and benchmarks that should not sleep.
    pub fn instant() -> Self {
        Self {
            poll_interval_ms: 1,
            mismatch_delay_ms: 0,
            sweep_step_ms: 0,
            seed: None,
        }
    }

    #[inline]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    #[inline]
    pub fn mismatch_delay(&self) -> Duration {
        Duration::from_millis(self.mismatch_delay_ms)
    }

    #[inline]
    pub fn sweep_step(&self) -> Duration {
        Duration::from_millis(self.sweep_step_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GameConfig::default();
        assert_eq!(config.poll_interval_ms, 5);
        assert_eq!(config.mismatch_delay_ms, 500);
        assert_eq!(config.sweep_step_ms, 100);
        assert_eq!(config.seed, None);
    }

    #[test]
    fn test_partial_file_falls_back_to_defaults() {
        let config: GameConfig = toml::from_str("mismatch_delay_ms = 250\nseed = 7\n").unwrap();
        assert_eq!(config.mismatch_delay_ms, 250);
        assert_eq!(config.seed, Some(7));
        assert_eq!(config.poll_interval_ms, 5);
        assert_eq!(config.sweep_step_ms, 100);
    }

    #[test]
    fn test_unknown_key_is_rejected() {
        let result: Result<GameConfig, _> = toml::from_str("sweep_delay_ms = 100\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_duration_accessors() {
        let config = GameConfig::default();
        assert_eq!(config.poll_interval(), Duration::from_millis(5));
        assert_eq!(config.mismatch_delay(), Duration::from_millis(500));
        assert_eq!(config.sweep_step(), Duration::from_millis(100));
    }

    #[test]
    fn test_load_missing_file_is_io_error() {
        let err = GameConfig::load("/nonexistent/matchpad.toml").unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
