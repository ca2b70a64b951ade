//! Shared configuration types for lapwatch
//!
//! This crate contains the serializable timer configuration shared between
//! the engine (lapwatch-core) and its consumers (lapwatch-cli).

use serde::{Deserialize, Serialize};
use std::time::Duration;

// ─────────────────────────────────────────────────────────────────────────────
// Interval Defaults
// ─────────────────────────────────────────────────────────────────────────────

/// Sampling cadence of the internal tick driver, in milliseconds.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 10;

/// Cadence at which elapsed-time samples are published, in milliseconds.
pub const DEFAULT_UPDATE_INTERVAL_MS: u64 = 10;

fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}

fn default_update_interval_ms() -> u64 {
    DEFAULT_UPDATE_INTERVAL_MS
}

/// Map a configured interval to a usable period. Zero means "use the default".
pub fn interval_or_default(millis: u64, default_millis: u64) -> Duration {
    if millis == 0 {
        Duration::from_millis(default_millis)
    } else {
        Duration::from_millis(millis)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Timer Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Policy switches and cadences for a single timer.
///
/// The three policy flags are fixed once the timer is constructed. The update
/// interval can still be changed while the timer is stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Permit `resume` straight out of the Stopped state
    #[serde(default)]
    pub allow_resume_after_stop: bool,

    /// When resuming after a stop, count the time spent stopped
    #[serde(default)]
    pub continue_counting_when_stopped: bool,

    /// Stop the timer once every registered subtimer has been stopped
    #[serde(default)]
    pub stop_on_subtimers_finish: bool,

    /// Internal sampling cadence (0 = default)
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    /// Update publication cadence (0 = default)
    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            allow_resume_after_stop: false,
            continue_counting_when_stopped: false,
            stop_on_subtimers_finish: false,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            update_interval_ms: DEFAULT_UPDATE_INTERVAL_MS,
        }
    }
}

impl TimerConfig {
    pub fn tick_interval(&self) -> Duration {
        interval_or_default(self.tick_interval_ms, DEFAULT_TICK_INTERVAL_MS)
    }

    pub fn update_interval(&self) -> Duration {
        interval_or_default(self.update_interval_ms, DEFAULT_UPDATE_INTERVAL_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_intervals_fall_back_to_defaults() {
        let config = TimerConfig {
            tick_interval_ms: 0,
            update_interval_ms: 0,
            ..TimerConfig::default()
        };
        assert_eq!(config.tick_interval(), Duration::from_millis(DEFAULT_TICK_INTERVAL_MS));
        assert_eq!(config.update_interval(), Duration::from_millis(DEFAULT_UPDATE_INTERVAL_MS));
    }

    #[test]
    fn missing_fields_use_defaults() {
        let config: TimerConfig = toml::from_str("stop_on_subtimers_finish = true").unwrap();
        assert!(config.stop_on_subtimers_finish);
        assert!(!config.allow_resume_after_stop);
        assert_eq!(config.update_interval_ms, DEFAULT_UPDATE_INTERVAL_MS);
        assert_eq!(config.tick_interval_ms, DEFAULT_TICK_INTERVAL_MS);
    }
}
