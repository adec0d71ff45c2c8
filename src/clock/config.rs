//! Clock configuration.

use super::error::ClockError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Default tick cadence, roughly 60 samples per second.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 16;

pub const DEFAULT_THREAD_NAME: &str = "brew-clock";

/// Samples the worker holds for a consumer that is not reading.
pub const DEFAULT_SAMPLE_CAPACITY: usize = 8;

/// Settings for a [`PrecisionClock`](super::PrecisionClock).
///
/// Missing fields fall back to their defaults when deserializing.
///
/// # Example
///
/// ```rust
/// use brew_engine::clock::ClockConfig;
/// use std::time::Duration;
///
/// let config = ClockConfig::from_json(r#"{ "tick_interval_ms": 33 }"#).unwrap();
/// assert_eq!(config.tick_interval(), Duration::from_millis(33));
/// assert_eq!(config.thread_name, "brew-clock");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Target delay between samples while running; best effort
    pub tick_interval_ms: u64,
    /// Name given to the worker thread
    pub thread_name: String,
    /// Unread samples kept before further ticks are dropped
    pub sample_capacity: usize,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            thread_name: DEFAULT_THREAD_NAME.to_string(),
            sample_capacity: DEFAULT_SAMPLE_CAPACITY,
        }
    }
}

impl ClockConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and validate a JSON configuration document.
    pub fn from_json(json: &str) -> Result<Self, ClockError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        self.thread_name = name.into();
        self
    }

    pub fn with_sample_capacity(mut self, capacity: usize) -> Self {
        self.sample_capacity = capacity;
        self
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn validate(&self) -> Result<(), ClockError> {
        if self.tick_interval_ms == 0 {
            return Err(ClockError::InvalidConfig(
                "tick_interval_ms must be greater than zero".to_string(),
            ));
        }
        if self.thread_name.trim().is_empty() {
            return Err(ClockError::InvalidConfig(
                "thread_name must not be empty".to_string(),
            ));
        }
        if self.sample_capacity == 0 {
            return Err(ClockError::InvalidConfig(
                "sample_capacity must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}
