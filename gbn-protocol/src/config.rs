//! Endpoint configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Per-endpoint protocol parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Maximum number of unacknowledged data frames (N)
    #[serde(default = "default_window_size")]
    pub window_size: usize,
    /// Retransmission timer interval in milliseconds
    #[serde(default = "default_timer_interval_ms")]
    pub timer_interval_ms: u64,
}

fn default_window_size() -> usize {
    8
}

fn default_timer_interval_ms() -> u64 {
    200
}

impl Default for EndpointConfig {
    fn default() -> Self {
        EndpointConfig {
            window_size: default_window_size(),
            timer_interval_ms: default_timer_interval_ms(),
        }
    }
}

impl EndpointConfig {
    /// Create a validated configuration
    pub fn new(window_size: usize, timer_interval: Duration) -> Result<Self, ConfigError> {
        let config = EndpointConfig {
            window_size,
            timer_interval_ms: u64::try_from(timer_interval.as_millis()).unwrap_or(u64::MAX),
        };
        config.validate()?;
        Ok(config)
    }

    /// Check the parameters are usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.window_size == 0 {
            return Err(ConfigError::ZeroWindow);
        }
        if self.window_size > i32::MAX as usize {
            return Err(ConfigError::WindowTooLarge(self.window_size));
        }
        if self.timer_interval_ms == 0 {
            return Err(ConfigError::ZeroInterval);
        }
        Ok(())
    }

    /// Get the timer interval as Duration
    pub fn timer_interval(&self) -> Duration {
        Duration::from_millis(self.timer_interval_ms)
    }
}

/// Configuration errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Window size must be at least 1")]
    ZeroWindow,

    #[error("Window size {0} exceeds the sequence space")]
    WindowTooLarge(usize),

    #[error("Timer interval must be at least 1 ms")]
    ZeroInterval,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_validates() {
        assert!(EndpointConfig::new(4, Duration::from_millis(50)).is_ok());
        assert_eq!(
            EndpointConfig::new(0, Duration::from_millis(50)),
            Err(ConfigError::ZeroWindow)
        );
        assert_eq!(
            EndpointConfig::new(4, Duration::from_micros(10)),
            Err(ConfigError::ZeroInterval)
        );
    }

    #[test]
    fn test_timer_interval() {
        let config = EndpointConfig::new(4, Duration::from_millis(250)).unwrap();
        assert_eq!(config.timer_interval(), Duration::from_millis(250));
    }

    #[test]
    fn test_default_is_valid() {
        assert!(EndpointConfig::default().validate().is_ok());
    }
}
