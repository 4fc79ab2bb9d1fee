//! Configuration file support for the GBN simulator

use gbn_protocol::EndpointConfig;
use gbn_sim::{Entity, FaultProfile, LinkConfig, SimConfig, SimError, WorkloadConfig};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level configuration file
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Simulation parameters
    #[serde(default)]
    pub simulation: SimConfig,
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    /// Parse and validate configuration from a TOML string
    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: Config = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        fs::write(path, self.to_toml()?)?;
        Ok(())
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.simulation.validate()?;
        if self.simulation.workload.senders.is_empty() && self.simulation.workload.messages > 0 {
            return Err(ConfigError::Invalid(
                "workload.senders is empty but messages were requested".to_string(),
            ));
        }
        Ok(())
    }

    /// Create example configuration: a lossy, noisy link in both directions
    pub fn example() -> Self {
        Config {
            simulation: SimConfig {
                seed: 1,
                time_limit_ms: 600_000,
                endpoint: EndpointConfig {
                    window_size: 8,
                    timer_interval_ms: 200,
                },
                link: LinkConfig {
                    data: FaultProfile::new(0.1, 0.1),
                    ack: FaultProfile::new(0.1, 0.05),
                    min_delay_ms: 5,
                    max_delay_ms: 15,
                },
                workload: WorkloadConfig {
                    messages: 50,
                    mean_gap_ms: 50,
                    payload_len: 20,
                    senders: vec![Entity::A, Entity::B],
                },
            },
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    #[error("Invalid simulation: {0}")]
    Simulation(#[from] SimError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}
