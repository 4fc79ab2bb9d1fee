//! Simulation parameters

use crate::entity::Entity;
use gbn_protocol::{ConfigError, EndpointConfig, FrameKind};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Fault probabilities applied to one kind of frame
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FaultProfile {
    /// Probability that a frame is silently dropped
    #[serde(default)]
    pub loss_probability: f64,
    /// Probability that a delivered frame has one bit flipped
    #[serde(default)]
    pub corruption_probability: f64,
}

impl FaultProfile {
    /// A profile that drops and corrupts with the given probabilities
    pub fn new(loss_probability: f64, corruption_probability: f64) -> Self {
        FaultProfile {
            loss_probability,
            corruption_probability,
        }
    }

    fn validate(&self, kind: FrameKind) -> Result<(), SimError> {
        for (name, value) in [
            ("loss_probability", self.loss_probability),
            ("corruption_probability", self.corruption_probability),
        ] {
            if !(0.0..=1.0).contains(&value) {
                return Err(SimError::InvalidProbability { kind, name, value });
            }
        }
        Ok(())
    }
}

/// One-way link behaviour, applied independently in each direction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinkConfig {
    /// Faults applied to data frames
    #[serde(default)]
    pub data: FaultProfile,
    /// Faults applied to acknowledgements
    #[serde(default)]
    pub ack: FaultProfile,
    /// Minimum one-way delay in milliseconds
    #[serde(default = "default_min_delay")]
    pub min_delay_ms: u64,
    /// Maximum one-way delay in milliseconds
    #[serde(default = "default_max_delay")]
    pub max_delay_ms: u64,
}

fn default_min_delay() -> u64 {
    5
}

fn default_max_delay() -> u64 {
    15
}

impl Default for LinkConfig {
    fn default() -> Self {
        LinkConfig {
            data: FaultProfile::default(),
            ack: FaultProfile::default(),
            min_delay_ms: default_min_delay(),
            max_delay_ms: default_max_delay(),
        }
    }
}

impl LinkConfig {
    /// A link applying the same faults to every frame kind
    pub fn uniform(loss_probability: f64, corruption_probability: f64) -> Self {
        let profile = FaultProfile::new(loss_probability, corruption_probability);
        LinkConfig {
            data: profile,
            ack: profile,
            ..Default::default()
        }
    }

    /// Fault profile for a frame kind
    pub fn profile(&self, kind: FrameKind) -> &FaultProfile {
        match kind {
            FrameKind::Data => &self.data,
            FrameKind::Ack => &self.ack,
        }
    }

    pub fn min_delay(&self) -> Duration {
        Duration::from_millis(self.min_delay_ms)
    }

    pub fn max_delay(&self) -> Duration {
        Duration::from_millis(self.max_delay_ms)
    }

    pub fn validate(&self) -> Result<(), SimError> {
        self.data.validate(FrameKind::Data)?;
        self.ack.validate(FrameKind::Ack)?;
        if self.min_delay_ms > self.max_delay_ms {
            return Err(SimError::InvalidDelay {
                min_ms: self.min_delay_ms,
                max_ms: self.max_delay_ms,
            });
        }
        Ok(())
    }
}

/// Application traffic generated during a run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkloadConfig {
    /// Payloads generated by each sending entity
    #[serde(default = "default_messages")]
    pub messages: usize,
    /// Mean gap between payloads in milliseconds
    #[serde(default = "default_mean_gap")]
    pub mean_gap_ms: u64,
    /// Payload length in bytes (payloads are never shorter than their tag)
    #[serde(default = "default_payload_len")]
    pub payload_len: usize,
    /// Entities that generate traffic
    #[serde(default = "default_senders")]
    pub senders: Vec<Entity>,
}

fn default_messages() -> usize {
    20
}

fn default_mean_gap() -> u64 {
    50
}

fn default_payload_len() -> usize {
    20
}

fn default_senders() -> Vec<Entity> {
    Entity::ALL.to_vec()
}

impl Default for WorkloadConfig {
    fn default() -> Self {
        WorkloadConfig {
            messages: default_messages(),
            mean_gap_ms: default_mean_gap(),
            payload_len: default_payload_len(),
            senders: default_senders(),
        }
    }
}

/// Complete simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    /// Random seed; equal seeds give identical runs
    #[serde(default)]
    pub seed: u64,
    /// Stop processing events after this much simulated time
    #[serde(default = "default_time_limit")]
    pub time_limit_ms: u64,
    #[serde(default)]
    pub endpoint: EndpointConfig,
    #[serde(default)]
    pub link: LinkConfig,
    #[serde(default)]
    pub workload: WorkloadConfig,
}

fn default_time_limit() -> u64 {
    600_000
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            seed: 0,
            time_limit_ms: default_time_limit(),
            endpoint: EndpointConfig::default(),
            link: LinkConfig::default(),
            workload: WorkloadConfig::default(),
        }
    }
}

impl SimConfig {
    pub fn validate(&self) -> Result<(), SimError> {
        self.endpoint.validate()?;
        self.link.validate()
    }

    /// Get the time limit as Duration
    pub fn time_limit(&self) -> Duration {
        Duration::from_millis(self.time_limit_ms)
    }
}

/// Simulation setup errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid {kind} {name}: {value} (must be within 0.0..=1.0)")]
    InvalidProbability {
        kind: FrameKind,
        name: &'static str,
        value: f64,
    },

    #[error("Invalid delay range: min {min_ms} ms exceeds max {max_ms} ms")]
    InvalidDelay { min_ms: u64, max_ms: u64 },

    #[error("Endpoint configuration: {0}")]
    Endpoint(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(SimConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_bad_probability() {
        let mut config = SimConfig::default();
        config.link.ack.loss_probability = 1.5;

        assert!(matches!(
            config.validate(),
            Err(SimError::InvalidProbability {
                kind: FrameKind::Ack,
                name: "loss_probability",
                ..
            })
        ));
    }

    #[test]
    fn test_rejects_nan_probability() {
        let config = LinkConfig::uniform(f64::NAN, 0.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_inverted_delay() {
        let config = LinkConfig {
            min_delay_ms: 20,
            max_delay_ms: 10,
            ..Default::default()
        };
        assert_eq!(
            config.validate(),
            Err(SimError::InvalidDelay {
                min_ms: 20,
                max_ms: 10
            })
        );
    }

    #[test]
    fn test_profile_by_kind() {
        let config = LinkConfig {
            data: FaultProfile::new(0.1, 0.0),
            ack: FaultProfile::new(0.0, 0.2),
            ..Default::default()
        };
        assert_eq!(config.profile(FrameKind::Data).loss_probability, 0.1);
        assert_eq!(config.profile(FrameKind::Ack).corruption_probability, 0.2);
    }

    #[test]
    fn test_endpoint_error_propagates() {
        let mut config = SimConfig::default();
        config.endpoint.window_size = 0;
        assert_eq!(
            config.validate(),
            Err(SimError::Endpoint(ConfigError::ZeroWindow))
        );
    }
}
