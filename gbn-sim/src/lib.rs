//! Deterministic network simulator for Go-Back-N endpoints
//!
//! Two [`Endpoint`](gbn_protocol::Endpoint)s are connected by a pair of
//! unreliable one-way links. The simulator plays their application layers,
//! the network and their timers, all in virtual time driven by a seeded RNG.

pub mod clock;
pub mod config;
pub mod entity;
pub mod link;
pub mod simulator;
pub mod workload;

pub use clock::{SimTime, TimerSlot};
pub use config::{FaultProfile, LinkConfig, SimConfig, SimError, WorkloadConfig};
pub use entity::Entity;
pub use link::{Arrival, Link, LinkStats};
pub use simulator::{EntityReport, SimReport, Simulation};
