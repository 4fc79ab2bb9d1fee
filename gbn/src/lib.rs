//! GBN - Go-Back-N ARQ
//!
//! High-level Rust API for the Go-Back-N protocol engine and its
//! deterministic network simulator.

pub use gbn_protocol as protocol;
pub use gbn_sim as sim;

// Re-export commonly used types
pub use protocol::{Endpoint, EndpointConfig, Frame, FrameKind, Host, SeqNumber};
pub use sim::{Entity, SimConfig, SimReport, Simulation};
