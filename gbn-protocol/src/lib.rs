//! Go-Back-N Protocol Core Implementation
//!
//! This crate implements a sans-IO, full-duplex Go-Back-N ARQ endpoint:
//! frame encoding and checksum validation, the sliding-window sender with
//! timeout-driven retransmission, and the in-order cumulative-ACK receiver.
//! All I/O (network, application delivery, timers) goes through [`Host`].

pub mod config;
pub mod endpoint;
pub mod frame;
pub mod host;
pub mod receiver;
pub mod sender;
pub mod sequence;
pub mod stats;

pub use config::{ConfigError, EndpointConfig};
pub use endpoint::{Endpoint, Inbound};
pub use frame::{Frame, FrameError, FrameHeader, FrameKind, HEADER_SIZE};
pub use host::{Host, HostCall, RecordingHost};
pub use receiver::{ReceiveError, Receiver};
pub use sender::{AckOutcome, RetransmitTimer, Sender, Submitted};
pub use sequence::SeqNumber;
pub use stats::EndpointStats;
