//! GBN CLI Library
//!
//! Shared functionality for the Go-Back-N simulator command-line tool.

pub mod config;
pub mod stats;

pub use config::{Config, ConfigError};
pub use stats::{display_report, display_summary, format_bytes, format_duration};
