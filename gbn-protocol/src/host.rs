//! Collaborator interface
//!
//! The protocol engine performs no I/O of its own. Everything it needs from
//! the outside world (delivering payloads upward, putting frames on the
//! network, arming the retransmission timer) goes through a [`Host`], which
//! is passed into every endpoint entry point.

use crate::frame::FrameKind;
use bytes::Bytes;
use std::time::Duration;

pub trait Host {
    // Called to hand a decoded, in-order payload to the application layer
    fn deliver(&mut self, payload: String);

    // Called to send a frame to the remote endpoint
    fn transmit(&mut self, frame: Bytes, kind: FrameKind);

    // Called to arm this endpoint's single retransmission timer
    fn start_timer(&mut self, interval: Duration);

    // Called to disarm the running retransmission timer
    fn stop_timer(&mut self);
}

/// One recorded call made by an endpoint into its host
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostCall {
    Deliver(String),
    Transmit(Bytes, FrameKind),
    StartTimer(Duration),
    StopTimer,
}

/// A host that records every call in order, for scripted exchanges.
#[derive(Debug, Default)]
pub struct RecordingHost {
    calls: Vec<HostCall>,
}

impl RecordingHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// All calls recorded so far
    pub fn calls(&self) -> &[HostCall] {
        &self.calls
    }

    /// Drain the recorded calls
    pub fn take(&mut self) -> Vec<HostCall> {
        std::mem::take(&mut self.calls)
    }

    /// Frames transmitted so far, in order
    pub fn transmitted(&self) -> Vec<(Bytes, FrameKind)> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::Transmit(frame, kind) => Some((frame.clone(), *kind)),
                _ => None,
            })
            .collect()
    }

    /// Payloads delivered so far, in order
    pub fn delivered(&self) -> Vec<String> {
        self.calls
            .iter()
            .filter_map(|call| match call {
                HostCall::Deliver(payload) => Some(payload.clone()),
                _ => None,
            })
            .collect()
    }

    /// Number of `start_timer` calls recorded
    pub fn timer_starts(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, HostCall::StartTimer(_)))
            .count()
    }

    /// Number of `stop_timer` calls recorded
    pub fn timer_stops(&self) -> usize {
        self.calls
            .iter()
            .filter(|call| matches!(call, HostCall::StopTimer))
            .count()
    }
}

impl Host for RecordingHost {
    fn deliver(&mut self, payload: String) {
        self.calls.push(HostCall::Deliver(payload));
    }

    fn transmit(&mut self, frame: Bytes, kind: FrameKind) {
        self.calls.push(HostCall::Transmit(frame, kind));
    }

    fn start_timer(&mut self, interval: Duration) {
        self.calls.push(HostCall::StartTimer(interval));
    }

    fn stop_timer(&mut self) {
        self.calls.push(HostCall::StopTimer);
    }
}
