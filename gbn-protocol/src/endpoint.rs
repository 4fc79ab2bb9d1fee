//! Full-duplex Go-Back-N endpoint
//!
//! An [`Endpoint`] is both a sender and a receiver. It exposes the three
//! events a host drives (payload from the application, frame from the
//! network, timer expiry) and routes each to the sender or receiver half.
//!
//! Every entry point runs to completion; there is no internal concurrency.

use crate::config::{ConfigError, EndpointConfig};
use crate::frame::{Frame, FrameError};
use crate::host::Host;
use crate::receiver::{ReceiveError, Receiver};
use crate::sender::{AckOutcome, Sender, Submitted};
use crate::sequence::SeqNumber;
use crate::stats::EndpointStats;
use tracing::debug_span;

/// What an inbound frame turned out to be
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    /// An intact acknowledgement, processed by the sender half
    Ack(AckOutcome),
    /// A data frame accepted and delivered under this sequence number
    Delivered(SeqNumber),
}

/// One side of a Go-Back-N exchange
#[derive(Debug)]
pub struct Endpoint {
    /// Name used in log output
    name: String,
    config: EndpointConfig,
    sender: Sender,
    receiver: Receiver,
    stats: EndpointStats,
}

impl Endpoint {
    /// Create an endpoint from a validated configuration
    pub fn new(name: impl Into<String>, config: EndpointConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Endpoint {
            name: name.into(),
            config,
            sender: Sender::new(config.window_size, config.timer_interval()),
            receiver: Receiver::initial(),
            stats: EndpointStats::default(),
        })
    }

    /// The application layer has a payload to send
    pub fn on_application_payload<H: Host>(
        &mut self,
        payload: String,
        host: &mut H,
    ) -> Result<Submitted, FrameError> {
        let _span = debug_span!("endpoint", name = %self.name).entered();

        let submitted = self.sender.submit(payload, host)?;
        self.stats.payloads_submitted += 1;
        match submitted {
            Submitted::Sent(_) => self.stats.data_frames_sent += 1,
            Submitted::Queued { .. } => self.stats.payloads_queued += 1,
        }
        Ok(submitted)
    }

    /// A frame has arrived from the network.
    ///
    /// An intact frame with the ACK flag set belongs to the sender. Everything
    /// else is a candidate data frame for the receiver, which answers any
    /// rejection by replaying its last ACK. Errors are informational; the
    /// protocol has already recovered by the time they are returned.
    pub fn on_network_frame<H: Host>(
        &mut self,
        bytes: &[u8],
        host: &mut H,
    ) -> Result<Inbound, ReceiveError> {
        let _span = debug_span!("endpoint", name = %self.name).entered();

        let result = match Frame::decode(bytes) {
            Ok(Frame::Ack { ack_num }) => {
                let outcome = self.sender.on_ack(ack_num, host);
                if outcome.is_stale() {
                    self.stats.acks_stale += 1;
                } else {
                    self.stats.acks_advanced += 1;
                }
                self.stats.data_frames_sent += outcome.released.len() as u64;
                return Ok(Inbound::Ack(outcome));
            }
            Ok(Frame::Data { seq_num, payload }) => {
                let len = payload.len() as u64;
                self.receiver
                    .on_data_frame(seq_num, payload, host)
                    .map(|accepted| {
                        self.stats.payloads_delivered += 1;
                        self.stats.bytes_delivered += len;
                        Inbound::Delivered(accepted)
                    })
            }
            Err(error) => Err(self.receiver.on_corrupted_frame(error, host)),
        };

        // Every data-path outcome sends exactly one ACK.
        self.stats.acks_sent += 1;
        match &result {
            Err(ReceiveError::Corrupted(_)) => self.stats.frames_corrupted += 1,
            Err(ReceiveError::OutOfOrder { .. }) => self.stats.frames_out_of_order += 1,
            Ok(_) => {}
        }
        result
    }

    /// The retransmission timer has expired
    pub fn on_timer_fired<H: Host>(&mut self, host: &mut H) -> usize {
        let _span = debug_span!("endpoint", name = %self.name).entered();

        let resent = self.sender.on_timeout(host);
        self.stats.timeouts += 1;
        self.stats.retransmissions += resent as u64;
        resent
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &EndpointConfig {
        &self.config
    }

    pub fn sender(&self) -> &Sender {
        &self.sender
    }

    pub fn receiver(&self) -> &Receiver {
        &self.receiver
    }

    /// Get endpoint statistics
    pub fn stats(&self) -> EndpointStats {
        self.stats
    }
}
