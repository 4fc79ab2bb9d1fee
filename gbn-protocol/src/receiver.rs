//! Go-Back-N receive side
//!
//! The receiver accepts exactly one sequence number at a time. Anything else,
//! corrupted, duplicated or early, is answered by replaying the last ACK it
//! sent; out-of-order data is never buffered.

use crate::frame::{self, FrameError, FrameKind};
use crate::host::Host;
use crate::sequence::SeqNumber;
use bytes::Bytes;
use thiserror::Error;
use tracing::debug;

/// Why an inbound data frame was not delivered
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ReceiveError {
    #[error("Frame corrupted: {0}")]
    Corrupted(#[from] FrameError),

    #[error("Out of order: expected {expected}, received {received}")]
    OutOfOrder {
        expected: SeqNumber,
        received: SeqNumber,
    },
}

/// Go-Back-N receive-side state for one endpoint
#[derive(Debug, Clone)]
pub struct Receiver {
    /// The only sequence number that will be accepted next
    expected_seq: SeqNumber,
    /// Most recently sent acknowledgement, replayed on every rejection
    last_ack: Bytes,
}

impl Receiver {
    /// A receiver expecting sequence number 1, whose last ACK is an
    /// acknowledgement of 0 (acknowledges nothing).
    pub fn initial() -> Self {
        Receiver {
            expected_seq: SeqNumber::FIRST,
            last_ack: frame::encode_ack(SeqNumber::ZERO),
        }
    }

    /// Handle an intact data frame.
    ///
    /// Delivers and acknowledges it if it carries the expected sequence
    /// number; otherwise replays the last ACK and leaves state untouched.
    pub fn on_data_frame<H: Host>(
        &mut self,
        seq_num: SeqNumber,
        payload: String,
        host: &mut H,
    ) -> Result<SeqNumber, ReceiveError> {
        if seq_num != self.expected_seq {
            debug!(expected = %self.expected_seq, received = %seq_num, "out of order, replaying last ack");
            self.resend_last_ack(host);
            return Err(ReceiveError::OutOfOrder {
                expected: self.expected_seq,
                received: seq_num,
            });
        }

        let accepted = self.expected_seq;
        debug!(seq = %accepted, len = payload.len(), "deliver");
        host.deliver(payload);

        self.last_ack = frame::encode_ack(accepted);
        host.transmit(self.last_ack.clone(), FrameKind::Ack);
        self.expected_seq.increment();

        Ok(accepted)
    }

    /// Handle a frame that failed validation: replay the last ACK.
    pub fn on_corrupted_frame<H: Host>(&mut self, error: FrameError, host: &mut H) -> ReceiveError {
        debug!(%error, "corrupted frame, replaying last ack");
        self.resend_last_ack(host);
        ReceiveError::Corrupted(error)
    }

    fn resend_last_ack<H: Host>(&self, host: &mut H) {
        host.transmit(self.last_ack.clone(), FrameKind::Ack);
    }

    /// Next sequence number that will be accepted
    pub fn expected_seq(&self) -> SeqNumber {
        self.expected_seq
    }

    /// Bytes of the most recently sent acknowledgement
    pub fn last_ack(&self) -> &Bytes {
        &self.last_ack
    }
}

impl Default for Receiver {
    fn default() -> Self {
        Self::initial()
    }
}
