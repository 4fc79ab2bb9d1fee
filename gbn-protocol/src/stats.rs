//! Endpoint statistics

/// Counters kept by an [`Endpoint`](crate::endpoint::Endpoint)
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EndpointStats {
    /// Payloads handed down by the application layer
    pub payloads_submitted: u64,
    /// Payloads that found the window full and waited in the pending queue
    pub payloads_queued: u64,
    /// Payloads delivered up to the application layer
    pub payloads_delivered: u64,
    /// Total payload bytes delivered
    pub bytes_delivered: u64,
    /// Data frames sent for the first time
    pub data_frames_sent: u64,
    /// Data frames re-sent after a timeout
    pub retransmissions: u64,
    /// Timer expiries handled
    pub timeouts: u64,
    /// Acknowledgements sent, fresh or replayed
    pub acks_sent: u64,
    /// Acknowledgements that advanced the window
    pub acks_advanced: u64,
    /// Acknowledgements that were stale or duplicate
    pub acks_stale: u64,
    /// Inbound frames rejected as corrupted
    pub frames_corrupted: u64,
    /// Inbound intact data frames rejected as out of order
    pub frames_out_of_order: u64,
}

impl EndpointStats {
    /// Acknowledgements received, advancing or not
    pub fn acks_received(&self) -> u64 {
        self.acks_advanced + self.acks_stale
    }

    /// Inbound frames rejected for any reason
    pub fn frames_rejected(&self) -> u64 {
        self.frames_corrupted + self.frames_out_of_order
    }
}
