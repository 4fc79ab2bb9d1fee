//! Go-Back-N send side
//!
//! [`Sender`] keeps up to `window_size` data frames in flight. Each in-flight
//! frame is stored as the exact bytes that were transmitted so a timeout can
//! replay them verbatim. Payloads submitted while the window is full wait in a
//! FIFO queue and are released as cumulative ACKs open the window.
//!
//! ```text
//!  window_base   next_seq        window_base + window_size
//!      │             │                     │
//!  ────┼─────────────┼─────────────────────┼──────▶ seq space
//!   acked │<─ in flight ─>│<──── usable ───>│
//! ```

use crate::frame::{self, FrameError, FrameKind, MAX_PAYLOAD_SIZE};
use crate::host::Host;
use crate::sequence::SeqNumber;
use bytes::Bytes;
use std::collections::{BTreeMap, VecDeque};
use std::time::Duration;
use tracing::debug;

/// The endpoint's single retransmission timer.
///
/// Remembers whether the host timer is armed so that a restart is always
/// stop-then-start and stopping an idle timer issues nothing.
#[derive(Debug, Clone)]
pub struct RetransmitTimer {
    interval: Duration,
    running: bool,
}

impl RetransmitTimer {
    pub fn new(interval: Duration) -> Self {
        RetransmitTimer {
            interval,
            running: false,
        }
    }

    /// Arm the timer, replacing any running deadline
    pub fn start<H: Host>(&mut self, host: &mut H) {
        if self.running {
            host.stop_timer();
        }
        host.start_timer(self.interval);
        self.running = true;
    }

    /// Disarm the timer if it is running
    pub fn stop<H: Host>(&mut self, host: &mut H) {
        if self.running {
            host.stop_timer();
            self.running = false;
        }
    }

    /// Note that the host timer has fired and is no longer armed
    pub fn expired(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

/// Result of handing a payload to the sender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submitted {
    /// Framed and transmitted under this sequence number
    Sent(SeqNumber),
    /// Window full; payload waits in the pending queue of the given length
    Queued { pending: usize },
}

/// Result of processing an intact acknowledgement
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AckOutcome {
    /// In-flight frames released by this ACK
    pub acked: usize,
    /// Pending payloads transmitted into the freed window, in order
    pub released: Vec<SeqNumber>,
}

impl AckOutcome {
    /// The ACK acknowledged nothing new
    pub fn is_stale(&self) -> bool {
        self.acked == 0
    }
}

/// Go-Back-N send-side state for one endpoint
#[derive(Debug)]
pub struct Sender {
    /// Highest cumulatively acknowledged sequence number
    window_base: SeqNumber,
    /// Sequence number for the next new data frame
    next_seq: SeqNumber,
    /// Maximum number of frames in flight (N)
    window_size: usize,
    /// Frames sent but not yet acknowledged, as transmitted
    in_flight: BTreeMap<SeqNumber, Bytes>,
    /// Payloads waiting for a free window slot
    pending: VecDeque<String>,
    timer: RetransmitTimer,
}

impl Sender {
    /// Create a sender with an empty window.
    ///
    /// # Panics
    ///
    /// Panics if `window_size` is zero. [`EndpointConfig`](crate::config::EndpointConfig)
    /// rejects that before an endpoint is built.
    pub fn new(window_size: usize, timer_interval: Duration) -> Self {
        assert!(window_size >= 1, "window_size must be at least 1");
        Sender {
            window_base: SeqNumber::ZERO,
            next_seq: SeqNumber::FIRST,
            window_size,
            in_flight: BTreeMap::new(),
            pending: VecDeque::new(),
            timer: RetransmitTimer::new(timer_interval),
        }
    }

    /// Hand a payload to the sender.
    ///
    /// Sent immediately when the window has a free slot, queued otherwise.
    pub fn submit<H: Host>(&mut self, payload: String, host: &mut H) -> Result<Submitted, FrameError> {
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(FrameError::PayloadTooLarge {
                size: payload.len(),
                max: MAX_PAYLOAD_SIZE,
            });
        }

        if self.has_space() {
            Ok(Submitted::Sent(self.transmit_new(&payload, host)))
        } else {
            self.pending.push_back(payload);
            debug!(pending = self.pending.len(), "window full, payload queued");
            Ok(Submitted::Queued {
                pending: self.pending.len(),
            })
        }
    }

    /// Process an intact acknowledgement.
    ///
    /// ACKs are cumulative: `ack_num` releases every in-flight frame up to and
    /// including it. ACKs at or below `window_base`, or for numbers never sent,
    /// move nothing but still restart the timer while frames are outstanding.
    pub fn on_ack<H: Host>(&mut self, ack_num: SeqNumber, host: &mut H) -> AckOutcome {
        let mut outcome = AckOutcome::default();

        if ack_num > self.window_base && ack_num < self.next_seq {
            let still_in_flight = self.in_flight.split_off(&ack_num.next());
            outcome.acked = self.in_flight.len();
            self.in_flight = still_in_flight;
            self.window_base = ack_num;
            self.timer.stop(host);
            debug!(ack = %ack_num, acked = outcome.acked, "window advanced");
        } else {
            debug!(ack = %ack_num, base = %self.window_base, "stale ack");
        }

        if self.has_outstanding() {
            self.timer.start(host);
        }

        while self.has_space() {
            let Some(payload) = self.pending.pop_front() else {
                break;
            };
            outcome.released.push(self.transmit_new(&payload, host));
        }

        outcome
    }

    /// Handle a timer expiry: resend every in-flight frame in sequence order.
    ///
    /// Returns the number of frames retransmitted.
    pub fn on_timeout<H: Host>(&mut self, host: &mut H) -> usize {
        self.timer.expired();

        for (seq, frame) in &self.in_flight {
            debug!(seq = %seq, "retransmit");
            host.transmit(frame.clone(), FrameKind::Data);
        }

        if self.has_outstanding() {
            self.timer.start(host);
        }

        self.in_flight.len()
    }

    fn transmit_new<H: Host>(&mut self, payload: &str, host: &mut H) -> SeqNumber {
        let seq = self.next_seq;
        let frame = frame::encode_data(seq, payload);

        debug!(seq = %seq, len = payload.len(), "transmit");
        host.transmit(frame.clone(), FrameKind::Data);
        self.in_flight.insert(seq, frame);

        if self.in_flight.len() == 1 {
            self.timer.start(host);
        }

        self.next_seq.increment();
        seq
    }

    /// `true` when another frame may be put in flight
    pub fn has_space(&self) -> bool {
        self.next_seq <= self.window_base.offset(self.window_size)
    }

    /// `true` while any sent frame is unacknowledged
    pub fn has_outstanding(&self) -> bool {
        self.next_seq != self.window_base.next()
    }

    /// Highest cumulatively acknowledged sequence number
    pub fn window_base(&self) -> SeqNumber {
        self.window_base
    }

    /// Sequence number the next new frame will use
    pub fn next_seq(&self) -> SeqNumber {
        self.next_seq
    }

    pub fn window_size(&self) -> usize {
        self.window_size
    }

    /// Outstanding sequence numbers, oldest first
    pub fn in_flight(&self) -> impl Iterator<Item = SeqNumber> + '_ {
        self.in_flight.keys().copied()
    }

    /// The bytes last transmitted for an outstanding sequence number
    pub fn in_flight_frame(&self, seq: SeqNumber) -> Option<&Bytes> {
        self.in_flight.get(&seq)
    }

    pub fn in_flight_len(&self) -> usize {
        self.in_flight.len()
    }

    /// Payloads waiting for window space
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_timer_running(&self) -> bool {
        self.timer.is_running()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::frame::Frame;
    use crate::host::{HostCall, RecordingHost};
    use proptest::prelude::*;

    const INTERVAL: Duration = Duration::from_millis(100);

    fn seq(n: i32) -> SeqNumber {
        SeqNumber::new(n)
    }

    fn sent_seqs(host: &RecordingHost) -> Vec<i32> {
        host.transmitted()
            .iter()
            .map(|(bytes, _)| match Frame::decode(bytes).unwrap() {
                Frame::Data { seq_num, .. } => seq_num.as_raw(),
                Frame::Ack { .. } => panic!("sender emitted an ACK"),
            })
            .collect()
    }

    fn check_invariants(s: &Sender) {
        assert!(s.window_base.distance_to(s.next_seq) <= s.window_size + 1);
        let expected: Vec<_> = (s.window_base.as_raw() + 1..s.next_seq.as_raw()).map(seq).collect();
        assert_eq!(s.in_flight().collect::<Vec<_>>(), expected);
        assert_eq!(s.is_timer_running(), s.has_outstanding());
    }

    #[test]
    fn initial_state() {
        let s = Sender::new(4, INTERVAL);
        assert_eq!(s.window_base(), SeqNumber::ZERO);
        assert_eq!(s.next_seq(), SeqNumber::FIRST);
        assert!(s.has_space());
        assert!(!s.has_outstanding());
        assert!(!s.is_timer_running());
        check_invariants(&s);
    }

    #[test]
    fn submit_transmits_and_starts_timer_once() {
        let mut s = Sender::new(4, INTERVAL);
        let mut host = RecordingHost::new();

        for (i, payload) in ["a", "b", "c"].into_iter().enumerate() {
            let result = s.submit(payload.to_string(), &mut host).unwrap();
            assert_eq!(result, Submitted::Sent(seq(i as i32 + 1)));
        }

        assert_eq!(sent_seqs(&host), vec![1, 2, 3]);
        assert_eq!(host.timer_starts(), 1);
        assert_eq!(host.calls()[1], HostCall::StartTimer(INTERVAL));
        check_invariants(&s);
    }

    #[test]
    fn window_full_queues() {
        let mut s = Sender::new(2, INTERVAL);
        let mut host = RecordingHost::new();

        s.submit("a".into(), &mut host).unwrap();
        s.submit("b".into(), &mut host).unwrap();
        let third = s.submit("c".into(), &mut host).unwrap();

        assert_eq!(third, Submitted::Queued { pending: 1 });
        assert!(!s.has_space());
        assert_eq!(s.pending_len(), 1);
        assert_eq!(sent_seqs(&host), vec![1, 2]);
        check_invariants(&s);
    }

    #[test]
    fn cumulative_ack_releases_everything_up_to_it() {
        let mut s = Sender::new(4, INTERVAL);
        let mut host = RecordingHost::new();
        for p in ["a", "b", "c"] {
            s.submit(p.into(), &mut host).unwrap();
        }

        let outcome = s.on_ack(seq(2), &mut host);

        assert_eq!(outcome.acked, 2);
        assert_eq!(s.window_base(), seq(2));
        assert_eq!(s.in_flight().collect::<Vec<_>>(), vec![seq(3)]);
        check_invariants(&s);
    }

    #[test]
    fn final_ack_stops_timer() {
        let mut s = Sender::new(4, INTERVAL);
        let mut host = RecordingHost::new();
        s.submit("a".into(), &mut host).unwrap();
        host.take();

        let outcome = s.on_ack(seq(1), &mut host);

        assert_eq!(outcome.acked, 1);
        assert_eq!(host.take(), vec![HostCall::StopTimer]);
        assert!(!s.is_timer_running());
        check_invariants(&s);
    }

    #[test]
    fn stale_ack_restarts_timer_without_moving_window() {
        let mut s = Sender::new(4, INTERVAL);
        let mut host = RecordingHost::new();
        for p in ["a", "b"] {
            s.submit(p.into(), &mut host).unwrap();
        }
        s.on_ack(seq(1), &mut host);
        host.take();

        let outcome = s.on_ack(seq(1), &mut host);

        assert!(outcome.is_stale());
        assert_eq!(s.window_base(), seq(1));
        assert_eq!(
            host.take(),
            vec![HostCall::StopTimer, HostCall::StartTimer(INTERVAL)]
        );
        check_invariants(&s);
    }

    #[test]
    fn ack_for_unsent_sequence_is_ignored() {
        let mut s = Sender::new(4, INTERVAL);
        let mut host = RecordingHost::new();
        s.submit("a".into(), &mut host).unwrap();

        let outcome = s.on_ack(seq(9), &mut host);

        assert!(outcome.is_stale());
        assert_eq!(s.window_base(), SeqNumber::ZERO);
        check_invariants(&s);
    }

    #[test]
    fn pending_drains_in_fifo_order() {
        let mut s = Sender::new(1, INTERVAL);
        let mut host = RecordingHost::new();
        for p in ["first", "second", "third"] {
            s.submit(p.into(), &mut host).unwrap();
        }
        host.take();

        let outcome = s.on_ack(seq(1), &mut host);
        assert_eq!(outcome.released, vec![seq(2)]);
        let outcome = s.on_ack(seq(2), &mut host);
        assert_eq!(outcome.released, vec![seq(3)]);

        let payloads: Vec<_> = host
            .transmitted()
            .iter()
            .map(|(bytes, _)| match Frame::decode(bytes).unwrap() {
                Frame::Data { payload, .. } => payload,
                Frame::Ack { .. } => unreachable!(),
            })
            .collect();
        assert_eq!(payloads, vec!["second", "third"]);
        check_invariants(&s);
    }

    #[test]
    fn timeout_resends_exact_bytes_in_order() {
        let mut s = Sender::new(4, INTERVAL);
        let mut host = RecordingHost::new();
        for p in ["a", "b", "c"] {
            s.submit(p.into(), &mut host).unwrap();
        }
        let original = host.transmitted();
        host.take();

        let resent = s.on_timeout(&mut host);

        assert_eq!(resent, 3);
        assert_eq!(host.transmitted(), original);
        assert_eq!(host.timer_starts(), 1);
        assert_eq!(host.timer_stops(), 0);
        assert_eq!(s.next_seq(), seq(4));
        check_invariants(&s);
    }

    #[test]
    fn timeout_with_nothing_in_flight_stays_idle() {
        let mut s = Sender::new(4, INTERVAL);
        let mut host = RecordingHost::new();

        assert_eq!(s.on_timeout(&mut host), 0);
        assert!(host.calls().is_empty());
        check_invariants(&s);
    }

    #[test]
    fn timer_restart_is_stop_then_start() {
        let mut timer = RetransmitTimer::new(INTERVAL);
        let mut host = RecordingHost::new();
        timer.stop(&mut host);
        assert!(host.calls().is_empty());

        timer.start(&mut host);
        timer.start(&mut host);
        assert_eq!(
            host.take(),
            vec![
                HostCall::StartTimer(INTERVAL),
                HostCall::StopTimer,
                HostCall::StartTimer(INTERVAL)
            ]
        );
    }

    #[derive(Debug, Clone)]
    enum Op {
        Submit,
        Ack(i32),
        Timeout,
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![
            3 => Just(Op::Submit),
            2 => (0..24i32).prop_map(Op::Ack),
            1 => Just(Op::Timeout),
        ]
    }

    proptest! {
        #[test]
        fn random_operations_keep_window_consistent(
            window in 1usize..8,
            ops in prop::collection::vec(op_strategy(), 0..64),
        ) {
            let mut s = Sender::new(window, INTERVAL);
            let mut host = RecordingHost::new();
            let mut submitted = 0usize;

            for op in ops {
                match op {
                    Op::Submit => {
                        s.submit(format!("p{}", submitted), &mut host).unwrap();
                        submitted += 1;
                    }
                    Op::Ack(n) => {
                        s.on_ack(seq(n), &mut host);
                    }
                    Op::Timeout => {
                        if s.is_timer_running() {
                            s.on_timeout(&mut host);
                        }
                    }
                }

                check_invariants(&s);
                prop_assert!(s.in_flight_len() <= window);
                prop_assert!(s.pending_len() == 0 || !s.has_space());
                prop_assert_eq!(
                    submitted,
                    s.window_base.as_raw() as usize + s.in_flight_len() + s.pending_len()
                );
            }
        }
    }
}
