//! Unreliable one-way link
//!
//! A [`Link`] carries frames in one direction. Each frame may be dropped or
//! have a single bit flipped, with probabilities chosen by its
//! [`FrameKind`]. Surviving frames arrive after a uniformly random delay but
//! never overtake an earlier frame on the same link.

use crate::clock::SimTime;
use crate::config::LinkConfig;
use bytes::{Bytes, BytesMut};
use gbn_protocol::FrameKind;
use rand::Rng;
use tracing::trace;

/// Link counters
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkStats {
    /// Frames offered to the link
    pub frames_sent: u64,
    /// Frames silently dropped
    pub frames_dropped: u64,
    /// Frames delivered with a flipped bit
    pub frames_corrupted: u64,
}

impl LinkStats {
    /// Frames that reached the far end, intact or not
    pub fn frames_delivered(&self) -> u64 {
        self.frames_sent - self.frames_dropped
    }
}

/// A frame on its way to the far end
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Arrival {
    pub at: SimTime,
    pub frame: Bytes,
}

/// One direction of the simulated network
#[derive(Debug, Clone)]
pub struct Link {
    config: LinkConfig,
    last_arrival: SimTime,
    stats: LinkStats,
}

impl Link {
    pub fn new(config: LinkConfig) -> Self {
        Link {
            config,
            last_arrival: SimTime::ZERO,
            stats: LinkStats::default(),
        }
    }

    /// Offer a frame to the link at `now`.
    ///
    /// Returns `None` if the frame is lost.
    pub fn send<R: Rng>(&mut self, frame: Bytes, kind: FrameKind, now: SimTime, rng: &mut R) -> Option<Arrival> {
        self.stats.frames_sent += 1;
        let profile = *self.config.profile(kind);

        if rng.gen_bool(profile.loss_probability) {
            self.stats.frames_dropped += 1;
            trace!(%kind, len = frame.len(), "frame lost");
            return None;
        }

        let frame = if !frame.is_empty() && rng.gen_bool(profile.corruption_probability) {
            self.stats.frames_corrupted += 1;
            flip_random_bit(&frame, rng)
        } else {
            frame
        };

        let delay = rng.gen_range(self.config.min_delay()..=self.config.max_delay());
        let at = (now + delay).max(self.last_arrival);
        self.last_arrival = at;

        Some(Arrival { at, frame })
    }

    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }
}

/// Copy `frame` with exactly one bit inverted
fn flip_random_bit<R: Rng>(frame: &[u8], rng: &mut R) -> Bytes {
    let mut corrupted = BytesMut::from(frame);
    let byte = rng.gen_range(0..corrupted.len());
    let bit = rng.gen_range(0..8);
    corrupted[byte] ^= 1 << bit;
    trace!(byte, bit, "bit flipped");
    corrupted.freeze()
}
