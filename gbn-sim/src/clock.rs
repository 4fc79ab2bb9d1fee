//! Virtual time for the simulator
//!
//! Simulated time only advances when the event loop pops the next event, so
//! runs are fully deterministic for a given seed.

use std::fmt;
use std::ops::{Add, Sub};
use std::time::Duration;

/// Point in simulated time, measured from the start of the run
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct SimTime(Duration);

impl SimTime {
    /// Start of the simulation
    pub const ZERO: SimTime = SimTime(Duration::ZERO);

    /// Create a time from an offset since the start of the run
    #[inline]
    pub const fn from_duration(offset: Duration) -> Self {
        SimTime(offset)
    }

    /// Create a time from milliseconds since the start of the run
    #[inline]
    pub const fn from_millis(millis: u64) -> Self {
        SimTime(Duration::from_millis(millis))
    }

    /// Offset since the start of the run
    #[inline]
    pub fn as_duration(&self) -> Duration {
        self.0
    }

    /// Calculate duration since an earlier time, saturating at zero
    #[inline]
    pub fn duration_since(&self, earlier: SimTime) -> Duration {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<Duration> for SimTime {
    type Output = SimTime;

    fn add(self, duration: Duration) -> SimTime {
        SimTime(self.0 + duration)
    }
}

impl Sub for SimTime {
    type Output = Duration;

    fn sub(self, other: SimTime) -> Duration {
        self.duration_since(other)
    }
}

impl fmt::Display for SimTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.0.as_secs_f64())
    }
}

/// One entity's retransmission timer as seen by the simulator.
///
/// Every start or stop bumps the generation, so an expiry event scheduled for
/// an older generation is recognised as stale and dropped.
#[derive(Debug, Clone, Default)]
pub struct TimerSlot {
    generation: u64,
    deadline: Option<SimTime>,
}

impl TimerSlot {
    /// Arm the timer; returns the generation the expiry event must carry
    pub fn arm(&mut self, deadline: SimTime) -> u64 {
        self.generation += 1;
        self.deadline = Some(deadline);
        self.generation
    }

    /// Disarm the timer
    pub fn disarm(&mut self) {
        self.generation += 1;
        self.deadline = None;
    }

    /// Consume an expiry for `generation`, returning true if it is current
    pub fn try_fire(&mut self, generation: u64) -> bool {
        if self.deadline.is_some() && generation == self.generation {
            self.deadline = None;
            true
        } else {
            false
        }
    }

    pub fn is_armed(&self) -> bool {
        self.deadline.is_some()
    }

    /// Deadline of the armed timer
    pub fn deadline(&self) -> Option<SimTime> {
        self.deadline
    }
}
