//! Sequence Number Handling
//!
//! Frames carry signed 32-bit sequence and acknowledgement numbers. The value
//! 0 is reserved: a data frame never uses it, and an acknowledgement for 0
//! acknowledges nothing. Data sequence numbers start at 1 and only ever grow;
//! the space does not wrap within an endpoint's lifetime.

use std::fmt;

/// Sequence (or acknowledgement) number as carried on the wire
#[derive(Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Default)]
pub struct SeqNumber(i32);

impl SeqNumber {
    /// Reserved "no number" value
    pub const ZERO: SeqNumber = SeqNumber(0);

    /// First sequence number assigned to a data frame
    pub const FIRST: SeqNumber = SeqNumber(1);

    /// Create a sequence number from its raw wire value
    #[inline]
    pub const fn new(value: i32) -> Self {
        SeqNumber(value)
    }

    /// Get the raw wire value
    #[inline]
    pub const fn as_raw(self) -> i32 {
        self.0
    }

    /// Get the next sequence number
    #[inline]
    pub fn next(self) -> Self {
        SeqNumber(self.0.wrapping_add(1))
    }

    /// Increment the sequence number by 1
    #[inline]
    pub fn increment(&mut self) {
        *self = self.next();
    }

    /// Offset this number by `count` slots
    #[inline]
    pub fn offset(self, count: usize) -> Self {
        let count = i32::try_from(count).unwrap_or(i32::MAX);
        SeqNumber(self.0.saturating_add(count))
    }

    /// Number of slots from `self` up to (excluding) `other`
    ///
    /// Returns 0 when `other` is not ahead of `self`.
    pub fn distance_to(self, other: SeqNumber) -> usize {
        usize::try_from(i64::from(other.0) - i64::from(self.0)).unwrap_or(0)
    }

    /// Check whether this is the reserved zero value
    #[inline]
    pub fn is_zero(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for SeqNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SeqNumber({})", self.0)
    }
}

impl fmt::Display for SeqNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for SeqNumber {
    fn from(value: i32) -> Self {
        SeqNumber(value)
    }
}
