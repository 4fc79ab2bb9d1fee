//! GBN Frame Structures and Serialization
//!
//! Every frame is a fixed 15-byte header in network byte order followed by
//! an optional payload:
//!
//! ```text
//!  0               4               8       10  11              15
//! +---------------+---------------+-------+---+---------------+-----------
//! |    seq_num    |    ack_num    | csum  |ack|  payload_len  | payload..
//! +---------------+---------------+-------+---+---------------+-----------
//! ```
//!
//! The checksum is the one's complement of the one's-complement sum of all
//! 16-bit words of the frame (checksum field zeroed, odd lengths padded with a
//! zero byte). A received frame is intact iff re-running the checksum over the
//! whole buffer, checksum field included, yields zero.

use crate::sequence::SeqNumber;
use bytes::{Buf, BufMut, Bytes, BytesMut};
use std::fmt;
use thiserror::Error;
use tracing::trace;

/// Size of the GBN frame header in bytes
pub const HEADER_SIZE: usize = 15;

/// Largest payload whose length fits the signed 32-bit length field
pub const MAX_PAYLOAD_SIZE: usize = i32::MAX as usize - HEADER_SIZE;

/// Byte offset of the checksum field within the header
const CHECKSUM_OFFSET: usize = 8;

/// Kind of frame handed to the network, used by the link to pick its fault model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// Frame carries application data
    Data,
    /// Frame is a pure cumulative acknowledgement
    Ack,
}

impl fmt::Display for FrameKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FrameKind::Data => write!(f, "DATA"),
            FrameKind::Ack => write!(f, "ACK"),
        }
    }
}

/// Fixed-width frame header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    /// Sequence number (0 on acknowledgements)
    pub seq_num: SeqNumber,
    /// Acknowledgement number (0 on data frames)
    pub ack_num: SeqNumber,
    /// Checksum as carried on the wire
    pub checksum: u16,
    /// Acknowledgement flag
    pub is_ack: bool,
    /// Declared payload length in bytes
    pub payload_len: i32,
}

impl FrameHeader {
    /// Parse header from bytes (network byte order)
    ///
    /// Only the first [`HEADER_SIZE`] bytes are read; payload presence is not
    /// checked here.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, FrameError> {
        if bytes.len() < HEADER_SIZE {
            return Err(FrameError::Truncated {
                expected: HEADER_SIZE,
                actual: bytes.len(),
            });
        }

        let mut buf = &bytes[..HEADER_SIZE];
        Ok(FrameHeader {
            seq_num: SeqNumber::new(buf.get_i32()),
            ack_num: SeqNumber::new(buf.get_i32()),
            checksum: buf.get_u16(),
            is_ack: buf.get_u8() != 0,
            payload_len: buf.get_i32(),
        })
    }

    /// Serialize header to bytes (network byte order)
    pub fn to_bytes(&self, buf: &mut BytesMut) {
        buf.put_i32(self.seq_num.as_raw());
        buf.put_i32(self.ack_num.as_raw());
        buf.put_u16(self.checksum);
        buf.put_u8(u8::from(self.is_ack));
        buf.put_i32(self.payload_len);
    }
}

/// A validated, decoded frame
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    /// Cumulative acknowledgement of every sequence number up to `ack_num`
    Ack { ack_num: SeqNumber },
    /// In-band application data
    Data { seq_num: SeqNumber, payload: String },
}

impl Frame {
    /// Decode and validate a received buffer.
    ///
    /// A frame whose checksum verifies and whose ACK flag is set is an
    /// acknowledgement, whatever the rest of its header says. Anything else is
    /// a candidate data frame: its payload must be fully present and valid
    /// text, and its checksum must verify.
    pub fn decode(bytes: &[u8]) -> Result<Self, FrameError> {
        let header = FrameHeader::from_bytes(bytes)?;
        let residual = checksum(bytes);

        if residual == 0 && header.is_ack {
            return Ok(Frame::Ack {
                ack_num: header.ack_num,
            });
        }

        // A bad length field is conclusive before the checksum is consulted.
        let payload = decode_payload(bytes, header.payload_len)?;

        if residual != 0 {
            trace!(residual, seq = %header.seq_num, "checksum mismatch");
            return Err(FrameError::ChecksumMismatch { residual });
        }

        Ok(Frame::Data {
            seq_num: header.seq_num,
            payload,
        })
    }

    /// Serialize this frame with a valid checksum
    pub fn encode(&self) -> Bytes {
        match self {
            Frame::Ack { ack_num } => encode_ack(*ack_num),
            Frame::Data { seq_num, payload } => encode_data(*seq_num, payload),
        }
    }

    /// Frame kind
    pub fn kind(&self) -> FrameKind {
        match self {
            Frame::Ack { .. } => FrameKind::Ack,
            Frame::Data { .. } => FrameKind::Data,
        }
    }
}

/// Build a frame, setting the ACK flag iff `ack_num` is non-zero.
pub fn encode(seq_num: SeqNumber, ack_num: SeqNumber, payload: &str) -> Bytes {
    encode_with(seq_num, ack_num, !ack_num.is_zero(), payload)
}

/// Build a data frame
pub fn encode_data(seq_num: SeqNumber, payload: &str) -> Bytes {
    encode_with(seq_num, SeqNumber::ZERO, false, payload)
}

/// Build a pure acknowledgement. The ACK flag is set even for `ack_num == 0`.
pub fn encode_ack(ack_num: SeqNumber) -> Bytes {
    encode_with(SeqNumber::ZERO, ack_num, true, "")
}

fn encode_with(seq_num: SeqNumber, ack_num: SeqNumber, is_ack: bool, payload: &str) -> Bytes {
    debug_assert!(payload.len() <= MAX_PAYLOAD_SIZE);
    let header = FrameHeader {
        seq_num,
        ack_num,
        checksum: 0,
        is_ack,
        payload_len: i32::try_from(payload.len()).unwrap_or(i32::MAX),
    };

    let mut buf = BytesMut::with_capacity(HEADER_SIZE + payload.len());
    header.to_bytes(&mut buf);
    buf.put_slice(payload.as_bytes());

    let sum = checksum(&buf);
    buf[CHECKSUM_OFFSET..CHECKSUM_OFFSET + 2].copy_from_slice(&sum.to_be_bytes());
    buf.freeze()
}

/// Internet checksum over `bytes`, zero-padded to an even length
pub fn checksum(bytes: &[u8]) -> u16 {
    let mut chunks = bytes.chunks_exact(2);
    let mut sum = chunks
        .by_ref()
        .fold(0u32, |acc, word| carry_around_add(acc, u16::from_be_bytes([word[0], word[1]])));

    if let [last] = chunks.remainder() {
        sum = carry_around_add(sum, u16::from_be_bytes([*last, 0]));
    }

    !(sum as u16)
}

#[inline]
fn carry_around_add(acc: u32, word: u16) -> u32 {
    let sum = acc + u32::from(word);
    (sum & 0xFFFF) + (sum >> 16)
}

/// Check a received buffer against its embedded checksum
#[inline]
pub fn is_corrupted(bytes: &[u8]) -> bool {
    checksum(bytes) != 0
}

/// Decode exactly `payload_len` bytes of text following the header.
///
/// A declared length that is negative or reaches past the end of the buffer
/// is reported as [`FrameError::LengthOutOfBounds`], never as an empty payload.
pub fn decode_payload(bytes: &[u8], payload_len: i32) -> Result<String, FrameError> {
    let available = bytes.len().saturating_sub(HEADER_SIZE);
    let len = usize::try_from(payload_len)
        .ok()
        .filter(|len| *len <= available)
        .ok_or(FrameError::LengthOutOfBounds {
            declared: payload_len,
            available,
        })?;

    let raw = &bytes[HEADER_SIZE..HEADER_SIZE + len];
    std::str::from_utf8(raw)
        .map(str::to_owned)
        .map_err(|_| FrameError::InvalidText)
}

/// Frame decoding and validation errors
///
/// Every variant means the frame is corrupted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FrameError {
    #[error("Truncated header: expected {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("Payload length {declared} out of bounds ({available} bytes available)")]
    LengthOutOfBounds { declared: i32, available: usize },

    #[error("Payload is not valid UTF-8")]
    InvalidText,

    #[error("Checksum mismatch (residual {residual:#06x})")]
    ChecksumMismatch { residual: u16 },

    #[error("Payload too large: {size} bytes (max {max})")]
    PayloadTooLarge { size: usize, max: usize },
}
