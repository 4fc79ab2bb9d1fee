//! Property-based tests for frame encoding and checksum validation
//!
//! These tests use proptest to generate random frames and verify that the
//! checksum accepts every intact frame and catches every single-bit error.

use bytes::BytesMut;
use gbn_protocol::frame::{self, Frame, FrameError, FrameHeader, HEADER_SIZE};
use gbn_protocol::SeqNumber;
use proptest::prelude::*;

// Property test strategies

fn seq_number_strategy() -> impl Strategy<Value = SeqNumber> {
    (1..=i32::MAX).prop_map(SeqNumber::new)
}

fn payload_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        "[a-zA-Z0-9 ]{1,64}",
        "\\PC{0,32}",
    ]
}

proptest! {
    #[test]
    fn prop_encoded_frames_verify(seq in seq_number_strategy(), payload in payload_strategy()) {
        let bytes = frame::encode_data(seq, &payload);

        prop_assert_eq!(bytes.len(), HEADER_SIZE + payload.len());
        prop_assert_eq!(frame::checksum(&bytes), 0);
        prop_assert!(!frame::is_corrupted(&bytes));
    }

    #[test]
    fn prop_data_frames_decode(seq in seq_number_strategy(), payload in payload_strategy()) {
        let bytes = frame::encode_data(seq, &payload);

        prop_assert_eq!(
            Frame::decode(&bytes).unwrap(),
            Frame::Data { seq_num: seq, payload }
        );
    }

    #[test]
    fn prop_ack_frames_decode(ack in (0..=i32::MAX).prop_map(SeqNumber::new)) {
        let bytes = frame::encode_ack(ack);

        prop_assert_eq!(bytes.len(), HEADER_SIZE);
        prop_assert_eq!(Frame::decode(&bytes).unwrap(), Frame::Ack { ack_num: ack });
    }

    #[test]
    fn prop_single_bit_flip_detected(
        seq in seq_number_strategy(),
        payload in "[a-z]{0,40}",
        bit in any::<prop::sample::Index>(),
    ) {
        let bytes = frame::encode_data(seq, &payload);
        let mut corrupted = BytesMut::from(&bytes[..]);
        let bit = bit.index(bytes.len() * 8);
        corrupted[bit / 8] ^= 1 << (bit % 8);

        prop_assert!(frame::is_corrupted(&corrupted));
        prop_assert!(Frame::decode(&corrupted).is_err());
    }

    #[test]
    fn prop_header_roundtrip(
        seq in any::<i32>(),
        ack in any::<i32>(),
        checksum in any::<u16>(),
        is_ack in any::<bool>(),
        payload_len in any::<i32>(),
    ) {
        let header = FrameHeader {
            seq_num: SeqNumber::new(seq),
            ack_num: SeqNumber::new(ack),
            checksum,
            is_ack,
            payload_len,
        };
        let mut buf = BytesMut::new();
        header.to_bytes(&mut buf);

        prop_assert_eq!(buf.len(), HEADER_SIZE);
        prop_assert_eq!(FrameHeader::from_bytes(&buf).unwrap(), header);
    }

    #[test]
    fn prop_short_buffers_truncated(len in 0..HEADER_SIZE) {
        let bytes = frame::encode_ack(SeqNumber::FIRST);

        let result = Frame::decode(&bytes[..len]);
        prop_assert_eq!(
            result,
            Err(FrameError::Truncated { expected: HEADER_SIZE, actual: len })
        );
    }
}

#[test]
fn test_checksum_of_empty_input() {
    assert_eq!(frame::checksum(&[]), 0xFFFF);
}

#[test]
fn test_checksum_pads_odd_length() {
    assert_eq!(frame::checksum(&[0x12]), frame::checksum(&[0x12, 0x00]));
}
