//! Unit tests for frame layout and validation.

use rstest::rstest;
use vipaframe_testing::{packet, response};

use super::{
    CHAINED_BIT,
    ErrorLevel,
    FrameFault,
    FrameHeader,
    FrameKind,
    frame_lrc,
    lrc,
    validate,
};
use crate::status::StatusCode;

const LIMIT: u8 = 0xFE;

#[test]
fn lrc_of_empty_span_is_zero() {
    assert_eq!(lrc(&[]), 0);
}

#[test]
fn frame_lrc_honours_explicit_span() {
    let buf = [0x01, 0x00, 0x05, 0x10, 0x20, 0xFF];
    assert_eq!(frame_lrc(&buf, Some(2)), 0x01);
    assert_eq!(frame_lrc(&buf, Some(64)), lrc(&buf[..5]));
}

#[test]
fn header_accessors_follow_len_byte() {
    let header = FrameHeader::parse(&[0x02, 0x41, 0x10]).expect("three bytes");
    assert!(header.is_chained());
    assert_eq!(header.lrc_index(), 0x13);
    assert_eq!(header.frame_len(), 0x14);
    assert_eq!(header.data_len(), 0x0E);
    assert!(FrameHeader::parse(&[0x01, 0x00]).is_none());
}

#[test]
fn single_frame_reports_status_word() {
    let bytes = response(&[0xE0, 0x00], 0x90, 0x00);
    let kind = validate(&bytes, false, LIMIT).expect("valid frame");

    let FrameKind::Single { header, status } = kind else {
        panic!("expected single frame, got {kind:?}");
    };
    assert_eq!(header.data_len(), 2);
    assert_eq!(status, StatusCode::SUCCESS);
}

#[rstest]
#[case::empty(&[], 0)]
#[case::three(&[0x01, 0x00, 0x02], 3)]
fn short_buffers_wait_for_more(#[case] bytes: &[u8], #[case] have: usize) {
    let fault = validate(bytes, false, LIMIT).expect_err("too short");
    assert_eq!(fault, FrameFault::ShortHeader { have });
    assert_eq!(fault.level(), ErrorLevel::Length);
    assert!(fault.is_pending());
}

#[rstest]
#[case::nad(0x05, 0x00, ErrorLevel::InvalidNad)]
#[case::pcb(0x01, 0x80, ErrorLevel::InvalidPcb)]
fn rejects_unknown_header_bytes(#[case] nad: u8, #[case] pcb: u8, #[case] level: ErrorLevel) {
    let bytes = packet(nad, pcb, &[0x90, 0x00]);
    let fault = validate(&bytes, false, LIMIT).expect_err("header rejected");
    assert_eq!(fault.level(), level);
    assert!(!fault.is_pending());
}

#[test]
fn declared_length_beyond_data_is_pending() {
    let mut bytes = response(&[1, 2, 3, 4], 0x90, 0x00);
    bytes.truncate(6);
    let fault = validate(&bytes, false, LIMIT).expect_err("incomplete");
    assert_eq!(
        fault,
        FrameFault::DeclaredLengthExceedsData {
            declared: 6,
            available: 2,
        }
    );
    assert_eq!(fault.level(), ErrorLevel::InvalidCombinedBytes);
    assert!(fault.is_pending());
}

#[test]
fn corrupted_byte_fails_checksum() {
    let mut bytes = response(&[0x11, 0x22], 0x90, 0x00);
    bytes[3] ^= 0x40;
    let fault = validate(&bytes, false, LIMIT).expect_err("checksum mismatch");
    assert_eq!(fault.level(), ErrorLevel::MissingLrc);
}

#[test]
fn chain_fragments_skip_checksum() {
    let mut bytes = packet(0x01, CHAINED_BIT, &[0xAA, 0xBB, 0xCC]);
    let last = bytes.len() - 1;
    bytes[last] ^= 0xFF;
    let kind = validate(&bytes, false, LIMIT).expect("fragment accepted");
    assert!(matches!(kind, FrameKind::ChainFragment(header) if header.body_len() == 3));
}

#[test]
fn truncated_chain_fragment_is_pending() {
    let bytes = packet(0x01, CHAINED_BIT, &[0xAA; 8]);
    let fault = validate(&bytes[..7], false, LIMIT).expect_err("fragment incomplete");
    assert!(matches!(fault, FrameFault::TruncatedFragment { declared: 8, available: 3 }));
    assert!(fault.is_pending());
}

#[test]
fn resuming_skips_header_checks() {
    let bytes = [0x7F, 0x7F, 0x7F, 0x7F];
    assert_eq!(validate(&bytes, true, LIMIT), Ok(FrameKind::ChainResponse));
}

#[test]
fn trailing_bytes_do_not_affect_single_frame() {
    let mut bytes = response(&[0x42], 0x6A, 0x82);
    bytes.extend_from_slice(&[0x01, 0x00]);
    let kind = validate(&bytes, false, LIMIT).expect("valid frame");
    assert!(matches!(kind, FrameKind::Single { status, .. } if status == StatusCode::new(0x6A82)));
}

#[test]
fn three_bytes_wait_even_with_an_oversized_len() {
    let fault = validate(&[0x01, 0x00, 0xFF], false, LIMIT).expect_err("too short");
    assert_eq!(fault, FrameFault::ShortHeader { have: 3 });
    assert_eq!(fault.level(), ErrorLevel::Length);
    assert!(fault.is_pending());
}

#[test]
fn address_is_checked_before_the_length_limit() {
    let fault = validate(&[0x09, 0x00, 0xFF, 0x00], false, LIMIT).expect_err("bad NAD");
    assert_eq!(fault, FrameFault::InvalidNad { nad: 0x09 });
}

#[test]
fn len_above_the_limit_is_rejected() {
    let bytes = response(&[0x00; 0x20], 0x90, 0x00);
    let fault = validate(&bytes, false, 0x10).expect_err("over limit");
    assert_eq!(
        fault,
        FrameFault::LengthOutOfRange {
            declared: 0x22,
            max: 0x10,
        }
    );
    assert!(!fault.is_pending());
}
