//! Tests for the log records emitted while framing.
//!
//! `tracing` events are forwarded to the `log` facade and captured with
//! `logtest`; tests share one global logger and run serially.

use log::Level;
use rstest::rstest;
use serial_test::serial;
use vipaframe::{DrainMode, FrameParser, ParserConfig};
use vipaframe_testing::{LoggerHandle, logger, packet, recording_tagless, response};

fn bound_parser() -> FrameParser { FrameParser::with_config(ParserConfig::default().with_port("LOG1")) }

fn drain(parser: &FrameParser) {
    let (mut handler, _calls) = recording_tagless();
    parser.read_and_execute(&mut handler, DrainMode::Frames);
}

#[rstest]
#[serial(frame_logs)]
fn rejected_frame_is_logged_as_error(mut logger: LoggerHandle) {
    logger.clear();
    let parser = bound_parser();
    let mut frame = response(&[0x01], 0x90, 0x00);
    frame[1] = 0x7E;
    parser.append(&frame, None).unwrap();
    drain(&parser);

    assert!(logger.contains(Level::Error, "frame rejected"));
}

#[rstest]
#[serial(frame_logs)]
fn absorbed_fragment_is_logged(mut logger: LoggerHandle) {
    logger.clear();
    let parser = bound_parser();
    parser.append(&packet(0x01, 0x01, &[0xAB, 0xCD]), None).unwrap();
    drain(&parser);

    assert!(logger.contains(Level::Info, "chain fragment absorbed"));
}

#[rstest]
#[serial(frame_logs)]
fn short_frame_logs_expected_and_calculated_length(mut logger: LoggerHandle) {
    logger.clear();
    let parser = bound_parser();
    let frame = response(&[0x01, 0x02, 0x03], 0x90, 0x00);
    parser.append(&frame[..6], None).unwrap();
    drain(&parser);

    let mut found = false;
    while let Some(record) = logger.pop() {
        let message = record.args().to_string();
        if message.contains("waiting for the rest of the frame") {
            assert_eq!(record.level(), Level::Info);
            assert!(message.contains("expected_len=5"), "message={message}");
            assert!(message.contains("calculated_len=2"), "message={message}");
            found = true;
        }
    }
    assert!(found, "length wait not logged");
}

#[rstest]
#[serial(frame_logs)]
fn sanity_check_logs_discarded_fragments(mut logger: LoggerHandle) {
    logger.clear();
    let parser = bound_parser();
    parser.append(&packet(0x01, 0x01, &[0x10]), None).unwrap();
    drain(&parser);
    logger.clear();

    assert!(!parser.sanity_check());
    assert!(logger.contains(Level::Warn, "sanity check found stored fragments"));
}
