#![cfg(feature = "metrics")]
//! Tests for the counters updated by the dispatch loop.
//!
//! Counters are captured with `metrics_util::debugging::DebuggingRecorder`
//! installed as a thread-local recorder.

use metrics_util::debugging::{DebugValue, DebuggingRecorder, Snapshotter};
use vipaframe::{DrainMode, FrameParser};
use vipaframe_testing::{chained_command, recording_tagless, response};

fn debugging_recorder_setup() -> (Snapshotter, DebuggingRecorder) {
    let recorder = DebuggingRecorder::new();
    let snapshotter = recorder.snapshotter();
    (snapshotter, recorder)
}

fn counter(snapshotter: &Snapshotter, name: &str, label: Option<(&str, &str)>) -> u64 {
    snapshotter
        .snapshot()
        .into_vec()
        .into_iter()
        .filter(|(key, _, _, _)| {
            key.key().name() == name
                && label.is_none_or(|(k, v)| {
                    key.key().labels().any(|l| l.key() == k && l.value() == v)
                })
        })
        .map(|(_, _, _, value)| match value {
            DebugValue::Counter(c) => c,
            _ => 0,
        })
        .sum()
}

#[test]
fn dispatched_payloads_and_fragments_are_counted() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        let parser = FrameParser::new();
        let mut bytes = chained_command(&[0x44; 30], 10, 0x90, 0x00);
        bytes.extend(response(&[0x01], 0x90, 0x00));
        parser.append(&bytes, None).unwrap();
        let (mut handler, _calls) = recording_tagless();
        parser.read_and_execute(&mut handler, DrainMode::Frames);
    });

    assert_eq!(
        counter(&snapshotter, vipaframe::metrics::FRAMES_DISPATCHED, None),
        2
    );
    assert_eq!(
        counter(&snapshotter, vipaframe::metrics::CHAIN_FRAGMENTS, None),
        2
    );
}

#[test]
fn rejected_frames_are_counted_by_level() {
    let (snapshotter, recorder) = debugging_recorder_setup();
    metrics::with_local_recorder(&recorder, || {
        let parser = FrameParser::new();
        let mut frame = response(&[0x01], 0x90, 0x00);
        let last = frame.len() - 1;
        frame[last] ^= 0x55;
        parser.append(&frame, None).unwrap();
        let (mut handler, _calls) = recording_tagless();
        parser.read_and_execute(&mut handler, DrainMode::Frames);
    });

    assert_eq!(
        counter(
            &snapshotter,
            vipaframe::metrics::FRAME_ERRORS,
            Some(("level", "missing_lrc"))
        ),
        1
    );
    assert_eq!(
        counter(&snapshotter, vipaframe::metrics::FRAMES_DISPATCHED, None),
        0
    );
}
