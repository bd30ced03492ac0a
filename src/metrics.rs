//! Metric helpers for `vipaframe`.
//!
//! This module defines metric names and simple helper functions wrapping the
//! [`metrics`](https://docs.rs/metrics) crate. With the `metrics` feature
//! disabled the helpers compile to no-ops.

use crate::frame::ErrorLevel;

/// Name of the counter tracking payloads handed to a handler.
pub const FRAMES_DISPATCHED: &str = "vipaframe_frames_dispatched_total";
/// Name of the counter tracking rejected frames.
pub const FRAME_ERRORS: &str = "vipaframe_frame_errors_total";
/// Name of the counter tracking absorbed chain fragments.
pub const CHAIN_FRAGMENTS: &str = "vipaframe_chain_fragments_total";

/// Record a dispatched payload.
pub fn inc_dispatched() {
    #[cfg(feature = "metrics")]
    metrics::counter!(FRAMES_DISPATCHED).increment(1);
}

/// Record a rejected frame at the given level.
pub fn inc_frame_errors(level: ErrorLevel) {
    #[cfg(feature = "metrics")]
    metrics::counter!(FRAME_ERRORS, "level" => level.as_str()).increment(1);
    #[cfg(not(feature = "metrics"))]
    let _ = level;
}

/// Record an absorbed chain fragment.
pub fn inc_chain_fragments() {
    #[cfg(feature = "metrics")]
    metrics::counter!(CHAIN_FRAGMENTS).increment(1);
}
