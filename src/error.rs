//! Errors returned to callers of the public parser API.
//!
//! Protocol faults are classified as [`ErrorLevel`](crate::ErrorLevel)s and
//! reported through handlers or [`Outcome::Rejected`](crate::Outcome::Rejected).
//! The types here cover caller-contract violations only.

use thiserror::Error;

/// Rejected [`FrameParser::append`](crate::FrameParser::append) call.
///
/// The parser state is untouched when this is returned.
#[derive(Clone, Copy, Debug, Error, PartialEq, Eq)]
pub enum AppendError {
    /// The declared length runs past the end of the supplied chunk.
    #[error("declared length {declared} exceeds chunk of {actual} bytes")]
    LengthExceedsChunk {
        /// Length claimed by the caller.
        declared: usize,
        /// Actual size of the chunk.
        actual: usize,
    },
}
