//! Classification of rejected or incomplete link frames.
//!
//! [`ErrorLevel`] is the coarse per-parser state the dispatch loop exposes;
//! [`FrameFault`] carries the details of a single failed check and maps onto
//! exactly one level.

use std::fmt;

use thiserror::Error;

/// Current read error level of a parser.
///
/// Exactly one level is current at any time. `None` means nothing is
/// pending; `CombinedBytesMismatch` means a chain fragment was absorbed and
/// the parser is waiting for the rest of the chain.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum ErrorLevel {
    /// No pending error.
    #[default]
    None,
    /// Not enough bytes to frame anything yet.
    Length,
    /// Node address outside the accepted set.
    InvalidNad,
    /// Protocol control byte outside the accepted set.
    InvalidPcb,
    /// Declared length disagrees with the bytes actually available.
    InvalidCombinedBytes,
    /// Checksum byte does not match the frame contents.
    MissingLrc,
    /// A chain fragment was stored; more packets are expected.
    CombinedBytesMismatch,
}

impl ErrorLevel {
    /// Stable name used in logs and metric labels.
    ///
    /// ```
    /// use vipaframe::ErrorLevel;
    ///
    /// assert_eq!(ErrorLevel::MissingLrc.as_str(), "missing_lrc");
    /// ```
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Length => "length",
            Self::InvalidNad => "invalid_nad",
            Self::InvalidPcb => "invalid_pcb",
            Self::InvalidCombinedBytes => "invalid_combined_bytes",
            Self::MissingLrc => "missing_lrc",
            Self::CombinedBytesMismatch => "combined_bytes_mismatch",
        }
    }
}

impl fmt::Display for ErrorLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.as_str()) }
}

/// A failed framing check.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum FrameFault {
    /// Fewer bytes than the fixed header and checksum.
    #[error("short header: have {have} bytes, need 4")]
    ShortHeader {
        /// Bytes currently buffered.
        have: usize,
    },

    /// A chain fragment has not been fully received.
    #[error("chain fragment truncated: LEN={declared:#04x}, {available} bytes available")]
    TruncatedFragment {
        /// LEN byte of the fragment.
        declared: u8,
        /// Bytes following the header.
        available: usize,
    },

    /// Node address byte is not one of the accepted values.
    #[error("invalid NAD {nad:#04x}")]
    InvalidNad {
        /// Offending NAD.
        nad: u8,
    },

    /// Protocol control byte is not one of the accepted values.
    #[error("invalid PCB {pcb:#04x}")]
    InvalidPcb {
        /// Offending PCB.
        pcb: u8,
    },

    /// LEN promises more bytes than have arrived.
    #[error("expected LEN {declared:#04x}, calculated LEN {available:#04x}")]
    DeclaredLengthExceedsData {
        /// LEN byte of the frame.
        declared: u8,
        /// Bytes following the header.
        available: usize,
    },

    /// The checksum byte disagrees with the XOR of the frame.
    #[error("LRC mismatch in frame {frame}: received {received:#04x}, calculated {calculated:#04x}")]
    ChecksumMismatch {
        /// One-based frame number within a chain (1 for single frames).
        frame: usize,
        /// Checksum byte found on the wire.
        received: u8,
        /// Checksum computed over the frame.
        calculated: u8,
    },

    /// LEN is above the configured packet limit.
    #[error("LEN {declared:#04x} exceeds the packet limit {max:#04x}")]
    LengthOutOfRange {
        /// LEN byte of the frame.
        declared: u8,
        /// Configured limit.
        max: u8,
    },

    /// A chained response ended before its terminating packet arrived.
    #[error("chained response incomplete: {have} bytes buffered, terminal packet missing")]
    IncompleteChain {
        /// Bytes currently buffered.
        have: usize,
    },

    /// A reassembled payload is too short to carry `SW1 SW2`.
    #[error("reassembled payload of {len} bytes has no status word")]
    MissingStatusWord {
        /// Reassembled length.
        len: usize,
    },
}

impl FrameFault {
    /// Error level this fault puts the parser into.
    #[must_use]
    pub const fn level(&self) -> ErrorLevel {
        match self {
            Self::ShortHeader { .. } | Self::TruncatedFragment { .. } | Self::IncompleteChain { .. } => {
                ErrorLevel::Length
            }
            Self::InvalidNad { .. } => ErrorLevel::InvalidNad,
            Self::InvalidPcb { .. } => ErrorLevel::InvalidPcb,
            Self::DeclaredLengthExceedsData { .. }
            | Self::LengthOutOfRange { .. }
            | Self::MissingStatusWord { .. } => ErrorLevel::InvalidCombinedBytes,
            Self::ChecksumMismatch { .. } => ErrorLevel::MissingLrc,
        }
    }

    /// Whether more bytes may still turn this into a valid frame.
    ///
    /// Pending faults stop the dispatch loop quietly; every other fault is
    /// reported to the caller.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        matches!(
            self,
            Self::ShortHeader { .. }
                | Self::TruncatedFragment { .. }
                | Self::DeclaredLengthExceedsData { .. }
                | Self::IncompleteChain { .. }
        )
    }
}
