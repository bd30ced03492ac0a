//! Two-byte status words reported with every dispatched payload.

use std::fmt;

use crate::byte_order::{read_network_u16, write_network_u16};

/// `SW1 SW2` status word in its combined 16-bit form.
///
/// # Examples
///
/// ```
/// use vipaframe::StatusCode;
///
/// let status = StatusCode::from_sw(0x90, 0x00);
/// assert!(status.is_success());
/// assert_eq!(status.to_string(), "0x9000");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StatusCode(u16);

impl StatusCode {
    /// Command completed normally.
    pub const SUCCESS: Self = Self(0x9000);
    /// Generic failure reported to a waiting caller when a frame is rejected.
    pub const FAILURE: Self = Self(0x6F00);

    /// Wrap a raw status word.
    #[must_use]
    pub const fn new(value: u16) -> Self { Self(value) }

    /// Combine `SW1` and `SW2`.
    #[must_use]
    pub fn from_sw(sw1: u8, sw2: u8) -> Self { Self(read_network_u16([sw1, sw2])) }

    /// Raw 16-bit value.
    #[must_use]
    pub const fn get(self) -> u16 { self.0 }

    /// High byte.
    #[must_use]
    pub fn sw1(self) -> u8 { write_network_u16(self.0)[0] }

    /// Low byte.
    #[must_use]
    pub fn sw2(self) -> u8 { write_network_u16(self.0)[1] }

    /// Whether this is [`StatusCode::SUCCESS`].
    #[must_use]
    pub fn is_success(self) -> bool { self == Self::SUCCESS }
}

impl From<u16> for StatusCode {
    fn from(value: u16) -> Self { Self(value) }
}

impl From<StatusCode> for u16 {
    fn from(value: StatusCode) -> Self { value.0 }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { write!(f, "0x{:04X}", self.0) }
}
