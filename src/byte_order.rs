//! Helpers for explicit network byte-order conversions.
//!
//! Status words travel as `SW1 SW2`, most significant byte first. These
//! helpers keep Clippy expectations scoped to the conversion points so the
//! framing code stays explicit about wire endianness.

/// Serialise a `u16` status word in network byte order (big-endian).
///
/// # Examples
///
/// ```
/// use vipaframe::byte_order::write_network_u16;
///
/// assert_eq!(write_network_u16(0x9000), [0x90, 0x00]);
/// ```
#[must_use]
pub fn write_network_u16(value: u16) -> [u8; 2] {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Status words are transmitted big-endian."
    )]
    value.to_be_bytes()
}

/// Parse a network-order `u16` from its on-wire representation.
///
/// # Examples
///
/// ```
/// use vipaframe::byte_order::read_network_u16;
///
/// assert_eq!(read_network_u16([0x6A, 0x82]), 0x6A82);
/// ```
#[must_use]
pub fn read_network_u16(bytes: [u8; 2]) -> u16 {
    #[expect(
        clippy::big_endian_bytes,
        reason = "Status words are transmitted big-endian."
    )]
    u16::from_be_bytes(bytes)
}
