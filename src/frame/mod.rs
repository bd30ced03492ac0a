//! Link-level frame layout and validation.
//!
//! Every packet on the link has the shape
//!
//! ```text
//! NAD PCB LEN <LEN bytes: CLA INS P1 P2 Lc data… Le | data… SW1 SW2> LRC
//! ```
//!
//! where `LRC` is the XOR of every byte before it. Bit 0 of `PCB` marks a
//! packet as one fragment of a chained message. [`validate`] inspects the
//! head of the receive buffer and decides whether it holds a complete single
//! frame, a chain fragment, a chained-response continuation, or a fault.

pub mod error;

pub use error::{ErrorLevel, FrameFault};

use crate::status::StatusCode;

/// `NAD PCB LEN` prefix length.
pub const HEADER_LEN: usize = 3;
/// Header plus trailing `LRC`.
pub const PROTOCOL_OVERHEAD: usize = HEADER_LEN + 1;
/// Largest value the `LEN` byte may carry.
pub const MAX_PACKET_LEN: usize = 0xFE;
/// Largest packet on the wire, overhead included.
pub const MAX_PACKET_WITH_OVERHEAD: usize = MAX_PACKET_LEN + PROTOCOL_OVERHEAD;
/// `PCB` bit signalling that more fragments follow.
pub const CHAINED_BIT: u8 = 0x01;
/// Accepted node addresses.
pub const VALID_NADS: [u8; 3] = [0x01, 0x02, 0x11];
/// Accepted protocol control bytes.
pub const VALID_PCBS: [u8; 8] = [0x00, 0x01, 0x02, 0x03, 0x40, 0x41, 0x42, 0x43];

/// XOR of all bytes in `bytes`.
///
/// ```
/// use vipaframe::frame::lrc;
///
/// assert_eq!(lrc(&[0x01, 0x00, 0x02, 0x90, 0x00]), 0x93);
/// ```
#[must_use]
pub fn lrc(bytes: &[u8]) -> u8 { bytes.iter().fold(0, |acc, byte| acc ^ byte) }

/// Checksum of the frame at the head of `buf`.
///
/// Covers `span` bytes when given, otherwise `LEN + 3`; never reaches the
/// final byte of `buf` so a checksum byte is always left to compare against.
#[must_use]
pub fn frame_lrc(buf: &[u8], span: Option<usize>) -> u8 {
    let declared = span.unwrap_or_else(|| buf.get(2).map_or(0, |len| usize::from(*len) + HEADER_LEN));
    let covered = declared.min(buf.len().saturating_sub(1));
    lrc(&buf[..covered])
}

/// Decoded `NAD PCB LEN` prefix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameHeader {
    nad: u8,
    pcb: u8,
    len: u8,
}

impl FrameHeader {
    /// Read the header at the start of `buf`, if three bytes are present.
    #[must_use]
    pub fn parse(buf: &[u8]) -> Option<Self> {
        match buf {
            [nad, pcb, len, ..] => Some(Self {
                nad: *nad,
                pcb: *pcb,
                len: *len,
            }),
            _ => None,
        }
    }

    /// Node address.
    #[must_use]
    pub const fn nad(self) -> u8 { self.nad }

    /// Protocol control byte.
    #[must_use]
    pub const fn pcb(self) -> u8 { self.pcb }

    /// Raw `LEN` byte.
    #[must_use]
    pub const fn len_byte(self) -> u8 { self.len }

    /// Number of bytes covered by `LEN`.
    #[must_use]
    pub const fn body_len(self) -> usize { self.len as usize }

    /// Whether more fragments follow this packet.
    #[must_use]
    pub const fn is_chained(self) -> bool { self.pcb & CHAINED_BIT == CHAINED_BIT }

    /// Index of the `LRC` byte relative to the frame start.
    #[must_use]
    pub const fn lrc_index(self) -> usize { self.body_len() + HEADER_LEN }

    /// Total packet size on the wire.
    #[must_use]
    pub const fn frame_len(self) -> usize { self.body_len() + PROTOCOL_OVERHEAD }

    /// Payload bytes of a terminal packet: `LEN` minus `SW1 SW2`.
    #[must_use]
    pub const fn data_len(self) -> usize { self.body_len().saturating_sub(2) }
}

/// Outcome of a successful [`validate`] call.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameKind {
    /// A complete, checksummed, unchained packet.
    Single {
        /// Its header.
        header: FrameHeader,
        /// `SW1 SW2` taken from the end of the body.
        status: StatusCode,
    },
    /// A fully received packet with the chained bit set.
    ChainFragment(FrameHeader),
    /// The buffer holds a chained response to be walked as a whole.
    ChainResponse,
}

/// Classify the bytes at the head of `buf`.
///
/// Checks run in wire order: enough bytes for a header and checksum, then
/// `NAD`, `PCB`, `LEN` against `max_packet_len`, the declared length against
/// the bytes received, and finally the checksum.
///
/// When `resuming_chain_response` is set the address, control and length
/// checks are skipped: the terminating packet of a chained response does not
/// re-validate against the original command, only the reassembled whole is
/// checked.
///
/// # Errors
///
/// Returns a [`FrameFault`]; pending faults ([`FrameFault::is_pending`]) mean
/// the caller should wait for more bytes.
pub fn validate(
    buf: &[u8],
    resuming_chain_response: bool,
    max_packet_len: u8,
) -> Result<FrameKind, FrameFault> {
    if buf.len() < PROTOCOL_OVERHEAD {
        return Err(FrameFault::ShortHeader { have: buf.len() });
    }
    if resuming_chain_response {
        return Ok(FrameKind::ChainResponse);
    }
    let header = FrameHeader::parse(buf).ok_or(FrameFault::ShortHeader { have: buf.len() })?;
    if !VALID_NADS.contains(&header.nad()) {
        return Err(FrameFault::InvalidNad { nad: header.nad() });
    }
    if !VALID_PCBS.contains(&header.pcb()) {
        return Err(FrameFault::InvalidPcb { pcb: header.pcb() });
    }
    if header.len_byte() > max_packet_len {
        return Err(FrameFault::LengthOutOfRange {
            declared: header.len_byte(),
            max: max_packet_len,
        });
    }

    let available = buf.len() - PROTOCOL_OVERHEAD;
    if header.is_chained() {
        // Chain fragments are checked once the chain is complete.
        if header.body_len() > available {
            return Err(FrameFault::TruncatedFragment {
                declared: header.len_byte(),
                available,
            });
        }
        return Ok(FrameKind::ChainFragment(header));
    }
    if header.body_len() > available {
        return Err(FrameFault::DeclaredLengthExceedsData {
            declared: header.len_byte(),
            available,
        });
    }

    let calculated = frame_lrc(buf, None);
    let received = buf[header.lrc_index()];
    if received != calculated {
        return Err(FrameFault::ChecksumMismatch {
            frame: 1,
            received,
            calculated,
        });
    }

    let sw1 = header.body_len() + 1;
    Ok(FrameKind::Single {
        header,
        status: StatusCode::from_sw(buf[sw1], buf[sw1 + 1]),
    })
}

#[cfg(test)]
mod tests;
