//! Builders for link packets with valid checksums.

use vipaframe::frame::{CHAINED_BIT, lrc};

/// Build `NAD PCB LEN body LRC`.
///
/// # Panics
///
/// Panics if `body` is longer than 255 bytes.
#[must_use]
pub fn packet(nad: u8, pcb: u8, body: &[u8]) -> Vec<u8> {
    let len = u8::try_from(body.len()).expect("body fits in LEN");
    let mut out = vec![nad, pcb, len];
    out.extend_from_slice(body);
    out.push(lrc(&out));
    out
}

/// Terminal response packet carrying `data` and `SW1 SW2`.
#[must_use]
pub fn response(data: &[u8], sw1: u8, sw2: u8) -> Vec<u8> {
    let mut body = data.to_vec();
    body.extend_from_slice(&[sw1, sw2]);
    packet(0x01, 0x00, &body)
}

/// Chained command: `body` split into packets of at most `chunk` bytes, the
/// last of which is a terminal response carrying the status word.
#[must_use]
pub fn chained_command(body: &[u8], chunk: usize, sw1: u8, sw2: u8) -> Vec<u8> {
    let mut pieces: Vec<&[u8]> = body.chunks(chunk).collect();
    let last = pieces.pop().unwrap_or_default();
    let mut out = Vec::new();
    for piece in pieces {
        out.extend(packet(0x01, CHAINED_BIT, piece));
    }
    out.extend(response(last, sw1, sw2));
    out
}

/// Chained response: `data` followed by `SW1 SW2`, split into packets of at
/// most `chunk` bytes. Only the last packet has the chained bit clear.
#[must_use]
pub fn chained_response(data: &[u8], chunk: usize, sw1: u8, sw2: u8) -> Vec<u8> {
    let mut body = data.to_vec();
    body.extend_from_slice(&[sw1, sw2]);
    let mut pieces: Vec<&[u8]> = body.chunks(chunk).collect();
    let last = pieces.pop().unwrap_or_default();
    let mut out = Vec::new();
    for piece in pieces {
        out.extend(packet(0x01, CHAINED_BIT, piece));
    }
    out.extend(packet(0x01, 0x00, last));
    out
}

/// Wrap `inner` in `levels` constructed `tag` records, each using a
/// three-byte long-form length.
///
/// # Panics
///
/// Panics if the outermost value is longer than `0xFF_FFFF` bytes.
#[must_use]
pub fn nested_tlv(tag: u8, levels: usize, inner: &[u8]) -> Vec<u8> {
    const HEADER: usize = 5;
    let mut out = Vec::with_capacity(levels * HEADER + inner.len());
    for level in 0..levels {
        let value_len = inner.len() + (levels - level - 1) * HEADER;
        let len = u32::try_from(value_len).expect("value length fits in three bytes");
        assert!(len <= 0xFF_FFFF, "value length fits in three bytes");
        let [_, hi, mid, lo] = len.to_be_bytes();
        out.extend_from_slice(&[tag, 0x83, hi, mid, lo]);
    }
    out.extend_from_slice(inner);
    out
}
