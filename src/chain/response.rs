//! Walking a buffered chained response sub-frame by sub-frame.

use std::sync::Arc;

use tracing::debug;

use super::trailing_end;
use crate::{
    frame::{FrameFault, FrameHeader, HEADER_LEN, lrc},
    hex::HexSpan,
    pool::{BufferPool, PooledBuffer},
    status::StatusCode,
};

/// NAD of the synthetic header opening a reassembled final response.
const FINAL_RESPONSE_NAD: u8 = 0x01;
/// LEN of the synthetic header opening a reassembled final response.
const FINAL_RESPONSE_LEN: u8 = 0xFE;

/// A fully reassembled chained response.
#[derive(Debug)]
pub struct ChainedResponse {
    storage: PooledBuffer,
    start: usize,
    len: usize,
    status: StatusCode,
    pcb: u8,
    frames: usize,
}

impl ChainedResponse {
    /// Application payload without header or status word.
    #[must_use]
    pub fn payload(&self) -> &[u8] { &self.storage[self.start..self.start + self.len] }

    /// Status word taken from the tail of the reassembled bytes.
    #[must_use]
    pub fn status(&self) -> StatusCode { self.status }

    /// `PCB` of the terminating sub-frame.
    #[must_use]
    pub fn pcb(&self) -> u8 { self.pcb }

    /// Number of sub-frames walked.
    #[must_use]
    pub fn frames(&self) -> usize { self.frames }

    /// Release the payload storage along with its offset and length.
    #[must_use]
    pub fn into_parts(self) -> (PooledBuffer, usize, usize) { (self.storage, self.start, self.len) }
}

/// Reassemble the chained response held in `buf`.
///
/// Each sub-frame is checksummed on its own. The first sub-frame keeps its
/// `NAD PCB LEN` prefix, later ones contribute only their body, and the walk
/// stops at the first sub-frame whose chained bit is clear. A leading
/// final-response header (`NAD 01`, `LEN FE`) is then stripped and the status
/// word is read from the last meaningful bytes.
///
/// Storage rented for the output is returned to `pool` on every error path.
///
/// # Errors
///
/// * [`FrameFault::IncompleteChain`] when the terminating sub-frame has not
///   fully arrived;
/// * [`FrameFault::ChecksumMismatch`] when a sub-frame fails its checksum;
/// * [`FrameFault::MissingStatusWord`] when too few bytes remain for `SW1 SW2`.
pub fn reassemble_response(
    pool: &Arc<BufferPool>,
    buf: &[u8],
    port: &str,
) -> Result<ChainedResponse, FrameFault> {
    let incomplete = FrameFault::IncompleteChain { have: buf.len() };
    if buf.is_empty() {
        return Err(incomplete);
    }
    let message_len = trailing_end(buf, buf.len() - 1) + 1;
    let mut out = pool.rent(message_len);
    let mut written = 0;
    let mut offset = 0;
    let mut frame = 1;

    let terminal = loop {
        let header =
            FrameHeader::parse(&buf[offset..message_len]).ok_or_else(|| incomplete.clone())?;
        let lrc_at = offset + header.lrc_index();
        if lrc_at >= message_len {
            return Err(incomplete);
        }
        let calculated = lrc(&buf[offset..lrc_at]);
        let received = buf[lrc_at];
        if received != calculated {
            return Err(FrameFault::ChecksumMismatch {
                frame,
                received,
                calculated,
            });
        }
        debug!(
            port,
            frame,
            bytes = %HexSpan(&buf[offset..=lrc_at]),
            "chained response sub-frame"
        );

        let body_start = if offset == 0 { offset } else { offset + HEADER_LEN };
        let body = &buf[body_start..lrc_at];
        out[written..written + body.len()].copy_from_slice(body);
        written += body.len();

        if !header.is_chained() {
            break header;
        }
        offset = lrc_at + 1;
        frame += 1;
    };

    let start = match out.get(..HEADER_LEN) {
        Some([FINAL_RESPONSE_NAD, _, FINAL_RESPONSE_LEN]) if written >= HEADER_LEN => HEADER_LEN,
        _ => 0,
    };
    let assembled = &out[start..written];
    if assembled.len() < 2 {
        return Err(FrameFault::MissingStatusWord {
            len: assembled.len(),
        });
    }
    let sw2 = trailing_end(assembled, assembled.len() - 1);
    if sw2 == 0 {
        return Err(FrameFault::MissingStatusWord {
            len: assembled.len(),
        });
    }
    let status = StatusCode::from_sw(assembled[sw2 - 1], assembled[sw2]);

    Ok(ChainedResponse {
        storage: out,
        start,
        len: sw2 - 1,
        status,
        pcb: terminal.pcb(),
        frames: frame,
    })
}
