//! Locating the last meaningful byte ahead of zero padding.
//!
//! Receive buffers may carry zero filler after the final checksum, and the
//! checksum itself may legitimately be `0x00`. A plain "last non-zero byte"
//! scan would therefore cut a frame short whenever its checksum is zero.

/// Index of the last meaningful byte at or before `start`.
///
/// Scanning backward, the first position `p` is accepted when `buf[p]` is
/// non-zero or either of the two bytes before it is non-zero. Bytes before
/// the start of `buf` count as zero. An empty buffer yields `0`.
///
/// The result may overshoot a non-zero checksum by up to two padding bytes,
/// so callers use it as an upper bound rather than an exact frame end.
///
/// ```
/// use vipaframe::chain::trailing_end;
///
/// // SW1 SW2 = 90 00, checksum 00, two bytes of padding.
/// let buf = [0x01, 0x00, 0x02, 0x90, 0x00, 0x00, 0x00, 0x00];
/// assert_eq!(trailing_end(&buf, buf.len() - 1), 5);
/// ```
#[must_use]
pub fn trailing_end(buf: &[u8], start: usize) -> usize {
    let Some(last) = buf.len().checked_sub(1) else {
        return 0;
    };
    let mut pos = start.min(last);
    while pos > 0 {
        let before = buf[pos - 1];
        let before_that = pos.checked_sub(2).map_or(0, |idx| buf[idx]);
        if buf[pos] != 0 || before != 0 || before_that != 0 {
            break;
        }
        pos -= 1;
    }
    pos
}

/// Whether `buf` holds nothing but zero filler.
#[must_use]
pub fn is_padding(buf: &[u8]) -> bool { !buf.is_empty() && buf.iter().all(|byte| *byte == 0) }
