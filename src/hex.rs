//! Hex rendering for log lines and hex parsing for captured responses.

use std::fmt;

use thiserror::Error;

/// Display adapter rendering bytes as `01-00-05-9F`.
///
/// Used for log fields so byte spans are only formatted when the event is
/// actually recorded.
///
/// ```
/// use vipaframe::hex::HexSpan;
///
/// assert_eq!(HexSpan(&[0x01, 0xAB]).to_string(), "01-AB");
/// assert_eq!(HexSpan(&[]).to_string(), "<empty>");
/// ```
#[derive(Clone, Copy, Debug)]
pub struct HexSpan<'a>(pub &'a [u8]);

impl fmt::Display for HexSpan<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some((first, rest)) = self.0.split_first() else {
            return f.write_str("<empty>");
        };
        write!(f, "{first:02X}")?;
        for byte in rest {
            write!(f, "-{byte:02X}")?;
        }
        Ok(())
    }
}

/// Errors raised while parsing a hex string.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum HexError {
    /// A character outside `0-9a-fA-F` was found.
    #[error("invalid hex digit {digit:?} at position {position}")]
    InvalidDigit {
        /// Offending character.
        digit: char,
        /// Character index in the input.
        position: usize,
    },
    /// The input ended halfway through a byte.
    #[error("hex input has an odd number of digits")]
    OddLength,
}

/// Parse hex digits into bytes, ignoring whitespace, `-` and `:` separators.
///
/// # Errors
///
/// Returns [`HexError`] on non-hex characters or a dangling nibble.
///
/// ```
/// use vipaframe::hex::parse_hex;
///
/// assert_eq!(parse_hex("01 00-05:ff").unwrap(), vec![0x01, 0x00, 0x05, 0xFF]);
/// ```
pub fn parse_hex(input: &str) -> Result<Vec<u8>, HexError> {
    let mut bytes = Vec::with_capacity(input.len() / 2);
    let mut high: Option<u8> = None;
    for (position, digit) in input.chars().enumerate() {
        if digit.is_whitespace() || matches!(digit, '-' | ':') {
            continue;
        }
        let nibble = digit
            .to_digit(16)
            .and_then(|value| u8::try_from(value).ok())
            .ok_or(HexError::InvalidDigit { digit, position })?;
        match high.take() {
            Some(upper) => bytes.push((upper << 4) | nibble),
            None => high = Some(nibble),
        }
    }
    if high.is_some() {
        return Err(HexError::OddLength);
    }
    Ok(bytes)
}
