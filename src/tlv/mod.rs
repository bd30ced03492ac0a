//! BER-TLV decoding of dispatched payloads.
//!
//! The parser hands successful payloads to a [`TagDecoder`]. [`BerTlvDecoder`]
//! is the default implementation; callers with their own tag model can
//! install a different decoder on the parser.

mod error;

pub use error::TlvError;

/// Constructed tags whose values are decoded into child records.
pub const NESTED_TAGS: [u32; 8] = [0xEE, 0xEF, 0xF0, 0xE0, 0xE4, 0xE7, 0xFF7C, 0xFF7F];

const MULTI_BYTE_TAG: u8 = 0x1F;
const MORE_TAG_BYTES: u8 = 0x80;
const LONG_LENGTH: u8 = 0x80;
const MAX_TAG_BYTES: usize = 4;
const MAX_LENGTH_BYTES: usize = 4;
/// Deepest chain of nested tags decoded into children.
pub const MAX_NESTING_DEPTH: usize = 32;

/// One decoded tag-length-value record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tlv {
    tag: u32,
    value: Vec<u8>,
    children: Option<Vec<Tlv>>,
}

impl Tlv {
    /// Build a primitive record.
    #[must_use]
    pub fn new(tag: u32, value: impl Into<Vec<u8>>) -> Self {
        Self {
            tag,
            value: value.into(),
            children: None,
        }
    }

    /// Numeric tag identifier, leading bytes first.
    #[must_use]
    pub const fn tag(&self) -> u32 { self.tag }

    /// Raw value bytes.
    #[must_use]
    pub fn value(&self) -> &[u8] { &self.value }

    /// Child records when the tag is one of the nested set.
    #[must_use]
    pub fn children(&self) -> Option<&[Tlv]> { self.children.as_deref() }

    /// Depth-first search for `tag` in this record and its descendants.
    #[must_use]
    pub fn find(&self, tag: u32) -> Option<&Tlv> {
        if self.tag == tag {
            return Some(self);
        }
        self.children()?.iter().find_map(|child| child.find(tag))
    }
}

/// Decoder boundary used by the dispatch loop.
pub trait TagDecoder: Send + Sync {
    /// Decode every record in `buf`, descending into tags listed in `nested`.
    ///
    /// # Errors
    ///
    /// Returns [`TlvError`] when `buf` is not a well-formed TLV stream.
    fn decode(&self, buf: &[u8], nested: &[u32]) -> Result<Vec<Tlv>, TlvError>;
}

/// Decoder for BER-TLV with up to four-byte tags and definite lengths.
///
/// Zero bytes between records are skipped as padding. Nested tags are
/// followed at most [`MAX_NESTING_DEPTH`] levels deep.
///
/// ```
/// use vipaframe::tlv::{BerTlvDecoder, NESTED_TAGS, TagDecoder};
///
/// let tags = BerTlvDecoder.decode(&[0xE0, 0x03, 0x9F, 0x1E, 0x00], &NESTED_TAGS).unwrap();
/// let child = &tags[0].children().unwrap()[0];
/// assert_eq!(child.tag(), 0x9F1E);
/// assert!(child.value().is_empty());
/// ```
#[derive(Clone, Copy, Debug, Default)]
pub struct BerTlvDecoder;

impl TagDecoder for BerTlvDecoder {
    fn decode(&self, buf: &[u8], nested: &[u32]) -> Result<Vec<Tlv>, TlvError> {
        decode_level(buf, nested, 0)
    }
}

fn decode_level(buf: &[u8], nested: &[u32], depth: usize) -> Result<Vec<Tlv>, TlvError> {
    let mut records = Vec::new();
    let mut offset = 0;
    while offset < buf.len() {
        if buf[offset] == 0x00 {
            offset += 1;
            continue;
        }
        let (tag, tag_len) = read_tag(buf, offset)?;
        offset += tag_len;
        let (len, len_len) = read_length(buf, offset, tag)?;
        offset += len_len;
        let available = buf.len() - offset;
        if len > available {
            return Err(TlvError::ValueOverrun {
                tag,
                declared: len,
                available,
            });
        }
        let value = &buf[offset..offset + len];
        offset += len;

        let children = if nested.contains(&tag) {
            if depth == MAX_NESTING_DEPTH {
                return Err(TlvError::NestingTooDeep {
                    tag,
                    limit: MAX_NESTING_DEPTH,
                });
            }
            Some(decode_level(value, nested, depth + 1)?)
        } else {
            None
        };
        records.push(Tlv {
            tag,
            value: value.to_vec(),
            children,
        });
    }
    Ok(records)
}

fn read_tag(buf: &[u8], offset: usize) -> Result<(u32, usize), TlvError> {
    let first = buf[offset];
    let mut tag = u32::from(first);
    if first & MULTI_BYTE_TAG != MULTI_BYTE_TAG {
        return Ok((tag, 1));
    }
    let mut used = 1;
    loop {
        let byte = *buf
            .get(offset + used)
            .ok_or(TlvError::TruncatedTag { offset })?;
        used += 1;
        if used > MAX_TAG_BYTES {
            return Err(TlvError::TagTooLong { offset });
        }
        tag = (tag << 8) | u32::from(byte);
        if byte & MORE_TAG_BYTES == 0 {
            return Ok((tag, used));
        }
    }
}

fn read_length(buf: &[u8], offset: usize, tag: u32) -> Result<(usize, usize), TlvError> {
    let form = *buf
        .get(offset)
        .ok_or(TlvError::TruncatedLength { tag, offset })?;
    if form & LONG_LENGTH == 0 {
        return Ok((usize::from(form), 1));
    }
    let count = usize::from(form & !LONG_LENGTH);
    if count == 0 || count > MAX_LENGTH_BYTES {
        return Err(TlvError::UnsupportedLength { tag, form });
    }
    let bytes = buf
        .get(offset + 1..offset + 1 + count)
        .ok_or(TlvError::TruncatedLength { tag, offset })?;
    let len = bytes
        .iter()
        .fold(0usize, |acc, byte| (acc << 8) | usize::from(*byte));
    Ok((len, 1 + count))
}
