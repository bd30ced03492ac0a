//! Failures raised while decoding tag-length-value records.

use thiserror::Error;

/// A malformed TLV stream.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum TlvError {
    /// The input ended inside a multi-byte tag.
    #[error("tag truncated at offset {offset}")]
    TruncatedTag {
        /// Offset of the tag's first byte.
        offset: usize,
    },

    /// A tag used more bytes than fit in a `u32`.
    #[error("tag at offset {offset} is longer than four bytes")]
    TagTooLong {
        /// Offset of the tag's first byte.
        offset: usize,
    },

    /// The input ended inside a length field.
    #[error("length of tag {tag:#X} truncated at offset {offset}")]
    TruncatedLength {
        /// Tag whose length was being read.
        tag: u32,
        /// Offset of the length field.
        offset: usize,
    },

    /// Indefinite or oversized length forms.
    #[error("unsupported length form {form:#04x} for tag {tag:#X}")]
    UnsupportedLength {
        /// Tag whose length was being read.
        tag: u32,
        /// First byte of the length field.
        form: u8,
    },

    /// The declared value runs past the end of the input.
    #[error("value of tag {tag:#X} needs {declared} bytes, {available} available")]
    ValueOverrun {
        /// Tag whose value was being read.
        tag: u32,
        /// Declared value length.
        declared: usize,
        /// Bytes left in the input.
        available: usize,
    },

    /// Nested tags are stacked deeper than the decoder follows.
    #[error("tag {tag:#X} nested deeper than {limit} levels")]
    NestingTooDeep {
        /// Tag that would have opened one level too many.
        tag: u32,
        /// Deepest nesting followed.
        limit: usize,
    },
}
