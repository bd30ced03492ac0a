//! Callback shapes receiving dispatched payloads.
//!
//! A drain call is given exactly one [`ResponseHandler`]. Its variant decides
//! what the caller receives: decoded tags, decoded tags plus the `PCB` byte,
//! or the raw payload bytes.

use std::fmt;

use crate::{status::StatusCode, tlv::Tlv};

/// Callback for tag-based responses.
pub type TagsFn<'a> = dyn FnMut(Option<Vec<Tlv>>, StatusCode, bool) + Send + 'a;
/// Callback for contactless responses, which also receive the `PCB` byte.
pub type ContactlessFn<'a> = dyn FnMut(Option<Vec<Tlv>>, StatusCode, u8, bool) + Send + 'a;
/// Callback for raw payloads.
pub type TaglessFn<'a> = dyn FnMut(&[u8], usize, StatusCode, bool) + Send + 'a;

/// The single handler a drain call delivers to.
///
/// Every callback receives a trailing `cancelled` flag. It is `false` for
/// payloads coming off the link and `true` when the caller gives up waiting
/// through [`ResponseHandler::cancel`].
pub enum ResponseHandler<'a> {
    /// Decoded tags and status. Also notified with absent tags and
    /// [`StatusCode::FAILURE`] when a frame is rejected.
    Tags(Box<TagsFn<'a>>),
    /// Decoded tags, status and the terminating packet's `PCB`.
    Contactless(Box<ContactlessFn<'a>>),
    /// Raw payload, its length and status.
    Tagless(Box<TaglessFn<'a>>),
}

impl<'a> ResponseHandler<'a> {
    /// Wrap a tag callback.
    pub fn tags(f: impl FnMut(Option<Vec<Tlv>>, StatusCode, bool) + Send + 'a) -> Self {
        Self::Tags(Box::new(f))
    }

    /// Wrap a contactless callback.
    pub fn contactless(f: impl FnMut(Option<Vec<Tlv>>, StatusCode, u8, bool) + Send + 'a) -> Self {
        Self::Contactless(Box::new(f))
    }

    /// Wrap a raw payload callback.
    pub fn tagless(f: impl FnMut(&[u8], usize, StatusCode, bool) + Send + 'a) -> Self {
        Self::Tagless(Box::new(f))
    }

    /// Whether this handler wants TLV-decoded payloads.
    #[must_use]
    pub fn wants_tags(&self) -> bool { !matches!(self, Self::Tagless(_)) }

    /// Release a caller waiting on this handler without a payload.
    pub fn cancel(&mut self, status: StatusCode) {
        match self {
            Self::Tags(f) => f(None, status, true),
            Self::Contactless(f) => f(None, status, 0, true),
            Self::Tagless(f) => f(&[], 0, status, true),
        }
    }

    /// Report a rejected frame. Only the tag shape is notified.
    pub(crate) fn fail(&mut self) {
        if let Self::Tags(f) = self {
            f(None, StatusCode::FAILURE, false);
        }
    }

    pub(crate) fn deliver(
        &mut self,
        tags: Option<Vec<Tlv>>,
        payload: &[u8],
        status: StatusCode,
        pcb: u8,
    ) {
        match self {
            Self::Tags(f) => f(tags, status, false),
            Self::Contactless(f) => f(tags, status, pcb, false),
            Self::Tagless(f) => f(payload, payload.len(), status, false),
        }
    }
}

impl fmt::Debug for ResponseHandler<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = match self {
            Self::Tags(_) => "Tags",
            Self::Contactless(_) => "Contactless",
            Self::Tagless(_) => "Tagless",
        };
        f.debug_tuple("ResponseHandler").field(&shape).finish()
    }
}
