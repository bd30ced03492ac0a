//! Chained message reassembly.
//!
//! Payloads larger than one packet travel as a run of packets whose `PCB`
//! has bit 0 set, closed by one packet with the bit clear:
//!
//! ```text
//! 1st packet      : NAD PCB(bit 0 set)   LEN CLA INS P1 P2 Lc Data… LRC
//! 2nd–nth packet  : NAD PCB(bit 0 set)   LEN Data… LRC
//! Last packet     : NAD PCB(bit 0 unset) LEN Data… SW1 SW2 LRC
//! ```
//!
//! Chained commands arrive one packet at a time and are held in a
//! [`FragmentStore`] until the terminating packet shows up. Chained responses
//! are walked as a whole by [`reassemble_response`].

mod lookback;
mod response;

use std::sync::Arc;

pub use lookback::{is_padding, trailing_end};
pub use response::{ChainedResponse, reassemble_response};

use crate::pool::{BufferPool, PooledBuffer};

/// One absorbed packet body held until its chain completes.
#[derive(Debug)]
pub struct Fragment {
    storage: PooledBuffer,
    start: usize,
    len: usize,
}

impl Fragment {
    /// Copy `bytes` into storage rented from `pool`.
    #[must_use]
    pub fn copy_from(pool: &Arc<BufferPool>, bytes: &[u8]) -> Self {
        let mut storage = pool.rent(bytes.len());
        storage[..bytes.len()].copy_from_slice(bytes);
        Self {
            storage,
            start: 0,
            len: bytes.len(),
        }
    }

    /// Adopt `len` bytes of already rented storage beginning at `start`.
    #[must_use]
    pub fn from_storage(storage: PooledBuffer, start: usize, len: usize) -> Self {
        let len = len.min(storage.capacity().saturating_sub(start));
        Self {
            storage,
            start,
            len,
        }
    }

    /// Number of payload bytes held.
    #[must_use]
    pub fn len(&self) -> usize { self.len }

    /// Whether the fragment carries no bytes.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.len == 0 }

    /// Borrow the payload bytes.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] { &self.storage[self.start..self.start + self.len] }
}

/// Ordered fragments of the chain currently in progress.
///
/// Non-empty only between the first absorbed fragment and the completion or
/// abandonment of the chain. Dropping a fragment returns its storage to the
/// pool.
#[derive(Debug, Default)]
pub struct FragmentStore {
    fragments: Vec<Fragment>,
}

impl FragmentStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Append a fragment in arrival order.
    pub fn push(&mut self, fragment: Fragment) { self.fragments.push(fragment); }

    /// Number of held fragments.
    #[must_use]
    pub fn len(&self) -> usize { self.fragments.len() }

    /// Whether no chain is in progress.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.fragments.is_empty() }

    /// Sum of all fragment lengths.
    #[must_use]
    pub fn total_len(&self) -> usize { self.fragments.iter().map(Fragment::len).sum() }

    /// Iterate over the held fragments in arrival order.
    pub fn iter(&self) -> impl Iterator<Item = &Fragment> { self.fragments.iter() }

    /// Concatenate every fragment followed by `tail` into one rented buffer
    /// and empty the store.
    ///
    /// Returns the buffer and the number of bytes written to it.
    #[must_use]
    pub fn assemble(&mut self, pool: &Arc<BufferPool>, tail: &[u8]) -> (PooledBuffer, usize) {
        let total = self.total_len() + tail.len();
        let mut out = pool.rent(total);
        let mut offset = 0;
        for fragment in self.fragments.drain(..) {
            out[offset..offset + fragment.len()].copy_from_slice(fragment.as_slice());
            offset += fragment.len();
        }
        out[offset..total].copy_from_slice(tail);
        (out, total)
    }

    /// Remove every fragment, returning them so the caller can report what
    /// was discarded.
    pub fn take(&mut self) -> Vec<Fragment> { std::mem::take(&mut self.fragments) }
}
