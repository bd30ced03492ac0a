//! Growable logical byte buffer backed by the buffer pool.
//!
//! The accumulator holds every byte received from the link that has not yet
//! been dispatched. Its logical length is tracked separately from the
//! physical capacity of the rented storage, and the storage is only present
//! while at least one byte is pending.

use std::sync::Arc;

use crate::pool::{BufferPool, PooledBuffer};

/// Pending link bytes for one parser instance.
#[derive(Debug)]
pub struct ByteAccumulator {
    pool: Arc<BufferPool>,
    storage: Option<PooledBuffer>,
    len: usize,
}

impl ByteAccumulator {
    /// Create an empty accumulator renting from `pool`.
    #[must_use]
    pub fn new(pool: Arc<BufferPool>) -> Self {
        Self {
            pool,
            storage: None,
            len: 0,
        }
    }

    /// Number of pending bytes.
    #[must_use]
    pub fn len(&self) -> usize { self.len }

    /// Whether no bytes are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.len == 0 }

    /// Physical size of the backing storage, zero when none is held.
    #[must_use]
    pub fn capacity(&self) -> usize { self.storage.as_ref().map_or(0, |s| s.capacity()) }

    /// Whether backing storage is currently rented.
    #[must_use]
    pub fn holds_storage(&self) -> bool { self.storage.is_some() }

    /// Borrow the pending bytes.
    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        self.storage
            .as_deref()
            .and_then(|storage| storage.get(..self.len))
            .unwrap_or_default()
    }

    /// Append `bytes` at the logical end, growing the storage when needed.
    ///
    /// Growth rents a buffer large enough for the combined content, copies
    /// the pending bytes across and returns the old storage to the pool.
    pub fn append(&mut self, bytes: &[u8]) {
        if bytes.is_empty() {
            return;
        }
        let required = self.len + bytes.len();
        if required > self.capacity() {
            let mut grown = self.pool.rent(required);
            grown[..self.len].copy_from_slice(self.as_slice());
            self.storage = Some(grown);
        }
        if let Some(storage) = self.storage.as_mut() {
            storage[self.len..required].copy_from_slice(bytes);
            self.len = required;
        }
    }

    /// Drop the first `n` pending bytes.
    ///
    /// Consuming everything releases the storage. Otherwise the remainder is
    /// slid into a freshly rented buffer sized to fit it.
    pub fn consume(&mut self, n: usize) {
        if n == 0 {
            return;
        }
        if n >= self.len {
            self.release();
            return;
        }
        let remaining = self.len - n;
        let mut slid = self.pool.rent(remaining);
        slid[..remaining].copy_from_slice(&self.as_slice()[n..]);
        self.storage = Some(slid);
        self.len = remaining;
    }

    /// Return the storage to the pool and forget all pending bytes.
    ///
    /// Reports whether anything was held.
    pub fn release(&mut self) -> bool {
        let held = self.storage.take().is_some() || self.len > 0;
        self.len = 0;
        held
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::ByteAccumulator;
    use crate::pool::BufferPool;

    #[fixture]
    fn accumulator() -> ByteAccumulator { ByteAccumulator::new(BufferPool::new()) }

    #[rstest]
    fn starts_without_storage(accumulator: ByteAccumulator) {
        assert!(accumulator.is_empty());
        assert!(!accumulator.holds_storage());
        assert_eq!(accumulator.as_slice(), &[] as &[u8]);
    }

    #[rstest]
    fn empty_append_is_a_no_op(mut accumulator: ByteAccumulator) {
        accumulator.append(&[]);
        assert!(!accumulator.holds_storage());
    }

    #[rstest]
    fn appends_preserve_order_across_growth(mut accumulator: ByteAccumulator) {
        let first: Vec<u8> = (0..10).collect();
        let second: Vec<u8> = (10..40).collect();
        accumulator.append(&first);
        let small_capacity = accumulator.capacity();
        accumulator.append(&second);

        assert!(accumulator.capacity() > small_capacity);
        assert_eq!(accumulator.len(), 40);
        assert_eq!(accumulator.as_slice(), (0..40).collect::<Vec<u8>>().as_slice());
    }

    #[rstest]
    fn consume_slides_remaining_bytes(mut accumulator: ByteAccumulator) {
        accumulator.append(&[1, 2, 3, 4, 5]);
        accumulator.consume(2);
        assert_eq!(accumulator.as_slice(), &[3, 4, 5]);
        assert!(accumulator.len() <= accumulator.capacity());
    }

    #[rstest]
    #[case(5)]
    #[case(9)]
    fn consuming_everything_releases_storage(
        mut accumulator: ByteAccumulator,
        #[case] consumed: usize,
    ) {
        accumulator.append(&[1, 2, 3, 4, 5]);
        accumulator.consume(consumed);
        assert!(accumulator.is_empty());
        assert!(!accumulator.holds_storage());
    }

    #[test]
    fn storage_returns_to_pool() {
        let pool = BufferPool::new();
        let mut accumulator = ByteAccumulator::new(pool.clone());
        accumulator.append(&[0xAA; 20]);
        accumulator.append(&[0xBB; 40]);
        accumulator.consume(10);
        assert_eq!(pool.outstanding(), 1);

        assert!(accumulator.release());
        assert_eq!(pool.outstanding(), 0);
        assert!(!accumulator.release());
    }
}
