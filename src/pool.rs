//! Rent/return arena for variable-length byte buffers.
//!
//! [`BufferPool`] keeps idle `Vec<u8>` allocations in power-of-two size
//! classes so the accumulator and the chain reassembler can grow and slide
//! their buffers without allocating per chunk. A rented buffer is handed out
//! as a [`PooledBuffer`] guard which owns the storage exclusively and puts it
//! back into its size class when dropped, so every exit path (including early
//! returns on malformed input) returns the memory.
//!
//! Like most array pools the rented storage is *not* cleared: a buffer may be
//! longer than requested and may contain bytes left behind by a previous
//! renter. Callers track their own logical length.

use std::{
    ops::{Deref, DerefMut},
    sync::{
        Arc,
        Mutex,
        PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
};

/// Smallest size class handed out by the pool.
pub const MIN_BUCKET_SIZE: usize = 16;

/// Idle buffers kept per size class before extra returns are freed.
const MAX_IDLE_PER_BUCKET: usize = 8;

/// Number of power-of-two size classes (16 B .. 1 MiB).
const BUCKET_COUNT: usize = 17;

/// Shared arena of reusable byte buffers.
///
/// # Examples
///
/// ```
/// use vipaframe::pool::BufferPool;
///
/// let pool = BufferPool::new();
/// {
///     let buffer = pool.rent(100);
///     assert!(buffer.len() >= 100);
///     assert_eq!(pool.outstanding(), 1);
/// }
/// assert_eq!(pool.outstanding(), 0);
/// assert_eq!(pool.idle(), 1);
/// ```
#[derive(Debug)]
pub struct BufferPool {
    buckets: Mutex<Vec<Vec<Vec<u8>>>>,
    outstanding: AtomicUsize,
}

impl BufferPool {
    /// Create an empty pool behind an [`Arc`] so guards can return to it.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            buckets: Mutex::new(vec![Vec::new(); BUCKET_COUNT]),
            outstanding: AtomicUsize::new(0),
        })
    }

    /// Rent a buffer holding at least `min_len` bytes.
    ///
    /// Requests larger than the biggest size class are served with an exact
    /// allocation that is freed rather than pooled on return.
    #[must_use]
    pub fn rent(self: &Arc<Self>, min_len: usize) -> PooledBuffer {
        let storage = match bucket_for(min_len) {
            Some(bucket) => self
                .lock_buckets()
                .get_mut(bucket)
                .and_then(Vec::pop)
                .unwrap_or_else(|| vec![0; bucket_size(bucket)]),
            None => vec![0; min_len],
        };
        self.outstanding.fetch_add(1, Ordering::Relaxed);
        PooledBuffer {
            storage,
            pool: Arc::clone(self),
        }
    }

    /// Number of rented buffers not yet returned.
    #[must_use]
    pub fn outstanding(&self) -> usize { self.outstanding.load(Ordering::Relaxed) }

    /// Number of idle buffers held for reuse.
    #[must_use]
    pub fn idle(&self) -> usize { self.lock_buckets().iter().map(Vec::len).sum() }

    fn give_back(&self, storage: Vec<u8>) {
        self.outstanding.fetch_sub(1, Ordering::Relaxed);
        let Some(bucket) = exact_bucket(storage.len()) else {
            return;
        };
        let mut buckets = self.lock_buckets();
        if let Some(idle) = buckets.get_mut(bucket)
            && idle.len() < MAX_IDLE_PER_BUCKET
        {
            idle.push(storage);
        }
    }

    fn lock_buckets(&self) -> std::sync::MutexGuard<'_, Vec<Vec<Vec<u8>>>> {
        self.buckets.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn bucket_size(bucket: usize) -> usize { MIN_BUCKET_SIZE << bucket }

fn bucket_for(min_len: usize) -> Option<usize> {
    let size = min_len.max(MIN_BUCKET_SIZE).checked_next_power_of_two()?;
    let bucket = (size / MIN_BUCKET_SIZE).trailing_zeros() as usize;
    (bucket < BUCKET_COUNT).then_some(bucket)
}

fn exact_bucket(len: usize) -> Option<usize> {
    bucket_for(len).filter(|bucket| bucket_size(*bucket) == len)
}

/// Exclusive handle to storage rented from a [`BufferPool`].
///
/// Dereferences to the whole physical buffer; the storage returns to the
/// pool when the guard is dropped.
#[derive(Debug)]
pub struct PooledBuffer {
    storage: Vec<u8>,
    pool: Arc<BufferPool>,
}

impl PooledBuffer {
    /// Physical size of the rented storage.
    #[must_use]
    pub fn capacity(&self) -> usize { self.storage.len() }
}

impl Deref for PooledBuffer {
    type Target = [u8];

    fn deref(&self) -> &Self::Target { &self.storage }
}

impl DerefMut for PooledBuffer {
    fn deref_mut(&mut self) -> &mut Self::Target { &mut self.storage }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) { self.pool.give_back(std::mem::take(&mut self.storage)); }
}
