//! Process-wide read error counters keyed by port name.
//!
//! Every parser bound to the same port shares one counter. Counts only ever
//! grow; resetting them is left to whoever owns the registry.

use std::sync::{
    Arc,
    OnceLock,
    atomic::{AtomicU64, Ordering},
};

use dashmap::DashMap;

/// Concurrent map of port name to accumulated error count.
#[derive(Debug, Default)]
pub struct PortErrorRegistry(DashMap<String, AtomicU64>);

impl PortErrorRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Registry shared by every parser in the process.
    #[must_use]
    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<PortErrorRegistry>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Self::new())))
    }

    /// Ensure `port` has an entry, starting at zero if it is new.
    pub fn register(&self, port: &str) {
        if !self.0.contains_key(port) {
            self.0.entry(port.to_owned()).or_default();
        }
    }

    /// Add one error for `port` and return the new total.
    pub fn record(&self, port: &str) -> u64 {
        if let Some(count) = self.0.get(port) {
            return count.fetch_add(1, Ordering::Relaxed) + 1;
        }
        self.0
            .entry(port.to_owned())
            .or_default()
            .fetch_add(1, Ordering::Relaxed)
            + 1
    }

    /// Errors recorded for `port`, or `None` if it was never registered.
    #[must_use]
    pub fn count(&self, port: &str) -> Option<u64> {
        self.0.get(port).map(|count| count.load(Ordering::Relaxed))
    }

    /// Names of all registered ports.
    #[must_use]
    pub fn ports(&self) -> Vec<String> { self.0.iter().map(|entry| entry.key().clone()).collect() }
}
