//! Cache Statistics Module
//!
//! Tracks cache performance metrics: hits, misses, evictions, expirations.

use serde::Serialize;

// == Cache Stats ==
/// Counters describing how the cache has been used.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CacheStats {
    /// Lookups served from a stored entry
    pub hits: u64,
    /// Lookups that had to run the compute function (or join a flight)
    pub misses: u64,
    /// Entries removed by the eviction policy under capacity pressure
    pub evictions: u64,
    /// Entries removed because their TTL elapsed
    pub expirations: u64,
    /// Current number of entries in the cache
    pub total_entries: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no lookups have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Increments the hit counter.
    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    /// Increments the miss counter.
    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    /// Increments the eviction counter.
    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    /// Increments the expiration counter.
    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }

    /// Updates the total entries count.
    pub fn set_total_entries(&mut self, count: usize) {
        self.total_entries = count;
    }
}
