//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A single cached value with its insertion time and optional expiry.
///
/// Entries are owned exclusively by the cache. Lookups hand out clones of
/// the value, never references into the entry itself.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    /// The stored value
    value: V,
    /// When the entry was inserted
    inserted_at: Instant,
    /// Deadline after which the entry counts as absent, None = no expiration
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    // == Constructor ==
    /// Creates a new cache entry with optional TTL.
    pub fn new(value: V, ttl: Option<Duration>) -> Self {
        let now = Instant::now();
        Self {
            value,
            inserted_at: now,
            expires_at: ttl.map(|ttl| now + ttl),
        }
    }

    // == Is Expired ==
    /// Checks whether the entry has expired.
    ///
    /// Boundary condition: an entry is expired once the current time is
    /// greater than or equal to `inserted_at + ttl`, even though it is still
    /// physically present until the next lookup or cleanup removes it.
    pub fn is_expired(&self) -> bool {
        match self.expires_at {
            Some(deadline) => Instant::now() >= deadline,
            None => false,
        }
    }

    /// Age of the entry since insertion.
    pub fn age(&self) -> Duration {
        self.inserted_at.elapsed()
    }

    /// Remaining TTL, or None if the entry never expires.
    ///
    /// Returns `Some(Duration::ZERO)` once the deadline has passed.
    pub fn ttl_remaining(&self) -> Option<Duration> {
        self.expires_at
            .map(|deadline| deadline.saturating_duration_since(Instant::now()))
    }

    /// Borrows the stored value.
    pub fn value(&self) -> &V {
        &self.value
    }

    /// Consumes the entry and returns the value, used when handing an
    /// evicted pair to the `on_evict` callback.
    pub fn into_value(self) -> V {
        self.value
    }
}
