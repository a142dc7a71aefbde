//! Cache Store Module
//!
//! The memoizing cache engine: a bounded key/value map behind a pluggable
//! eviction policy, with single-flight coordination so that concurrent
//! lookups for the same missing key run the compute function exactly once.
//!
//! The structural lock guards only map and order updates. The compute
//! function always runs outside of it, so a slow computation for one key
//! never stalls lookups for other keys.

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::hash::Hash;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, trace};

use crate::cache::{CacheEntry, CacheStats, EvictionPolicy, LfuPolicy, LruPolicy};
use crate::error::{CacheError, Result};

/// Callback invoked with each (key, value) pair removed by eviction or expiry.
pub type EvictListener<K, V> = Arc<dyn Fn(&K, &V) + Send + Sync>;

/// Outcome slot shared between a flight's leader and its waiters.
/// `None` until the computation finishes.
type FlightSlot<V> = Option<Result<V>>;

// == Flight ==
/// Marker for a computation currently in flight for one key.
///
/// Created on the first miss for a key, removed when the computation
/// completes or the key is invalidated. Waiters hold a clone of `rx` and
/// block on it instead of recomputing.
struct Flight<V> {
    /// Distinguishes this flight from a successor started after invalidation
    id: u64,
    /// Receiver handed to waiters joining the flight
    rx: watch::Receiver<FlightSlot<V>>,
}

/// Result of a locked probe for a key.
enum Peek<V> {
    Hit(V),
    Expired,
    Miss,
}

/// How a lookup proceeds after the locked probe found no live entry.
enum Step<V> {
    /// Another caller is already computing this key
    Join(watch::Receiver<FlightSlot<V>>),
    /// This caller drives the computation
    Lead(u64, watch::Sender<FlightSlot<V>>),
}

// == Inner State ==
/// Mutable cache state, guarded by a single short-held mutex.
///
/// Invariant: the policy tracks exactly the key set of `entries`, and
/// `entries.len() <= capacity` after every completed operation.
struct Inner<K, V> {
    /// Key-value storage
    entries: HashMap<K, CacheEntry<V>>,
    /// Victim selection for capacity enforcement
    policy: Box<dyn EvictionPolicy<K>>,
    /// One marker per key currently being computed
    pending: HashMap<K, Flight<V>>,
    /// Performance statistics
    stats: CacheStats,
}

impl<K, V> Inner<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn peek(&self, key: &K) -> Peek<V> {
        match self.entries.get(key) {
            Some(entry) if entry.is_expired() => Peek::Expired,
            Some(entry) => Peek::Hit(entry.value().clone()),
            None => Peek::Miss,
        }
    }
}

// == Memoizing Cache ==
/// Bounded, in-process memoization cache with single-flight semantics.
///
/// `get_with` returns the cached value for a key or runs the supplied
/// compute function exactly once among all concurrent callers for that key.
/// Compute failures are delivered to every current waiter and are never
/// cached, so the next lookup retries.
///
/// Cancellation policy: if the caller driving a computation is cancelled,
/// all waiters for that key receive [`CacheError::ComputationCancelled`]
/// and a subsequent lookup starts a fresh computation.
pub struct MemoizingCache<K, V> {
    /// Guarded mutable state; held only for map/order updates
    inner: Mutex<Inner<K, V>>,
    /// Maximum number of live entries; 0 disables caching entirely
    capacity: usize,
    /// Entries older than this count as absent, None = no expiration
    ttl: Option<Duration>,
    /// Observer for evicted and expired entries
    on_evict: Option<EvictListener<K, V>>,
    /// Monotonic id so a flight can tell itself apart from a successor
    flight_seq: AtomicU64,
}

impl<K, V> MemoizingCache<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    // == Constructors ==
    /// Creates a cache with the given capacity, LRU eviction, and no TTL.
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                policy: Box::new(LruPolicy::new()),
                pending: HashMap::new(),
                stats: CacheStats::new(),
            }),
            capacity,
            ttl: None,
            on_evict: None,
            flight_seq: AtomicU64::new(0),
        }
    }

    /// Starts a builder for a cache with non-default policy, TTL, or
    /// eviction observer.
    pub fn builder(capacity: usize) -> CacheBuilder<K, V> {
        CacheBuilder::new(capacity)
    }

    // == Get ==
    /// Returns the value for `key`, computing it on a miss.
    ///
    /// If the key holds a live entry the value is cloned out and the
    /// eviction policy is notified of the access. Otherwise the caller
    /// either becomes the leader that runs `compute`, or joins a flight
    /// already in progress and awaits its outcome. An expired entry is
    /// removed on the spot and treated as a miss.
    ///
    /// A successful result is stored for subsequent lookups unless the key
    /// was invalidated while the computation ran; a failed result is
    /// surfaced to every waiter and not stored.
    pub async fn get_with<F, Fut>(&self, key: K, compute: F) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<V>>,
    {
        let mut expired_value = None;
        let step = {
            let mut inner = self.inner.lock();
            match inner.peek(&key) {
                Peek::Hit(value) => {
                    inner.policy.on_access(&key);
                    inner.stats.record_hit();
                    trace!(?key, "cache hit");
                    return Ok(value);
                }
                Peek::Expired => {
                    if let Some(stale) = inner.entries.remove(&key) {
                        inner.policy.on_remove(&key);
                        inner.stats.record_expiration();
                        expired_value = Some(stale.into_value());
                    }
                    inner.stats.record_miss();
                    trace!(?key, "entry expired, treating as miss");
                }
                Peek::Miss => {
                    inner.stats.record_miss();
                }
            }

            match inner.pending.get(&key) {
                Some(flight) => Step::Join(flight.rx.clone()),
                None => {
                    let id = self.flight_seq.fetch_add(1, Ordering::Relaxed);
                    let (tx, rx) = watch::channel(None);
                    inner.pending.insert(key.clone(), Flight { id, rx });
                    Step::Lead(id, tx)
                }
            }
        };

        if let Some(value) = &expired_value {
            self.notify_removed(&key, value);
        }

        match step {
            Step::Join(mut rx) => {
                trace!(?key, "joining in-flight computation");
                match rx.wait_for(|slot| slot.is_some()).await {
                    Ok(slot) => match (*slot).clone() {
                        Some(outcome) => outcome,
                        // unreachable: wait_for only returns a filled slot
                        None => Err(CacheError::ComputationCancelled(format!("{key:?}"))),
                    },
                    Err(_) => Err(CacheError::ComputationCancelled(format!("{key:?}"))),
                }
            }
            Step::Lead(id, tx) => self.lead(key, id, tx, compute).await,
        }
    }

    /// Drives the computation for a key this caller is leading.
    async fn lead<F, Fut>(
        &self,
        key: K,
        id: u64,
        tx: watch::Sender<FlightSlot<V>>,
        compute: F,
    ) -> Result<V>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = anyhow::Result<V>>,
    {
        // If this future is dropped mid-compute the guard deregisters the
        // flight; dropping `tx` then wakes every waiter with a cancellation.
        let mut guard = FlightGuard {
            cache: self,
            key: Some(key.clone()),
            id,
        };

        debug!(?key, "computing value");
        let outcome = compute().await.map_err(CacheError::computation);
        guard.key = None;

        let evicted = self.finish_flight(&key, id, &outcome);
        // Waiters observe the outcome only after the store is consistent
        let _ = tx.send(Some(outcome.clone()));

        for (victim, value) in &evicted {
            self.notify_removed(victim, value);
        }
        outcome
    }

    /// Stores a finished flight's result and enforces capacity.
    ///
    /// Returns the (key, value) pairs evicted to make room. A flight that
    /// was deregistered by `invalidate`/`clear` while it ran does not store
    /// its result.
    fn finish_flight(&self, key: &K, id: u64, outcome: &Result<V>) -> Vec<(K, V)> {
        let mut inner = self.inner.lock();

        let registered = inner.pending.get(key).is_some_and(|f| f.id == id);
        if registered {
            inner.pending.remove(key);
        } else {
            debug!(?key, "flight deregistered while computing, result dropped");
        }

        let mut evicted = Vec::new();
        if let (true, Ok(value)) = (registered, outcome) {
            inner
                .entries
                .insert(key.clone(), CacheEntry::new(value.clone(), self.ttl));
            inner.policy.on_insert(key);

            while inner.entries.len() > self.capacity {
                let Some(victim) = inner.policy.choose_victim() else {
                    break;
                };
                inner.policy.on_remove(&victim);
                if let Some(entry) = inner.entries.remove(&victim) {
                    inner.stats.record_eviction();
                    trace!(key = ?victim, "evicted entry");
                    evicted.push((victim, entry.into_value()));
                }
            }
        }
        evicted
    }

    // == Invalidate ==
    /// Removes the entry for `key` immediately; no-op if absent.
    ///
    /// A flight in progress for the key is deregistered: it still delivers
    /// its outcome to the waiters that joined it, but the result is not
    /// stored, so the next lookup recomputes.
    pub fn invalidate(&self, key: &K) -> bool {
        let mut inner = self.inner.lock();
        inner.pending.remove(key);
        if inner.entries.remove(key).is_some() {
            inner.policy.on_remove(key);
            debug!(?key, "invalidated entry");
            true
        } else {
            false
        }
    }

    // == Clear ==
    /// Removes all entries and deregisters every in-flight computation.
    ///
    /// In-flight computations still deliver to their waiters; their results
    /// are dropped, same as with [`invalidate`](Self::invalidate).
    pub fn clear(&self) {
        let mut inner = self.inner.lock();
        inner.pending.clear();
        inner.entries.clear();
        inner.policy.clear();
        debug!("cleared cache");
    }

    // == Cleanup Expired ==
    /// Removes all expired entries, returning how many were dropped.
    pub fn purge_expired(&self) -> usize {
        let removed = {
            let mut inner = self.inner.lock();
            let stale: Vec<K> = inner
                .entries
                .iter()
                .filter(|(_, entry)| entry.is_expired())
                .map(|(key, _)| key.clone())
                .collect();

            let mut removed = Vec::with_capacity(stale.len());
            for key in stale {
                if let Some(entry) = inner.entries.remove(&key) {
                    inner.policy.on_remove(&key);
                    inner.stats.record_expiration();
                    removed.push((key, entry.into_value()));
                }
            }
            removed
        };

        for (key, value) in &removed {
            self.notify_removed(key, value);
        }
        removed.len()
    }

    // == Accessors ==
    /// Number of physically live entries; always <= capacity.
    pub fn len(&self) -> usize {
        self.inner.lock().entries.len()
    }

    /// Returns true if the cache holds no entries.
    pub fn is_empty(&self) -> bool {
        self.inner.lock().entries.is_empty()
    }

    /// Configured maximum number of live entries.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let inner = self.inner.lock();
        let mut stats = inner.stats.clone();
        stats.set_total_entries(inner.entries.len());
        stats
    }

    fn notify_removed(&self, key: &K, value: &V) {
        if let Some(listener) = &self.on_evict {
            listener(key, value);
        }
    }
}

impl<K, V> fmt::Debug for MemoizingCache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoizingCache")
            .field("capacity", &self.capacity)
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

// == Flight Guard ==
/// Deregisters a led flight if its future is dropped before completion.
struct FlightGuard<'a, K, V>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    cache: &'a MemoizingCache<K, V>,
    key: Option<K>,
    id: u64,
}

impl<K, V> Drop for FlightGuard<'_, K, V>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        if let Some(key) = self.key.take() {
            let mut inner = self.cache.inner.lock();
            if inner.pending.get(&key).is_some_and(|f| f.id == self.id) {
                inner.pending.remove(&key);
                debug!(?key, "in-flight computation cancelled");
            }
        }
    }
}

// == Cache Builder ==
/// Construction-time configuration for [`MemoizingCache`].
///
/// Capacity is fixed for the cache's lifetime. The default policy is LRU;
/// [`lfu`](Self::lfu) or [`policy`](Self::policy) replace it. A zero TTL is
/// rejected at build time.
pub struct CacheBuilder<K, V> {
    capacity: usize,
    policy: Box<dyn EvictionPolicy<K>>,
    ttl: Option<Duration>,
    on_evict: Option<EvictListener<K, V>>,
}

impl<K, V> CacheBuilder<K, V>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn new(capacity: usize) -> Self {
        Self {
            capacity,
            policy: Box::new(LruPolicy::new()),
            ttl: None,
            on_evict: None,
        }
    }

    /// Sets a time-to-live after which entries count as absent.
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Switches victim selection to least-frequently-used.
    pub fn lfu(mut self) -> Self {
        self.policy = Box::new(LfuPolicy::new());
        self
    }

    /// Installs a custom eviction policy.
    pub fn policy(mut self, policy: impl EvictionPolicy<K> + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    /// Registers a callback invoked with each evicted or expired pair.
    pub fn on_evict(mut self, listener: impl Fn(&K, &V) + Send + Sync + 'static) -> Self {
        self.on_evict = Some(Arc::new(listener));
        self
    }

    /// Validates the configuration and builds the cache.
    pub fn build(self) -> Result<MemoizingCache<K, V>> {
        if self.ttl.is_some_and(|ttl| ttl.is_zero()) {
            return Err(CacheError::InvalidConfiguration(
                "ttl must be greater than zero".to_string(),
            ));
        }

        Ok(MemoizingCache {
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                policy: self.policy,
                pending: HashMap::new(),
                stats: CacheStats::new(),
            }),
            capacity: self.capacity,
            ttl: self.ttl,
            on_evict: self.on_evict,
            flight_seq: AtomicU64::new(0),
        })
    }
}
