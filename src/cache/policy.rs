//! Eviction Policy Module
//!
//! Pluggable victim-selection strategies for capacity enforcement.
//!
//! A policy only tracks key order/frequency; the store owns the entries and
//! drives the policy through the trait hooks. Invariant: the set of keys a
//! policy tracks always equals the key set of the store's entry map.

use std::collections::{HashMap, VecDeque};
use std::fmt::Debug;
use std::hash::Hash;

// == Eviction Policy Trait ==
/// Victim-selection capability required by the cache.
///
/// `choose_victim` peeks at the current candidate without removing it; the
/// store removes the entry and then reports the removal via `on_remove`.
pub trait EvictionPolicy<K>: Send + Debug {
    /// Called when a key is inserted into the store.
    fn on_insert(&mut self, key: &K);

    /// Called when an existing key is read.
    fn on_access(&mut self, key: &K);

    /// Called when a key is removed (eviction, expiry, or invalidation).
    fn on_remove(&mut self, key: &K);

    /// Returns the key that should be evicted next, if any.
    fn choose_victim(&self) -> Option<K>;

    /// Drops all tracked keys.
    fn clear(&mut self);
}

// == LRU Policy ==
/// Least-recently-used eviction.
///
/// Keys live in a VecDeque where:
/// - Front = Most recently used
/// - Back = Least recently used
///
/// Ties on equal recency resolve to insertion order: of two keys that were
/// never touched again, the earlier-inserted one sits closer to the back.
#[derive(Debug, Default)]
pub struct LruPolicy<K> {
    /// Order of keys by access time
    order: VecDeque<K>,
}

impl<K> LruPolicy<K> {
    /// Creates a new empty LRU policy.
    pub fn new() -> Self {
        Self {
            order: VecDeque::new(),
        }
    }
}

impl<K> LruPolicy<K>
where
    K: Eq + Clone + Send + Debug,
{
    /// Moves a key to the most-recent end, inserting it if untracked.
    fn touch(&mut self, key: &K) {
        self.order.retain(|k| k != key);
        self.order.push_front(key.clone());
    }
}

impl<K> EvictionPolicy<K> for LruPolicy<K>
where
    K: Eq + Clone + Send + Debug,
{
    fn on_insert(&mut self, key: &K) {
        self.touch(key);
    }

    fn on_access(&mut self, key: &K) {
        self.touch(key);
    }

    fn on_remove(&mut self, key: &K) {
        self.order.retain(|k| k != key);
    }

    fn choose_victim(&self) -> Option<K> {
        self.order.back().cloned()
    }

    fn clear(&mut self) {
        self.order.clear();
    }
}

// == LFU Policy ==
/// Least-frequently-used eviction.
///
/// Each key carries an access count; the victim is the key with the lowest
/// count. Ties resolve to insertion order via a parallel queue of keys in
/// the order they were first inserted.
#[derive(Debug, Default)]
pub struct LfuPolicy<K> {
    /// Access counts per key
    counts: HashMap<K, u64>,
    /// Keys in insertion order, used for tie-breaking
    arrival: VecDeque<K>,
}

impl<K> LfuPolicy<K> {
    /// Creates a new empty LFU policy.
    pub fn new() -> Self {
        Self {
            counts: HashMap::new(),
            arrival: VecDeque::new(),
        }
    }
}

impl<K> EvictionPolicy<K> for LfuPolicy<K>
where
    K: Eq + Hash + Clone + Send + Debug,
{
    fn on_insert(&mut self, key: &K) {
        // A fresh insert resets the count; re-insertion after removal starts over
        if self.counts.insert(key.clone(), 1).is_none() {
            self.arrival.push_back(key.clone());
        }
    }

    fn on_access(&mut self, key: &K) {
        if let Some(count) = self.counts.get_mut(key) {
            *count += 1;
        }
    }

    fn on_remove(&mut self, key: &K) {
        self.counts.remove(key);
        self.arrival.retain(|k| k != key);
    }

    fn choose_victim(&self) -> Option<K> {
        // Scan in arrival order so the earliest-inserted key wins ties
        let mut victim: Option<(&K, u64)> = None;
        for key in &self.arrival {
            let count = *self.counts.get(key)?;
            match victim {
                Some((_, best)) if count >= best => {}
                _ => victim = Some((key, count)),
            }
        }
        victim.map(|(key, _)| key.clone())
    }

    fn clear(&mut self) {
        self.counts.clear();
        self.arrival.clear();
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lru_victim_is_oldest() {
        let mut lru = LruPolicy::new();

        lru.on_insert(&"a");
        lru.on_insert(&"b");
        lru.on_insert(&"c");

        assert_eq!(lru.choose_victim(), Some("a"));
    }

    #[test]
    fn test_lru_access_moves_to_front() {
        let mut lru = LruPolicy::new();

        lru.on_insert(&"a");
        lru.on_insert(&"b");
        lru.on_insert(&"c");

        // Touch 'a' so 'b' becomes the victim
        lru.on_access(&"a");

        assert_eq!(lru.choose_victim(), Some("b"));
    }

    #[test]
    fn test_lru_remove_untracks_key() {
        let mut lru = LruPolicy::new();

        lru.on_insert(&"a");
        lru.on_insert(&"b");
        lru.on_remove(&"a");

        assert_eq!(lru.choose_victim(), Some("b"));
        lru.on_remove(&"b");
        assert_eq!(lru.choose_victim(), None);
    }

    #[test]
    fn test_lru_remove_nonexistent_is_noop() {
        let mut lru = LruPolicy::new();

        lru.on_insert(&"a");
        lru.on_remove(&"ghost");

        assert_eq!(lru.choose_victim(), Some("a"));
    }

    #[test]
    fn test_lru_order_after_interleaved_accesses() {
        let mut lru = LruPolicy::new();

        lru.on_insert(&"a");
        lru.on_insert(&"b");
        lru.on_insert(&"c");

        // Access order a, c, b leaves 'a' as the coldest of the three
        lru.on_access(&"a");
        lru.on_access(&"c");
        lru.on_access(&"b");

        assert_eq!(lru.choose_victim(), Some("a"));
        lru.on_remove(&"a");
        assert_eq!(lru.choose_victim(), Some("c"));
        lru.on_remove(&"c");
        assert_eq!(lru.choose_victim(), Some("b"));
    }

    #[test]
    fn test_lru_clear() {
        let mut lru = LruPolicy::new();

        lru.on_insert(&"a");
        lru.on_insert(&"b");
        lru.clear();

        assert_eq!(lru.choose_victim(), None);
    }

    #[test]
    fn test_lfu_victim_is_least_frequent() {
        let mut lfu = LfuPolicy::new();

        lfu.on_insert(&"a");
        lfu.on_insert(&"b");
        lfu.on_insert(&"c");

        lfu.on_access(&"a");
        lfu.on_access(&"a");
        lfu.on_access(&"c");

        // b was never read after insertion
        assert_eq!(lfu.choose_victim(), Some("b"));
    }

    #[test]
    fn test_lfu_tie_break_is_insertion_order() {
        let mut lfu = LfuPolicy::new();

        lfu.on_insert(&"first");
        lfu.on_insert(&"second");

        // Equal counts: the earlier-inserted key is evicted first
        assert_eq!(lfu.choose_victim(), Some("first"));
    }

    #[test]
    fn test_lfu_reinsert_resets_count() {
        let mut lfu = LfuPolicy::new();

        lfu.on_insert(&"a");
        lfu.on_access(&"a");
        lfu.on_access(&"a");
        lfu.on_insert(&"b");

        lfu.on_remove(&"a");
        lfu.on_insert(&"a");

        // 'a' came back with count 1, but 'b' arrived earlier with count 1
        assert_eq!(lfu.choose_victim(), Some("b"));
    }

    #[test]
    fn test_lfu_remove_and_clear() {
        let mut lfu = LfuPolicy::new();

        lfu.on_insert(&"a");
        lfu.on_insert(&"b");
        lfu.on_remove(&"a");

        assert_eq!(lfu.choose_victim(), Some("b"));

        lfu.clear();
        assert_eq!(lfu.choose_victim(), None);
    }
}
