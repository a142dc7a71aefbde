//! Cache Module
//!
//! In-process memoization with single-flight computation, bounded capacity,
//! pluggable eviction, and TTL expiry.

mod entry;
mod policy;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use policy::{EvictionPolicy, LfuPolicy, LruPolicy};
pub use stats::CacheStats;
pub use store::{CacheBuilder, EvictListener, MemoizingCache};
