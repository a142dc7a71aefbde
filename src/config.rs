//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::{CacheBuilder, MemoizingCache};

// == Eviction Kind ==
/// Which victim-selection strategy the demo caches use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EvictionKind {
    /// Least recently used (default)
    #[default]
    Lru,
    /// Least frequently used
    Lfu,
}

impl FromStr for EvictionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "lru" => Ok(EvictionKind::Lru),
            "lfu" => Ok(EvictionKind::Lfu),
            other => Err(format!("unknown eviction policy '{}'", other)),
        }
    }
}

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries each cache can hold
    pub capacity: usize,
    /// TTL in seconds for cached entries; 0 disables expiry
    pub ttl_secs: u64,
    /// Victim-selection strategy
    pub eviction: EvictionKind,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_CAPACITY` - Maximum cache entries (default: 1000)
    /// - `CACHE_TTL` - Entry TTL in seconds, 0 = no expiry (default: 300)
    /// - `EVICTION_POLICY` - "lru" or "lfu" (default: lru)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds (default: 1)
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a Config from an arbitrary variable lookup.
    ///
    /// Tests supply a closure instead of mutating process-global env vars.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            capacity: lookup("CACHE_CAPACITY")
                .and_then(|v| v.parse().ok())
                .unwrap_or(1000),
            ttl_secs: lookup("CACHE_TTL")
                .and_then(|v| v.parse().ok())
                .unwrap_or(300),
            eviction: lookup("EVICTION_POLICY")
                .and_then(|v| v.parse().ok())
                .unwrap_or_default(),
            server_port: lookup("SERVER_PORT")
                .and_then(|v| v.parse().ok())
                .unwrap_or(3000),
            cleanup_interval: lookup("CLEANUP_INTERVAL")
                .and_then(|v| v.parse().ok())
                .unwrap_or(1),
        }
    }

    /// Starts a cache builder reflecting this configuration.
    pub fn cache_builder<K, V>(&self) -> CacheBuilder<K, V>
    where
        K: Eq + Hash + Clone + fmt::Debug + Send + Sync + 'static,
        V: Clone + Send + Sync + 'static,
    {
        let mut builder = MemoizingCache::builder(self.capacity);
        if self.ttl_secs > 0 {
            builder = builder.ttl(Duration::from_secs(self.ttl_secs));
        }
        if self.eviction == EvictionKind::Lfu {
            builder = builder.lfu();
        }
        builder
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: 1000,
            ttl_secs: 300,
            eviction: EvictionKind::Lru,
            server_port: 3000,
            cleanup_interval: 1,
        }
    }
}
