//! Memoflight - a single-flight memoizing cache
//!
//! Provides a bounded, key-addressed cache for expensive computations with
//! pluggable eviction, optional TTL expiry, and per-key request coalescing.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod repo;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheBuilder, MemoizingCache};
pub use config::Config;
pub use tasks::spawn_cleanup_task;
