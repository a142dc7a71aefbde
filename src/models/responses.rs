//! Response DTOs for the demo API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for the counter endpoint (GET /counter)
///
/// The value only advances when the compute function actually runs, so
/// repeated requests return the same number until the key is invalidated
/// or expires.
#[derive(Debug, Clone, Serialize)]
pub struct CounterResponse {
    /// Memoized counter value
    pub value: u64,
}

impl CounterResponse {
    /// Creates a new CounterResponse
    pub fn new(value: u64) -> Self {
        Self { value }
    }
}

/// Response body for invalidation endpoints (DELETE /students/:id, /counter)
#[derive(Debug, Clone, Serialize)]
pub struct InvalidateResponse {
    /// Human-readable outcome
    pub message: String,
    /// Whether a stored entry was actually removed
    pub invalidated: bool,
}

impl InvalidateResponse {
    /// Creates a new InvalidateResponse for a key
    pub fn new(key: impl std::fmt::Display, invalidated: bool) -> Self {
        let message = if invalidated {
            format!("Entry '{}' invalidated", key)
        } else {
            format!("Entry '{}' was not cached", key)
        };
        Self {
            message,
            invalidated,
        }
    }
}

/// Response body for clearing a whole cache (DELETE /students)
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    /// Human-readable outcome
    pub message: String,
}

impl ClearResponse {
    /// Creates a new ClearResponse
    pub fn new(cache_name: &str) -> Self {
        Self {
            message: format!("Cache '{}' cleared", cache_name),
        }
    }
}

/// Response body for the stats endpoint (GET /stats)
#[derive(Debug, Clone, Serialize)]
pub struct StatsResponse {
    /// Counters for the student lookup cache
    pub students: CacheStats,
    /// Counters for the counter cache
    pub counter: CacheStats,
    /// How many times the student directory was actually consulted
    pub directory_fetches: u64,
}

impl StatsResponse {
    /// Creates a new StatsResponse from per-cache snapshots
    pub fn new(students: CacheStats, counter: CacheStats, directory_fetches: u64) -> Self {
        Self {
            students,
            counter,
            directory_fetches,
        }
    }
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_response_serialize() {
        let resp = CounterResponse::new(3);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"value\":3"));
    }

    #[test]
    fn test_invalidate_response_messages() {
        let hit = InvalidateResponse::new(7, true);
        assert!(hit.invalidated);
        assert!(hit.message.contains("invalidated"));

        let miss = InvalidateResponse::new(7, false);
        assert!(!miss.invalidated);
        assert!(miss.message.contains("not cached"));
    }

    #[test]
    fn test_stats_response_serialize() {
        let resp = StatsResponse::new(CacheStats::new(), CacheStats::new(), 4);
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("students"));
        assert!(json.contains("counter"));
        assert!(json.contains("directory_fetches"));
    }

    #[test]
    fn test_health_response_serialize() {
        let resp = HealthResponse::healthy();
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("healthy"));
        assert!(json.contains("timestamp"));
    }
}
