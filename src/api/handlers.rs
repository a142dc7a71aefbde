//! API Handlers
//!
//! HTTP request handlers for the demo endpoints. Each cached endpoint wraps
//! its data access in an explicit `get_with` call keyed on the request's
//! path parameter.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};

use crate::cache::MemoizingCache;
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::models::{
    ClearResponse, CounterResponse, HealthResponse, InvalidateResponse, StatsResponse, Student,
};
use crate::repo::StudentDirectory;

/// Cache key for the memoized demo counter.
const COUNTER_KEY: &str = "demo-counter";

/// Application state shared across all handlers.
///
/// Lookup results are memoized per cache; the directory and counter are the
/// "slow" collaborators whose work the caches are meant to avoid.
#[derive(Clone)]
pub struct AppState {
    /// Student lookups keyed by id; negative lookups are memoized as None
    pub students: Arc<MemoizingCache<u64, Option<Student>>>,
    /// Single-key cache proving that a memoized value is reused
    pub counter_cache: Arc<MemoizingCache<&'static str, u64>>,
    /// The backing store consulted on a student cache miss
    pub directory: Arc<StudentDirectory>,
    /// Counter advanced only when the counter compute function runs
    pub counter: Arc<AtomicU64>,
}

impl AppState {
    /// Creates a new AppState around the given directory and caches.
    pub fn new(
        students: MemoizingCache<u64, Option<Student>>,
        counter_cache: MemoizingCache<&'static str, u64>,
        directory: StudentDirectory,
    ) -> Self {
        Self {
            students: Arc::new(students),
            counter_cache: Arc::new(counter_cache),
            directory: Arc::new(directory),
            counter: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Creates a new AppState from configuration, seeded with demo records.
    pub fn from_config(config: &Config) -> Result<Self> {
        let students = config.cache_builder().build()?;
        let counter_cache = config.cache_builder().build()?;
        Ok(Self::new(
            students,
            counter_cache,
            StudentDirectory::with_demo_records(),
        ))
    }
}

/// Handler for GET /students
///
/// Lists every student straight from the directory, bypassing the cache.
pub async fn list_students_handler(State(state): State<AppState>) -> Json<Vec<Student>> {
    Json(state.directory.all())
}

/// Handler for GET /students/:id
///
/// Cached lookup: on a miss the compute function consults the directory;
/// concurrent requests for the same id share one lookup. Unknown ids are
/// memoized as absent and answered with 404.
pub async fn get_student_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Result<Json<Student>> {
    let directory = state.directory.clone();
    let student = state
        .students
        .get_with(id, || async move { Ok(directory.find(id).await) })
        .await?;

    match student {
        Some(student) => Ok(Json(student)),
        None => Err(CacheError::NotFound(format!("Student {}", id))),
    }
}

/// Handler for DELETE /students/:id
///
/// Invalidates one cached lookup; the next request re-fetches.
pub async fn invalidate_student_handler(
    State(state): State<AppState>,
    Path(id): Path<u64>,
) -> Json<InvalidateResponse> {
    let invalidated = state.students.invalidate(&id);
    Json(InvalidateResponse::new(id, invalidated))
}

/// Handler for DELETE /students
///
/// Clears the whole student cache.
pub async fn clear_students_handler(State(state): State<AppState>) -> Json<ClearResponse> {
    state.students.clear();
    Json(ClearResponse::new("students"))
}

/// Handler for GET /counter
///
/// Returns the memoized counter: the underlying counter advances only when
/// the compute function actually runs, so repeated requests see the same
/// value until it is invalidated or expires.
pub async fn counter_handler(State(state): State<AppState>) -> Result<Json<CounterResponse>> {
    let counter = state.counter.clone();
    let value = state
        .counter_cache
        .get_with(COUNTER_KEY, || async move {
            Ok(counter.fetch_add(1, Ordering::SeqCst) + 1)
        })
        .await?;

    Ok(Json(CounterResponse::new(value)))
}

/// Handler for DELETE /counter
///
/// Invalidates the memoized counter so the next read increments it.
pub async fn reset_counter_handler(State(state): State<AppState>) -> Json<InvalidateResponse> {
    let invalidated = state.counter_cache.invalidate(&COUNTER_KEY);
    Json(InvalidateResponse::new(COUNTER_KEY, invalidated))
}

/// Handler for GET /stats
///
/// Returns counters for both caches plus the number of actual directory
/// fetches, the cheapest way to see memoization at work.
pub async fn stats_handler(State(state): State<AppState>) -> Json<StatsResponse> {
    Json(StatsResponse::new(
        state.students.stats(),
        state.counter_cache.stats(),
        state.directory.fetch_count(),
    ))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_state() -> AppState {
        AppState::new(
            MemoizingCache::new(100),
            MemoizingCache::new(100),
            StudentDirectory::with_demo_records(),
        )
    }

    #[tokio::test]
    async fn test_get_student_fetches_then_caches() {
        let state = test_state();

        let first = get_student_handler(State(state.clone()), Path(1)).await;
        assert_eq!(first.unwrap().0.name, "Ada Lovelace");

        let second = get_student_handler(State(state.clone()), Path(1)).await;
        assert_eq!(second.unwrap().0.name, "Ada Lovelace");

        // Second request was served from the cache
        assert_eq!(state.directory.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_get_unknown_student_is_not_found() {
        let state = test_state();

        let result = get_student_handler(State(state.clone()), Path(999)).await;
        assert!(matches!(result, Err(CacheError::NotFound(_))));

        // The absence itself is memoized
        let _ = get_student_handler(State(state.clone()), Path(999)).await;
        assert_eq!(state.directory.fetch_count(), 1);
    }

    #[tokio::test]
    async fn test_invalidate_student_forces_refetch() {
        let state = test_state();

        let _ = get_student_handler(State(state.clone()), Path(2)).await;
        let response = invalidate_student_handler(State(state.clone()), Path(2)).await;
        assert!(response.0.invalidated);

        let _ = get_student_handler(State(state.clone()), Path(2)).await;
        assert_eq!(state.directory.fetch_count(), 2);
    }

    #[tokio::test]
    async fn test_counter_is_memoized_until_reset() {
        let state = test_state();

        let first = counter_handler(State(state.clone())).await.unwrap();
        let second = counter_handler(State(state.clone())).await.unwrap();
        assert_eq!(first.0.value, 1);
        assert_eq!(second.0.value, 1);

        let reset = reset_counter_handler(State(state.clone())).await;
        assert!(reset.0.invalidated);

        let third = counter_handler(State(state.clone())).await.unwrap();
        assert_eq!(third.0.value, 2);
    }

    #[tokio::test]
    async fn test_stats_reflect_lookups() {
        let state = test_state();

        let _ = get_student_handler(State(state.clone()), Path(1)).await;
        let _ = get_student_handler(State(state.clone()), Path(1)).await;

        let stats = stats_handler(State(state)).await;
        assert_eq!(stats.0.students.misses, 1);
        assert_eq!(stats.0.students.hits, 1);
        assert_eq!(stats.0.directory_fetches, 1);
    }

    #[tokio::test]
    async fn test_health_handler() {
        let response = health_handler().await;
        assert_eq!(response.0.status, "healthy");
    }
}
