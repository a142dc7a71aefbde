//! Error types for the memoizing cache
//!
//! Provides unified error handling using thiserror.

use std::sync::Arc;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache and its demo HTTP surface.
///
/// The enum is `Clone` because a single computation outcome is delivered to
/// every concurrent waiter for the same key; the underlying compute error is
/// shared behind an `Arc` for that reason.
#[derive(Error, Debug, Clone)]
pub enum CacheError {
    /// Bad capacity/TTL at construction time
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The user-supplied compute step failed; not cached, not retried
    #[error("Computation failed: {0}")]
    ComputationFailed(Arc<anyhow::Error>),

    /// The caller driving a computation was cancelled before it finished
    #[error("Computation cancelled for key {0}")]
    ComputationCancelled(String),

    /// Requested resource does not exist (HTTP layer, not a cache state)
    #[error("Not found: {0}")]
    NotFound(String),
}

impl CacheError {
    /// Wraps a compute failure so it can be fanned out to all waiters.
    pub fn computation(err: anyhow::Error) -> Self {
        CacheError::ComputationFailed(Arc::new(err))
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidConfiguration(_) => StatusCode::BAD_REQUEST,
            CacheError::ComputationFailed(_) => StatusCode::BAD_GATEWAY,
            CacheError::ComputationCancelled(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string()
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
