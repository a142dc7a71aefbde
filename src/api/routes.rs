//! API Routes
//!
//! Configures the Axum router with all demo endpoints.

use axum::{
    routing::get,
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    clear_students_handler, counter_handler, get_student_handler, health_handler,
    invalidate_student_handler, list_students_handler, reset_counter_handler, stats_handler,
    AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Endpoints
/// - `GET /students` - List all students (uncached)
/// - `GET /students/:id` - Cached student lookup
/// - `DELETE /students/:id` - Invalidate one cached lookup
/// - `DELETE /students` - Clear the student cache
/// - `GET /counter` - Memoized counter value
/// - `DELETE /counter` - Invalidate the memoized counter
/// - `GET /stats` - Cache statistics
/// - `GET /health` - Health check endpoint
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs all requests for debugging
pub fn create_router(state: AppState) -> Router {
    // Configure CORS middleware
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    // Build router with all endpoints
    Router::new()
        .route(
            "/students",
            get(list_students_handler).delete(clear_students_handler),
        )
        .route(
            "/students/:id",
            get(get_student_handler).delete(invalidate_student_handler),
        )
        .route("/counter", get(counter_handler).delete(reset_counter_handler))
        .route("/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MemoizingCache;
    use crate::repo::StudentDirectory;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        let state = AppState::new(
            MemoizingCache::new(100),
            MemoizingCache::new(100),
            StudentDirectory::with_demo_records(),
        );
        create_router(state)
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_student_route_resolves() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/students/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_route_is_404() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/courses/1")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
