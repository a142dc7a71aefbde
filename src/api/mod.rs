//! API Module
//!
//! HTTP handlers and routing for the demo REST API.
//!
//! # Endpoints
//! - `GET /students` - List all students (uncached)
//! - `GET /students/:id` - Cached student lookup
//! - `DELETE /students/:id` - Invalidate one cached lookup
//! - `DELETE /students` - Clear the student cache
//! - `GET /counter` - Memoized counter value
//! - `DELETE /counter` - Invalidate the memoized counter
//! - `GET /stats` - Cache statistics
//! - `GET /health` - Health check endpoint

pub mod handlers;
pub mod routes;

pub use handlers::AppState;
pub use routes::create_router;
