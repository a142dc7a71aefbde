//! Memoflight - a single-flight memoizing cache
//!
//! Serves a small student-directory demo that shows the cache absorbing
//! repeated lookups: each distinct key hits the backing directory once.

mod api;
mod cache;
mod config;
mod error;
mod models;
mod repo;
mod tasks;

use std::net::SocketAddr;

use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::{create_router, AppState};
use config::Config;
use tasks::spawn_cleanup_task;

/// Main entry point for the memoizing cache demo server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the memoizing caches with configured parameters
/// 4. Start background TTL cleanup task
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing subscriber with env filter
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "memoflight=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Memoflight demo server");

    // Load configuration from environment variables
    let config = Config::from_env();
    info!(
        "Configuration loaded: capacity={}, ttl={}s, eviction={:?}, port={}, cleanup_interval={}s",
        config.capacity, config.ttl_secs, config.eviction, config.server_port,
        config.cleanup_interval
    );

    // Create application state with the memoizing caches
    let state = AppState::from_config(&config)?;
    info!("Caches initialized");

    // Start a background cleanup task per cache
    let cleanup_handles = vec![
        spawn_cleanup_task(state.students.clone(), config.cleanup_interval),
        spawn_cleanup_task(state.counter_cache.clone(), config.cleanup_interval),
    ];
    info!("Background cleanup tasks started");

    // Create router with all endpoints
    let app = create_router(state);

    // Bind to configured port
    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Server listening on http://{}", addr);

    // Start server with graceful shutdown
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handles))
        .await?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the cleanup tasks and allows graceful shutdown.
async fn shutdown_signal(cleanup_handles: Vec<tokio::task::JoinHandle<()>>) {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    // Abort the cleanup tasks
    for handle in cleanup_handles {
        handle.abort();
    }
    warn!("Cleanup tasks aborted");
}
