//! HTTP server initialization and runtime setup.
//!
//! Handles store connection, worker spawning, and Axum server lifecycle.

use crate::application::services::ViewService;
use crate::config::Config;
use crate::domain::origin_policy::OriginAllowList;
use crate::domain::repositories::ViewRepository;
use crate::domain::view_worker::run_view_worker;
use crate::infrastructure::store::{InMemoryViewRepository, RedisViewRepository};
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// How long shutdown waits for queued page views to be written.
const WORKER_DRAIN_TIMEOUT: Duration = Duration::from_secs(10);

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - View store (Redis, or in-memory when Redis is not configured)
/// - Background view worker
/// - Axum HTTP server with graceful shutdown on Ctrl-C / SIGTERM
///
/// After the server stops, queued page views are drained before returning.
///
/// # Errors
///
/// Returns an error if:
/// - Redis is configured but unreachable
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let repository: Arc<dyn ViewRepository> = match &config.redis_url {
        Some(redis_url) => {
            let redis = RedisViewRepository::connect(redis_url, config.key_prefix.clone())
                .await
                .context("Failed to connect to Redis")?;
            tracing::info!("View store enabled (Redis)");
            Arc::new(redis)
        }
        None => {
            tracing::warn!("REDIS_URL not set, keeping view counts in memory");
            Arc::new(InMemoryViewRepository::new())
        }
    };

    let view_service = Arc::new(ViewService::new(repository, config.store_timeout()));

    let (view_tx, view_rx) = mpsc::channel(config.view_queue_capacity);
    let worker = tokio::spawn(run_view_worker(
        view_rx,
        view_service.clone(),
        config.worker_config(),
    ));
    tracing::info!("View worker started");

    let state = AppState::new(
        view_service,
        view_tx,
        OriginAllowList::new(&config.allowed_origins),
        config.article_prefix.as_str(),
    );

    let app = app_router(state, &config.assets_dir);

    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    // The router (and with it the last sender) is gone; the worker drains and exits.
    tracing::info!("Server stopped, draining view queue");
    match tokio::time::timeout(WORKER_DRAIN_TIMEOUT, worker).await {
        Ok(Ok(())) => {}
        Ok(Err(e)) => tracing::error!("View worker panicked: {}", e),
        Err(_) => tracing::warn!("View queue not drained within {:?}", WORKER_DRAIN_TIMEOUT),
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
