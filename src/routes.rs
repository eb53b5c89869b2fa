//! Top-level router combining the counter API and the static asset fallback.
//!
//! # Route Structure
//!
//! - `/api/views/*`  - View counter endpoints (JSON)
//! - `/api/health`   - Health check: store, view queue
//! - everything else - Static site build output, served unchanged
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **Page views** - Counts served article pages in the background

use std::path::Path;

use crate::api;
use crate::api::middleware::{page_views, tracing};
use crate::state::AppState;
use axum::{Router, middleware};
use tower::ServiceBuilder;
use tower_http::services::ServeDir;

/// Constructs the application router with all routes and middleware.
///
/// # Arguments
///
/// - `state` - shared application state injected into all handlers
/// - `assets_dir` - directory holding the built static site; any request not
///   matching a counter route is answered from here
pub fn app_router(state: AppState, assets_dir: impl AsRef<Path>) -> Router {
    let assets = ServiceBuilder::new()
        .layer(middleware::from_fn_with_state(
            state.clone(),
            page_views::layer,
        ))
        .service(ServeDir::new(assets_dir.as_ref()));

    Router::new()
        .merge(api::routes::view_routes())
        .fallback_service(assets)
        .with_state(state)
        .layer(tracing::layer())
}
