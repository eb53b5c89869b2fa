//! Counter API route configuration.

use crate::api::handlers::{
    get_views_handler, health_handler, method_not_allowed_handler, missing_slug_handler,
    record_view_handler,
};
use crate::state::AppState;
use axum::{
    Router,
    http::{HeaderValue, header},
    routing::get,
};
use tower_http::set_header::SetResponseHeaderLayer;

/// Counter routes. Every response, errors included, carries
/// `Cache-Control: no-cache` so counts are never served from a cache.
///
/// # Endpoints
///
/// - `GET  /api/views/{slug}` - Current count (read-only, public)
/// - `POST /api/views/{slug}` - Record a view and return the new count (origin-checked)
/// - `GET|POST /api/views`    - Always `400 Missing slug`
/// - `GET  /api/health`       - Store and view queue status
///
/// The slug route is a catch-all, so slugs may contain `/`.
pub fn view_routes() -> Router<AppState> {
    let no_slug = get(missing_slug_handler)
        .post(missing_slug_handler)
        .fallback(method_not_allowed_handler);

    Router::new()
        .route(
            "/api/views/{*slug}",
            get(get_views_handler)
                .post(record_view_handler)
                .fallback(method_not_allowed_handler),
        )
        .route("/api/views", no_slug.clone())
        .route("/api/views/", no_slug)
        .route("/api/health", get(health_handler))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-cache"),
        ))
}
