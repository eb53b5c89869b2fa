//! Handlers for the view counter endpoints.

use axum::{
    Json,
    extract::{Path, State, rejection::PathRejection},
    http::{HeaderMap, header},
};
use tracing::{debug, warn};

use crate::api::dto::views::ViewCountResponse;
use crate::domain::entities::Slug;
use crate::domain::origin_policy::OriginAllowList;
use crate::error::AppError;
use crate::state::AppState;

/// Returns the current view count for a slug without changing it.
///
/// # Endpoint
///
/// `GET /api/views/{slug}`
///
/// # Response
///
/// ```json
/// { "slug": "my-first-post", "count": 0 }
/// ```
///
/// A slug that was never viewed, or whose stored value is not a number,
/// reports a count of 0.
///
/// # Errors
///
/// Returns 400 Bad Request if the slug is empty.
/// Returns 500 Internal Server Error if the store fails.
pub async fn get_views_handler(
    path: Result<Path<String>, PathRejection>,
    State(state): State<AppState>,
) -> Result<Json<ViewCountResponse>, AppError> {
    let slug = parse_slug(path)?;
    let count = state.view_service.get_count(&slug).await?;

    Ok(Json(ViewCountResponse::new(slug, count)))
}

/// Records one view and returns the updated count.
///
/// # Endpoint
///
/// `POST /api/views/{slug}`
///
/// The increment is awaited before responding, so the returned count includes
/// this view.
///
/// # Origin Check
///
/// Only requests whose `Origin` header equals a trusted origin, or whose
/// `Referer` starts with one, are counted. This keeps other sites from driving
/// counts up; it is not authentication.
///
/// # Errors
///
/// Returns 400 Bad Request if the slug is empty (checked before the origin).
/// Returns 403 Forbidden if neither header matches the allow-list.
/// Returns 500 Internal Server Error if the store fails.
pub async fn record_view_handler(
    path: Result<Path<String>, PathRejection>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<ViewCountResponse>, AppError> {
    let slug = parse_slug(path)?;
    ensure_trusted_origin(&state.allowed_origins, &headers)?;

    let count = state.view_service.record_view(&slug).await?;

    Ok(Json(ViewCountResponse::new(slug, count)))
}

/// Answers counter requests that carry no slug at all.
///
/// # Endpoint
///
/// `GET|POST /api/views` and `/api/views/`
pub async fn missing_slug_handler() -> AppError {
    AppError::missing_slug()
}

/// Answers unsupported methods on counter paths with a JSON body.
pub async fn method_not_allowed_handler() -> AppError {
    AppError::method_not_allowed("Method not allowed")
}

fn parse_slug(path: Result<Path<String>, PathRejection>) -> Result<Slug, AppError> {
    let Path(raw) = path.map_err(|e| {
        debug!("Rejected counter path: {}", e);
        AppError::bad_request("Invalid slug")
    })?;

    Slug::parse(&raw).ok_or_else(AppError::missing_slug)
}

fn ensure_trusted_origin(allow_list: &OriginAllowList, headers: &HeaderMap) -> Result<(), AppError> {
    let origin = headers.get(header::ORIGIN).and_then(|v| v.to_str().ok());
    let referer = headers.get(header::REFERER).and_then(|v| v.to_str().ok());

    if allow_list.is_allowed(origin, referer) {
        Ok(())
    } else {
        warn!(
            origin = origin.unwrap_or("-"),
            referer = referer.unwrap_or("-"),
            "Rejected view increment from untrusted origin"
        );
        Err(AppError::forbidden("Forbidden"))
    }
}
