//! Counts article page views as a side effect of serving them.

use axum::{
    extract::{Request, State},
    http::{Method, header},
    middleware::Next,
    response::Response,
};
use tokio::sync::mpsc::error::TrySendError;
use tracing::{debug, warn};

use crate::domain::entities::Slug;
use crate::domain::view_event::ViewEvent;
use crate::state::AppState;

/// Wraps the static asset service and enqueues a view for served article pages.
///
/// # Counting Rules
///
/// A view is recorded when all of these hold:
/// - the request is a `GET`
/// - the path is below the configured article prefix and yields a slug
///   (see [`Slug::from_article_path`])
/// - the asset server answered with a 2xx HTML response
///
/// Page views count under the article's own segment only, while the counter
/// API takes the whole remaining path. A page at `/blog/2024/post/` is counted
/// as `post`, so it reads its count from `/api/views/post`.
///
/// # Non-blocking
///
/// The event goes to the background worker with `try_send`. If the queue is
/// full or closed the view is dropped and logged; the page response is passed
/// through untouched either way.
///
/// # Example
///
/// ```rust,ignore
/// let assets = ServiceBuilder::new()
///     .layer(middleware::from_fn_with_state(state.clone(), page_views::layer))
///     .service(ServeDir::new("dist"));
/// ```
pub async fn layer(State(st): State<AppState>, req: Request, next: Next) -> Response {
    let slug = if req.method() == Method::GET {
        Slug::from_article_path(req.uri().path(), &st.article_prefix)
    } else {
        None
    };

    let response = next.run(req).await;

    if let Some(slug) = slug
        && is_html_page(&response)
    {
        enqueue_view(&st, slug);
    }

    response
}

fn is_html_page(response: &Response) -> bool {
    response.status().is_success()
        && response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.starts_with("text/html"))
}

fn enqueue_view(st: &AppState, slug: Slug) {
    match st.view_sender.try_send(ViewEvent::new(slug)) {
        Ok(()) => debug!("Page view queued"),
        Err(TrySendError::Full(event)) => {
            metrics::counter!("view_events_dropped_total").increment(1);
            warn!(slug = %event.slug, "View queue full, dropping page view");
        }
        Err(TrySendError::Closed(event)) => {
            metrics::counter!("view_events_dropped_total").increment(1);
            warn!(slug = %event.slug, "View queue closed, dropping page view");
        }
    }
}
