//! Shared application state injected into handlers and middleware.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::application::services::ViewService;
use crate::domain::origin_policy::OriginAllowList;
use crate::domain::view_event::ViewEvent;

/// Process-wide state built once at startup.
///
/// Cloned per request; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub view_service: Arc<ViewService>,
    pub view_sender: mpsc::Sender<ViewEvent>,
    pub allowed_origins: Arc<OriginAllowList>,
    /// Path prefix of article pages whose views are counted (e.g. `/blog/`).
    pub article_prefix: Arc<str>,
}

impl AppState {
    pub fn new(
        view_service: Arc<ViewService>,
        view_sender: mpsc::Sender<ViewEvent>,
        allowed_origins: OriginAllowList,
        article_prefix: impl Into<Arc<str>>,
    ) -> Self {
        Self {
            view_service,
            view_sender,
            allowed_origins: Arc::new(allowed_origins),
            article_prefix: article_prefix.into(),
        }
    }
}
