#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use view_counter::application::services::ViewService;
use view_counter::domain::entities::{Slug, ViewCount};
use view_counter::domain::origin_policy::OriginAllowList;
use view_counter::domain::repositories::{StoreError, StoreResult, ViewRepository};
use view_counter::domain::view_event::ViewEvent;
use view_counter::infrastructure::store::InMemoryViewRepository;
use view_counter::state::AppState;

pub const TRUSTED_ORIGIN: &str = "https://blog.nahian.xyz";

/// State backed by an in-memory store, with the queue receiver handed back
/// instead of a running worker.
pub fn create_test_state() -> (
    AppState,
    mpsc::Receiver<ViewEvent>,
    Arc<InMemoryViewRepository>,
) {
    create_test_state_with_capacity(100)
}

pub fn create_test_state_with_capacity(
    capacity: usize,
) -> (
    AppState,
    mpsc::Receiver<ViewEvent>,
    Arc<InMemoryViewRepository>,
) {
    let store = Arc::new(InMemoryViewRepository::new());
    let (state, rx) = create_test_state_with_repository(
        store.clone(),
        Duration::from_secs(1),
        capacity,
    );

    (state, rx, store)
}

pub fn create_test_state_with_repository(
    repository: Arc<dyn ViewRepository>,
    store_timeout: Duration,
    capacity: usize,
) -> (AppState, mpsc::Receiver<ViewEvent>) {
    let view_service = Arc::new(ViewService::new(repository, store_timeout));
    let (tx, rx) = mpsc::channel(capacity);

    let state = AppState::new(
        view_service,
        tx,
        OriginAllowList::new([TRUSTED_ORIGIN, "http://localhost:4321"]),
        "/blog/",
    );

    (state, rx)
}

/// A store that rejects every call.
pub struct FailingRepository;

#[async_trait]
impl ViewRepository for FailingRepository {
    async fn get_count(&self, _slug: &Slug) -> StoreResult<ViewCount> {
        Err(StoreError::Operation("READONLY replica".to_string()))
    }
    async fn increment(&self, _slug: &Slug) -> StoreResult<ViewCount> {
        Err(StoreError::Unavailable("connection refused".to_string()))
    }
    async fn set_count(&self, _slug: &Slug, _count: ViewCount) -> StoreResult<()> {
        Err(StoreError::Operation("READONLY replica".to_string()))
    }
    async fn delete(&self, _slug: &Slug) -> StoreResult<bool> {
        Err(StoreError::Operation("READONLY replica".to_string()))
    }
    async fn list(&self) -> StoreResult<Vec<(String, ViewCount)>> {
        Err(StoreError::Operation("READONLY replica".to_string()))
    }
    async fn health_check(&self) -> bool {
        false
    }
}

/// A store that never answers.
pub struct StalledRepository;

#[async_trait]
impl ViewRepository for StalledRepository {
    async fn get_count(&self, _slug: &Slug) -> StoreResult<ViewCount> {
        std::future::pending().await
    }
    async fn increment(&self, _slug: &Slug) -> StoreResult<ViewCount> {
        std::future::pending().await
    }
    async fn set_count(&self, _slug: &Slug, _count: ViewCount) -> StoreResult<()> {
        std::future::pending().await
    }
    async fn delete(&self, _slug: &Slug) -> StoreResult<bool> {
        std::future::pending().await
    }
    async fn list(&self) -> StoreResult<Vec<(String, ViewCount)>> {
        std::future::pending().await
    }
    async fn health_check(&self) -> bool {
        std::future::pending().await
    }
}

/// Writes a minimal built site: a home page, one article and a stylesheet.
pub fn write_test_site(root: &Path) {
    std::fs::create_dir_all(root.join("blog/my-first-post")).unwrap();
    std::fs::write(root.join("index.html"), "<h1>Home</h1>").unwrap();
    std::fs::write(
        root.join("blog/my-first-post/index.html"),
        "<article>First post</article>",
    )
    .unwrap();
    std::fs::create_dir_all(root.join("blog/my-first-post/images")).unwrap();
    std::fs::write(root.join("blog/my-first-post/images/cover.svg"), "<svg/>").unwrap();
    std::fs::write(root.join("style.css"), "body { margin: 0 }").unwrap();
}
