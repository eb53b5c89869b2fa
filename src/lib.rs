//! # View Counter
//!
//! Per-article view counts for a static blog, served next to the site's build
//! output by Axum and persisted in Redis.
//!
//! ## Architecture
//!
//! - **Domain Layer** ([`domain`]) - Slugs, counts, store trait, background worker
//! - **Application Layer** ([`application`]) - View counting service
//! - **Infrastructure Layer** ([`infrastructure`]) - Redis and in-memory stores
//! - **API Layer** ([`api`]) - Counter handlers, DTOs, and middleware
//!
//! ## Behaviour
//!
//! - `GET /api/views/{slug}` returns `{"slug", "count"}` without changing it
//! - `POST /api/views/{slug}` counts a view, only from trusted origins
//! - Serving an article page under `ARTICLE_PREFIX` counts a view in the background
//! - Every other request is served from the static site directory unchanged
//!
//! ## Quick Start
//!
//! ```bash
//! export REDIS_URL="redis://localhost:6379"  # Optional, in-memory otherwise
//! export ASSETS_DIR="./dist"
//!
//! cargo run
//! ```
//!
//! ## Configuration
//!
//! Service configuration is loaded from environment variables via [`config::Config`].
//! See [`config`] module for available options.

pub mod api;
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod state;

pub mod config;
pub mod server;

pub mod routes;

pub use error::AppError;
pub use state::AppState;

/// Commonly used types for external consumers.
///
/// Re-exports frequently used types to simplify imports for library users
/// and integration tests.
pub mod prelude {
    pub use crate::application::services::ViewService;
    pub use crate::domain::entities::{Slug, ViewCount};
    pub use crate::domain::origin_policy::OriginAllowList;
    pub use crate::domain::repositories::ViewRepository;
    pub use crate::error::AppError;
    pub use crate::infrastructure::store::{InMemoryViewRepository, RedisViewRepository};
    pub use crate::state::AppState;
}
