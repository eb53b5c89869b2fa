//! HTTP request handlers for API endpoints.

pub mod health;
pub mod views;

pub use health::health_handler;
pub use views::{
    get_views_handler, method_not_allowed_handler, missing_slug_handler, record_view_handler,
};
