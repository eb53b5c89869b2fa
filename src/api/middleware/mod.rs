//! HTTP middleware for request processing.
//!
//! Provides page view counting and observability middleware.

pub mod page_views;
pub mod tracing;
