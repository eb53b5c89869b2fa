//! Domain layer containing the view counter's entities and rules.
//!
//! # Architecture
//!
//! - [`entities`] - Slug and view count value types
//! - [`repositories`] - Store trait definitions
//! - [`origin_policy`] - Allow-list guarding the explicit increment endpoint
//! - [`view_event`] - Page view event model
//! - [`view_worker`] - Asynchronous page view counting worker
//!
//! # Page View Flow
//!
//! 1. An article page is served by the asset fallback
//! 2. A [`view_event::ViewEvent`] is sent to a bounded channel
//! 3. [`view_worker::run_view_worker`] increments the count with retry logic
//! 4. The count is persisted via [`repositories::ViewRepository`]

pub mod entities;
pub mod origin_policy;
pub mod repositories;
pub mod view_event;
pub mod view_worker;
