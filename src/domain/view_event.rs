//! Page view event model for background counting.

use chrono::{DateTime, Utc};

use crate::domain::entities::Slug;

/// A page view waiting to be counted.
///
/// Sent from the page-serving middleware to the background worker through a
/// bounded channel, so the store write never sits on the page response path.
///
/// # Usage Flow
///
/// 1. Created by [`crate::api::middleware::page_views`] after an article page is served
/// 2. Sent to the channel with `try_send` (dropped if the queue is full)
/// 3. Processed by [`crate::domain::view_worker::run_view_worker`]
#[derive(Debug, Clone)]
pub struct ViewEvent {
    pub slug: Slug,
    pub received_at: DateTime<Utc>,
}

impl ViewEvent {
    /// Creates an event stamped with the current time.
    pub fn new(slug: Slug) -> Self {
        Self {
            slug,
            received_at: Utc::now(),
        }
    }

    /// Milliseconds the event has waited since it was received.
    pub fn queue_delay_ms(&self) -> i64 {
        (Utc::now() - self.received_at).num_milliseconds().max(0)
    }
}
