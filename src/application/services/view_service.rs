//! View counting service.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::domain::entities::{Slug, ViewCount};
use crate::domain::repositories::{StoreError, StoreResult, ViewRepository};

/// Reads and increments view counts, bounding every store call by a timeout.
///
/// Shared by the HTTP handlers (foreground reads and increments) and the
/// background worker (page-view increments).
pub struct ViewService {
    repository: Arc<dyn ViewRepository>,
    store_timeout: Duration,
}

impl ViewService {
    /// Creates a new view service.
    pub fn new(repository: Arc<dyn ViewRepository>, store_timeout: Duration) -> Self {
        Self {
            repository,
            store_timeout,
        }
    }

    /// Returns the current count for a slug, zero if it was never viewed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store fails or does not answer in time.
    pub async fn get_count(&self, slug: &Slug) -> StoreResult<ViewCount> {
        self.bounded(self.repository.get_count(slug)).await
    }

    /// Records one view and returns the updated count.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store fails or does not answer in time.
    pub async fn record_view(&self, slug: &Slug) -> StoreResult<ViewCount> {
        let count = self.bounded(self.repository.increment(slug)).await?;
        tracing::debug!(slug = %slug, count = count.value(), "View recorded");
        Ok(count)
    }

    /// Checks if the backing store is reachable.
    pub async fn is_store_healthy(&self) -> bool {
        tokio::time::timeout(self.store_timeout, self.repository.health_check())
            .await
            .unwrap_or(false)
    }

    async fn bounded<T>(&self, call: impl Future<Output = StoreResult<T>>) -> StoreResult<T> {
        tokio::time::timeout(self.store_timeout, call)
            .await
            .map_err(|_| StoreError::Timeout(self.store_timeout))?
    }
}
