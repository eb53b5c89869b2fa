//! Repository trait for per-slug view counts.

use crate::domain::entities::{Slug, ViewCount};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

/// Errors raised by a view count store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The command was never sent, e.g. the connection was refused.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// The connection failed, possibly after the command was sent.
    #[error("store connection error: {0}")]
    Connection(String),

    #[error("store operation error: {0}")]
    Operation(String),

    #[error("store call timed out after {0:?}")]
    Timeout(Duration),
}

impl StoreError {
    /// Returns `true` when the failed call is known to have had no effect.
    ///
    /// Increments are not idempotent: a timeout or a connection dropped
    /// mid-request may still have been applied, so only [`StoreError::Unavailable`]
    /// is safe to retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Key-value store holding one string-encoded count per slug.
///
/// The store is the single source of truth. There is no client-side cache, and
/// a key that does not exist reads as [`ViewCount::ZERO`]. Stored values that do
/// not parse as integers also read as zero (see [`ViewCount::parse_stored`]).
///
/// # Implementations
///
/// - [`crate::infrastructure::store::RedisViewRepository`] - Redis, atomic increment via Lua
/// - [`crate::infrastructure::store::InMemoryViewRepository`] - process-local map
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ViewRepository: Send + Sync {
    /// Reads the current count for a slug.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be reached.
    async fn get_count(&self, slug: &Slug) -> StoreResult<ViewCount>;

    /// Adds one view and returns the count after the increment.
    ///
    /// Creates the key on first use. Implementations perform the read, the
    /// increment and the write as one atomic step, so concurrent increments of
    /// the same slug are never lost.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the store cannot be reached.
    async fn increment(&self, slug: &Slug) -> StoreResult<ViewCount>;

    /// Overwrites the count for a slug.
    ///
    /// Used by the admin tool only; the HTTP service never sets counts directly.
    async fn set_count(&self, slug: &Slug, count: ViewCount) -> StoreResult<()>;

    /// Removes the stored count. Returns `true` if a value existed.
    async fn delete(&self, slug: &Slug) -> StoreResult<bool>;

    /// Lists every stored count, sorted by slug.
    async fn list(&self) -> StoreResult<Vec<(String, ViewCount)>>;

    /// Checks if the store backend is reachable.
    async fn health_check(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_unsent_calls_are_retryable() {
        assert!(StoreError::Unavailable("connection refused".to_string()).is_retryable());
        assert!(!StoreError::Connection("reset by peer".to_string()).is_retryable());
        assert!(!StoreError::Operation("READONLY".to_string()).is_retryable());
        assert!(!StoreError::Timeout(Duration::from_secs(2)).is_retryable());
    }
}
