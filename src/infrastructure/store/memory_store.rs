//! In-process view count store.

use crate::domain::entities::{Slug, ViewCount};
use crate::domain::repositories::{StoreResult, ViewRepository};
use async_trait::async_trait;
use dashmap::DashMap;
use tracing::debug;

/// A store that keeps counts in memory for the lifetime of the process.
///
/// Values are kept string-encoded, exactly as a remote key-value store would
/// hold them, so malformed values behave the same way.
///
/// # Use Cases
///
/// - Development environments without Redis
/// - Handler and integration tests
pub struct InMemoryViewRepository {
    values: DashMap<String, String>,
}

impl InMemoryViewRepository {
    pub fn new() -> Self {
        debug!("Using in-memory view store (counts are not persisted)");
        Self {
            values: DashMap::new(),
        }
    }

    /// Stores a raw value for a slug, bypassing count encoding.
    pub fn put_raw(&self, slug: &str, value: impl Into<String>) {
        self.values.insert(slug.to_string(), value.into());
    }

    /// Returns the raw stored value for a slug.
    pub fn get_raw(&self, slug: &str) -> Option<String> {
        self.values.get(slug).map(|v| v.value().clone())
    }
}

impl Default for InMemoryViewRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ViewRepository for InMemoryViewRepository {
    async fn get_count(&self, slug: &Slug) -> StoreResult<ViewCount> {
        Ok(self
            .values
            .get(slug.as_str())
            .map(|v| ViewCount::parse_stored(v.value()))
            .unwrap_or_default())
    }

    async fn increment(&self, slug: &Slug) -> StoreResult<ViewCount> {
        // The entry guard holds the shard lock across read and write.
        let mut entry = self
            .values
            .entry(slug.as_str().to_string())
            .or_insert_with(|| ViewCount::ZERO.to_stored());

        let next = ViewCount::parse_stored(entry.value()).next();
        *entry.value_mut() = next.to_stored();

        Ok(next)
    }

    async fn set_count(&self, slug: &Slug, count: ViewCount) -> StoreResult<()> {
        self.values
            .insert(slug.as_str().to_string(), count.to_stored());
        Ok(())
    }

    async fn delete(&self, slug: &Slug) -> StoreResult<bool> {
        Ok(self.values.remove(slug.as_str()).is_some())
    }

    async fn list(&self) -> StoreResult<Vec<(String, ViewCount)>> {
        let mut out: Vec<(String, ViewCount)> = self
            .values
            .iter()
            .map(|e| (e.key().clone(), ViewCount::parse_stored(e.value())))
            .collect();
        out.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(out)
    }

    async fn health_check(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn slug(s: &str) -> Slug {
        Slug::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_unseen_slug_reads_zero() {
        let store = InMemoryViewRepository::new();
        assert_eq!(store.get_count(&slug("never")).await.unwrap(), ViewCount::ZERO);
    }

    #[tokio::test]
    async fn test_increment_creates_and_persists() {
        let store = InMemoryViewRepository::new();

        assert_eq!(store.increment(&slug("post")).await.unwrap().value(), 1);
        assert_eq!(store.increment(&slug("post")).await.unwrap().value(), 2);
        assert_eq!(store.get_raw("post").as_deref(), Some("2"));
    }

    #[tokio::test]
    async fn test_malformed_value_counts_from_zero() {
        let store = InMemoryViewRepository::new();
        store.put_raw("broken", "lots");

        assert_eq!(store.get_count(&slug("broken")).await.unwrap(), ViewCount::ZERO);
        assert_eq!(store.increment(&slug("broken")).await.unwrap().value(), 1);
    }

    #[tokio::test]
    async fn test_set_delete_and_list() {
        let store = InMemoryViewRepository::new();
        store.set_count(&slug("b"), ViewCount::new(5)).await.unwrap();
        store.set_count(&slug("a"), ViewCount::new(3)).await.unwrap();

        let listed = store.list().await.unwrap();
        assert_eq!(
            listed,
            vec![
                ("a".to_string(), ViewCount::new(3)),
                ("b".to_string(), ViewCount::new(5)),
            ]
        );

        assert!(store.delete(&slug("a")).await.unwrap());
        assert!(!store.delete(&slug("a")).await.unwrap());
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments_are_not_lost() {
        let store = Arc::new(InMemoryViewRepository::new());
        let mut handles = Vec::new();

        for _ in 0..64 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store.increment(&Slug::parse("hot").unwrap()).await.unwrap()
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(store.get_count(&slug("hot")).await.unwrap().value(), 64);
    }
}
