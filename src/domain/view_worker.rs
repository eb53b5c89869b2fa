//! Background worker that turns page view events into store increments.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio::task::JoinSet;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{debug, info, warn};

use crate::application::services::ViewService;
use crate::domain::repositories::StoreError;
use crate::domain::view_event::ViewEvent;

/// Tuning for [`run_view_worker`].
#[derive(Debug, Clone, Copy)]
pub struct ViewWorkerConfig {
    /// Maximum number of increments in flight at once.
    pub concurrency: usize,
    /// Attempts per event, including the first one.
    pub retry_attempts: usize,
    /// Base delay of the exponential backoff between attempts.
    pub retry_base_delay: Duration,
}

impl Default for ViewWorkerConfig {
    fn default() -> Self {
        Self {
            concurrency: 4,
            retry_attempts: 3,
            retry_base_delay: Duration::from_millis(50),
        }
    }
}

/// Consumes view events until every sender is dropped.
///
/// Each event becomes one increment. Only failures where the increment never
/// reached the store are retried, with jittered exponential backoff: a timed out
/// or interrupted increment may already be applied. Failures are logged and counted, never reported back: by the time an event is
/// processed its page response has already been sent.
///
/// On shutdown the remaining queue is drained and in-flight increments are
/// awaited before the function returns.
pub async fn run_view_worker(
    mut rx: mpsc::Receiver<ViewEvent>,
    service: Arc<ViewService>,
    config: ViewWorkerConfig,
) {
    let permits = Arc::new(Semaphore::new(config.concurrency.max(1)));
    let mut tasks = JoinSet::new();

    while let Some(event) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };

        let service = service.clone();
        tasks.spawn(async move {
            process_event(&service, event, config).await;
            drop(permit);
        });

        while tasks.try_join_next().is_some() {}
    }

    while tasks.join_next().await.is_some() {}
    info!("View worker stopped");
}

async fn process_event(service: &ViewService, event: ViewEvent, config: ViewWorkerConfig) {
    let strategy = ExponentialBackoff::from_millis(config.retry_base_delay.as_millis().max(1) as u64)
        .max_delay(Duration::from_secs(2))
        .map(jitter)
        .take(config.retry_attempts.saturating_sub(1));

    let delay_ms = event.queue_delay_ms();

    let result = RetryIf::spawn(
        strategy,
        || service.record_view(&event.slug),
        |e: &StoreError| e.is_retryable(),
    )
    .await;

    match result {
        Ok(count) => {
            metrics::counter!("view_events_processed_total").increment(1);
            debug!(
                slug = %event.slug,
                count = count.value(),
                queue_delay_ms = delay_ms,
                "Page view counted"
            );
        }
        Err(e) => {
            metrics::counter!("view_events_failed_total").increment(1);
            warn!(slug = %event.slug, error = %e, "Failed to count page view");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Slug, ViewCount};
    use crate::domain::repositories::{MockViewRepository, StoreResult, ViewRepository};
    use crate::infrastructure::store::InMemoryViewRepository;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn event(slug: &str) -> ViewEvent {
        ViewEvent::new(Slug::parse(slug).unwrap())
    }

    fn fast_config(retry_attempts: usize) -> ViewWorkerConfig {
        ViewWorkerConfig {
            concurrency: 2,
            retry_attempts,
            retry_base_delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn test_worker_increments_each_event() {
        let mut mock_repo = MockViewRepository::new();
        mock_repo
            .expect_increment()
            .times(3)
            .returning(|_| Ok(ViewCount::new(1)));

        let service = Arc::new(ViewService::new(
            Arc::new(mock_repo),
            Duration::from_secs(1),
        ));
        let (tx, rx) = mpsc::channel(16);

        for slug in ["a", "b", "c"] {
            tx.send(event(slug)).await.unwrap();
        }
        drop(tx);

        run_view_worker(rx, service, fast_config(1)).await;
    }

    #[tokio::test]
    async fn test_worker_retries_failed_increment() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let seen = attempts.clone();

        let mut mock_repo = MockViewRepository::new();
        mock_repo.expect_increment().times(3).returning(move |_| {
            if seen.fetch_add(1, Ordering::SeqCst) < 2 {
                Err(StoreError::Unavailable("connection refused".to_string()))
            } else {
                Ok(ViewCount::new(1))
            }
        });

        let service = Arc::new(ViewService::new(
            Arc::new(mock_repo),
            Duration::from_secs(1),
        ));
        let (tx, rx) = mpsc::channel(4);
        tx.send(event("flaky")).await.unwrap();
        drop(tx);

        run_view_worker(rx, service, fast_config(3)).await;

        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_worker_gives_up_after_max_attempts() {
        let mut mock_repo = MockViewRepository::new();
        mock_repo
            .expect_increment()
            .times(2)
            .returning(|_| Err(StoreError::Unavailable("down".to_string())));

        let service = Arc::new(ViewService::new(
            Arc::new(mock_repo),
            Duration::from_secs(1),
        ));
        let (tx, rx) = mpsc::channel(4);
        tx.send(event("doomed")).await.unwrap();
        drop(tx);

        // Returns normally: background failures are swallowed.
        run_view_worker(rx, service, fast_config(2)).await;
    }

    #[tokio::test]
    async fn test_worker_does_not_retry_interrupted_increment() {
        let mut mock_repo = MockViewRepository::new();
        mock_repo
            .expect_increment()
            .times(1)
            .returning(|_| Err(StoreError::Connection("reset by peer".to_string())));

        let service = Arc::new(ViewService::new(
            Arc::new(mock_repo),
            Duration::from_secs(1),
        ));
        let (tx, rx) = mpsc::channel(4);
        tx.send(event("interrupted")).await.unwrap();
        drop(tx);

        run_view_worker(rx, service, fast_config(3)).await;
    }

    /// Applies the increment, then answers after the service timeout.
    struct LateAckRepository {
        inner: InMemoryViewRepository,
        delay: Duration,
    }

    #[async_trait::async_trait]
    impl ViewRepository for LateAckRepository {
        async fn get_count(&self, slug: &Slug) -> StoreResult<ViewCount> {
            self.inner.get_count(slug).await
        }
        async fn increment(&self, slug: &Slug) -> StoreResult<ViewCount> {
            let count = self.inner.increment(slug).await?;
            tokio::time::sleep(self.delay).await;
            Ok(count)
        }
        async fn set_count(&self, slug: &Slug, count: ViewCount) -> StoreResult<()> {
            self.inner.set_count(slug, count).await
        }
        async fn delete(&self, slug: &Slug) -> StoreResult<bool> {
            self.inner.delete(slug).await
        }
        async fn list(&self) -> StoreResult<Vec<(String, ViewCount)>> {
            self.inner.list().await
        }
        async fn health_check(&self) -> bool {
            true
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_timed_out_increment_is_counted_once() {
        let repo = Arc::new(LateAckRepository {
            inner: InMemoryViewRepository::new(),
            delay: Duration::from_millis(200),
        });
        let service = Arc::new(ViewService::new(repo.clone(), Duration::from_millis(50)));
        let (tx, rx) = mpsc::channel(4);
        tx.send(event("slow-ack")).await.unwrap();
        drop(tx);

        run_view_worker(rx, service, fast_config(3)).await;

        assert_eq!(repo.inner.get_raw("slow-ack").as_deref(), Some("1"));
    }
}
