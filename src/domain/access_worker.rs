//! Background worker that persists access events.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Semaphore, mpsc};
use tokio_retry::Retry;
use tokio_retry::strategy::ExponentialBackoff;
use tracing::{debug, error, info};

use crate::domain::access_event::AccessEvent;
use crate::domain::entities::NewAccessLog;
use crate::domain::repositories::AccessLogRepository;

const MAX_RETRIES: usize = 3;

/// Consumes access events until the channel closes.
///
/// Up to `concurrency` writes run at once. Each write is retried with
/// exponential backoff; an event that still fails is logged and dropped.
pub async fn run_access_worker(
    mut rx: mpsc::Receiver<AccessEvent>,
    repository: Arc<dyn AccessLogRepository>,
    concurrency: usize,
) {
    let concurrency = concurrency.max(1);
    let permits = Arc::new(Semaphore::new(concurrency));

    while let Some(event) = rx.recv().await {
        let Ok(permit) = permits.clone().acquire_owned().await else {
            break;
        };
        let repository = repository.clone();

        tokio::spawn(async move {
            persist_event(repository.as_ref(), event).await;
            drop(permit);
        });
    }

    // Wait for in-flight writes before reporting shutdown.
    let _ = permits.acquire_many(concurrency as u32).await;
    info!("Access worker stopped: channel closed");
}

/// Writes a single event with retry.
pub async fn persist_event(repository: &dyn AccessLogRepository, event: AccessEvent) {
    let slug = event.slug.clone();
    let entry: NewAccessLog = event.into();

    let strategy = ExponentialBackoff::from_millis(10)
        .max_delay(Duration::from_secs(1))
        .take(MAX_RETRIES);

    let result = Retry::spawn(strategy, || {
        let entry = entry.clone();
        async move { repository.record(entry).await }
    })
    .await;

    match result {
        Ok(()) => debug!(slug, "Access logged"),
        Err(e) => {
            metrics::counter!("access_log_writes_failed_total").increment(1);
            error!(slug, error = %e, "Failed to persist access log");
        }
    }
}
