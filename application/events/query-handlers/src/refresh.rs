use std::sync::Arc;

use events_cache_keys::NativeCacheKey;
use events_errors::EventResult;
use flume::{Receiver, Sender, TrySendError};
use redis_connection::CacheError;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::instrument;

use crate::{bucket_cache::BucketCache, service::EventQueryService};

/// Request to recompute one cached page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshJob {
    pub key: NativeCacheKey,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("Refresh queue is full")]
    Full,
    #[error("Refresh queue is closed")]
    Closed,
}

/// One-way hand-off of refresh work. Never waits for the work itself.
pub trait RefreshDispatcher: Send + Sync {
    fn dispatch(&self, job: RefreshJob) -> Result<(), DispatchError>;
}

#[derive(Clone)]
pub struct QueueDispatcher {
    sender: Sender<RefreshJob>,
}

impl QueueDispatcher {
    pub fn bounded(capacity: usize) -> (Self, Receiver<RefreshJob>) {
        let (sender, receiver) = flume::bounded(capacity);
        (Self { sender }, receiver)
    }
}

impl RefreshDispatcher for QueueDispatcher {
    fn dispatch(&self, job: RefreshJob) -> Result<(), DispatchError> {
        self.sender.try_send(job).map_err(|e| match e {
            TrySendError::Full(_) => DispatchError::Full,
            TrySendError::Disconnected(_) => DispatchError::Closed,
        })
    }
}

/// Write side of the page cache: recomputes a page and stores it.
#[derive(Clone)]
pub struct PageRefresher {
    service: Arc<EventQueryService>,
    cache: Arc<BucketCache>,
}

impl PageRefresher {
    pub fn new(service: Arc<EventQueryService>, cache: Arc<BucketCache>) -> Self {
        Self { service, cache }
    }

    /// Recomputes and stores the page. A failure releases the key so a
    /// later read can dispatch it again.
    #[instrument(skip(self, job), fields(key = %job.key))]
    pub async fn refresh(&self, job: &RefreshJob) -> EventResult<()> {
        let result = self.recompute(job).await;
        if result.is_err() {
            self.cache.release(&job.key).await;
        }
        result
    }

    async fn recompute(&self, job: &RefreshJob) -> EventResult<()> {
        let page = self.service.paginated_page(&job.key).await?;
        let payload = serde_json::to_value(&page).map_err(CacheError::from)?;
        self.cache.write(&job.key, payload).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use events_cache_keys::CachedPage;
    use events_filters::EventFilterParams;
    use events_queries::PageRequest;

    use super::*;

    fn job() -> RefreshJob {
        RefreshJob {
            key: CachedPage::WhenTab
                .key(&EventFilterParams::default(), PageRequest::new(None, None, 3)),
        }
    }

    #[test]
    fn test_bounded_queue_reports_full_and_closed() {
        let (dispatcher, receiver) = QueueDispatcher::bounded(1);
        assert_eq!(dispatcher.dispatch(job()), Ok(()));
        assert_eq!(dispatcher.dispatch(job()), Err(DispatchError::Full));

        assert_eq!(receiver.try_recv().ok(), Some(job()));
        drop(receiver);
        assert_eq!(dispatcher.dispatch(job()), Err(DispatchError::Closed));
    }
}
