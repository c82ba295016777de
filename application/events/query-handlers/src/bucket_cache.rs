use std::{sync::Arc, time::Duration};

use chrono::{DateTime, Utc};
use events_cache_keys::NativeCacheKey;
use events_queries::Clock;
use events_responses::{BucketSection, Page};
use moka::future::Cache;
use redis_connection::{CacheEntry, CacheResult, NativeCacheStore};
use serde_json::Value;
use tracing::{debug, instrument, warn};

use crate::refresh::{RefreshDispatcher, RefreshJob};

/// Decides when a stored page needs recomputing.
pub trait StalenessPolicy: Send + Sync {
    fn is_stale(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool;
}

/// Stale once `ttl` has passed since the last write.
#[derive(Debug, Clone, Copy)]
pub struct TtlPolicy {
    ttl: chrono::Duration,
}

impl TtlPolicy {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl: chrono::Duration::from_std(ttl)
                .unwrap_or(chrono::Duration::MAX),
        }
    }
}

impl StalenessPolicy for TtlPolicy {
    fn is_stale(&self, entry: &CacheEntry, now: DateTime<Utc>) -> bool {
        now - entry.written_at >= self.ttl
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheSource {
    Fresh,
    Stale,
    /// The general page stood in for a missing city page.
    GeneralDefault,
    Empty,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CacheRead {
    pub payload: Value,
    pub is_stale: bool,
    pub source: CacheSource,
}

/// Stale-while-revalidate cache of the paginated tab pages. Reads never
/// compute a page and never fail; recomputation goes through the
/// dispatcher.
pub struct BucketCache {
    store: Arc<dyn NativeCacheStore>,
    dispatcher: Arc<dyn RefreshDispatcher>,
    policy: Arc<dyn StalenessPolicy>,
    clock: Arc<dyn Clock>,
    /// Keys with a refresh dispatched in the current window.
    in_flight: Cache<String, ()>,
}

impl BucketCache {
    pub fn new(
        store: Arc<dyn NativeCacheStore>, dispatcher: Arc<dyn RefreshDispatcher>,
        clock: Arc<dyn Clock>, ttl: Duration,
    ) -> Self {
        Self {
            store,
            dispatcher,
            policy: Arc::new(TtlPolicy::new(ttl)),
            clock,
            in_flight: Cache::builder().time_to_live(ttl).build(),
        }
    }

    pub fn with_policy(mut self, policy: Arc<dyn StalenessPolicy>) -> Self {
        self.policy = policy;
        self
    }

    #[instrument(skip(self, key), fields(key = %key))]
    pub async fn read(&self, key: &NativeCacheKey) -> CacheRead {
        let rendered = key.to_string();

        if let Some(entry) = self.lookup(&rendered).await {
            if !self.policy.is_stale(&entry, self.clock.now()) {
                debug!("Cache hit for {}", rendered);
                return CacheRead {
                    payload: entry.payload,
                    is_stale: false,
                    source: CacheSource::Fresh,
                };
            }
            debug!("Stale cache entry for {}", rendered);
            self.request_refresh(key, &rendered).await;
            return CacheRead {
                payload: entry.payload,
                is_stale: true,
                source: CacheSource::Stale,
            };
        }

        debug!("Cache miss for {}", rendered);
        self.request_refresh(key, &rendered).await;

        if !key.is_general() {
            if let Some(entry) = self.lookup(&key.general().to_string()).await {
                return CacheRead {
                    payload: entry.payload,
                    is_stale: true,
                    source: CacheSource::GeneralDefault,
                };
            }
        }
        CacheRead {
            payload: empty_page(),
            is_stale: true,
            source: CacheSource::Empty,
        }
    }

    /// Stores `payload` as the current page for `key`.
    #[instrument(skip(self, key, payload), fields(key = %key))]
    pub async fn write(&self, key: &NativeCacheKey, payload: Value) -> CacheResult<()> {
        let rendered = key.to_string();
        self.store
            .put(&rendered, CacheEntry::new(payload, self.clock.now()))
            .await?;
        self.in_flight.invalidate(&rendered).await;
        Ok(())
    }

    /// Drops the pending-refresh marker so the next read dispatches again.
    pub async fn release(&self, key: &NativeCacheKey) {
        self.in_flight.invalidate(&key.to_string()).await;
    }

    async fn lookup(&self, rendered: &str) -> Option<CacheEntry> {
        match self.store.get(rendered).await {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Cache read failed for {}: {}", rendered, e);
                None
            }
        }
    }

    async fn request_refresh(&self, key: &NativeCacheKey, rendered: &str) {
        let marker = self.in_flight.entry(rendered.to_string()).or_insert(()).await;
        if !marker.is_fresh() {
            debug!("Refresh already pending for {}", rendered);
            return;
        }
        if let Err(e) = self.dispatcher.dispatch(RefreshJob { key: key.clone() }) {
            warn!("Refresh dispatch failed for {}: {}", rendered, e);
            self.in_flight.invalidate(rendered).await;
        }
    }
}

fn empty_page() -> Value {
    serde_json::to_value(Page::<BucketSection>::empty()).unwrap_or(Value::Null)
}
