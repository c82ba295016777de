use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One stored page: the serialized payload and when it was written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheEntry {
    pub payload: serde_json::Value,
    pub written_at: DateTime<Utc>,
}

impl CacheEntry {
    pub fn new(payload: serde_json::Value, written_at: DateTime<Utc>) -> Self {
        Self {
            payload,
            written_at,
        }
    }
}

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("Redis error: {0}")]
    Redis(#[from] deadpool_redis::redis::RedisError),
    #[error("Redis pool error: {0}")]
    Pool(#[from] deadpool_redis::PoolError),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Key/value store behind the native page cache. Writes to one key never
/// touch another; the last `put` for a key wins.
#[async_trait]
pub trait NativeCacheStore: Send + Sync {
    async fn get(&self, key: &str) -> CacheResult<Option<CacheEntry>>;

    async fn put(&self, key: &str, entry: CacheEntry) -> CacheResult<()>;
}

#[async_trait]
impl<T> NativeCacheStore for Arc<T>
where
    T: NativeCacheStore + ?Sized,
{
    async fn get(&self, key: &str) -> CacheResult<Option<CacheEntry>> {
        (**self).get(key).await
    }

    async fn put(&self, key: &str, entry: CacheEntry) -> CacheResult<()> {
        (**self).put(key, entry).await
    }
}
