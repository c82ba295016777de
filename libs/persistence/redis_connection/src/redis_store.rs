use async_trait::async_trait;
use deadpool_redis::{Pool, redis::AsyncCommands};

use crate::store::{CacheEntry, CacheResult, NativeCacheStore};

const KEY_PREFIX: &str = "native_cache:";

/// Native cache entries kept as JSON strings in Redis.
#[derive(Clone)]
pub struct RedisStore {
    pool: Pool,
}

impl RedisStore {
    pub fn new(pool: Pool) -> Self { Self { pool } }

    fn key(key: &str) -> String { format!("{KEY_PREFIX}{key}") }
}

#[async_trait]
impl NativeCacheStore for RedisStore {
    async fn get(&self, key: &str) -> CacheResult<Option<CacheEntry>> {
        let mut conn = self.pool.get().await?;
        let raw: Option<String> = conn.get(Self::key(key)).await?;
        match raw {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, entry: CacheEntry) -> CacheResult<()> {
        let json = serde_json::to_string(&entry)?;
        let mut conn = self.pool.get().await?;
        let _: () = conn.set(Self::key(key), json).await?;
        Ok(())
    }
}
