use async_trait::async_trait;
use bytes::Bytes;
use moka::future::Cache;
use tracing::debug;

use crate::{
    config::MemoryConfig,
    store::{CacheEntry, CacheResult, NativeCacheStore},
};

#[derive(Clone)]
pub struct MemoryStore {
    memory: Cache<String, Bytes>,
}

impl MemoryStore {
    pub fn new(config: &MemoryConfig) -> Self {
        let mut builder = Cache::builder().max_capacity(config.capacity);
        if let Some(ttl) = config.ttl() {
            builder = builder.time_to_live(ttl);
        }
        Self {
            memory: builder.build(),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self { Self::new(&MemoryConfig::default()) }
}

#[async_trait]
impl NativeCacheStore for MemoryStore {
    async fn get(&self, key: &str) -> CacheResult<Option<CacheEntry>> {
        let Some(bytes) = self.memory.get(key).await
        else {
            return Ok(None);
        };
        Ok(Some(serde_json::from_slice(&bytes)?))
    }

    async fn put(&self, key: &str, entry: CacheEntry) -> CacheResult<()> {
        let bytes = Bytes::from(serde_json::to_vec(&entry)?);
        debug!("Storing {} bytes under {}", bytes.len(), key);
        self.memory.insert(key.to_string(), bytes).await;
        Ok(())
    }
}
