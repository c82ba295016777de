use deadpool_redis::{Config, Pool, Runtime};
pub use deadpool_redis::PoolError;
pub use deadpool_redis::redis::RedisError;
use tracing::{info, instrument};
use url::Url;

pub mod config;
pub mod memory;
pub mod redis_store;
pub mod store;

pub use memory::MemoryStore;
pub use redis_store::RedisStore;
pub use store::{CacheEntry, CacheError, CacheResult, NativeCacheStore};

pub fn redis_url<C>(config: &C) -> Result<Url, url::ParseError>
where
    C: config::DbConnectConfig,
{
    let mut url = Url::parse(&format!(
        "redis://{}:{}",
        config.host(),
        config.port()
    ))?;
    url.set_path(&config.db().to_string());
    Ok(url)
}

#[instrument(skip_all, name = "connect-redis")]
pub async fn connect_redis_db<C>(config: &C) -> Result<Pool, anyhow::Error>
where
    C: config::DbConnectConfig,
{
    let url = redis_url(config)?;

    info!(redis.url = %url, redis.connect = true);

    let cfg = Config {
        url: Some(url.to_string()),
        pool: Some(deadpool_redis::PoolConfig::default()),
        connection: None,
    };

    let pool = cfg.create_pool(Some(Runtime::Tokio1))?;
    Ok(pool)
}
