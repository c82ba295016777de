//! Request orchestration for event discovery: filter resolution, curated
//! fallback, text search, bucket tabs and the stale-while-revalidate page
//! cache.

pub mod bucket_cache;
pub mod config;
pub mod curated;
pub mod refresh;
pub mod search;
pub mod service;
mod tabs;

pub use bucket_cache::{BucketCache, CacheRead, CacheSource, StalenessPolicy, TtlPolicy};
pub use config::DiscoveryConfig;
pub use curated::{CuratedResolver, curation_exclusion};
pub use refresh::{
    DispatchError, PageRefresher, QueueDispatcher, RefreshDispatcher, RefreshJob,
};
pub use search::{SearchTier, TextSearch};
pub use service::EventQueryService;
