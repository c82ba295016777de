use std::{sync::Arc, time::Duration};

use axum::{Router, routing::get};
use discovery::settings;
use events_dao::{CatalogDao, EventDao};
use events_http::{EventHandlers, EventServices, RefreshWorker};
use events_queries::SystemClock;
use events_query_handlers::{
    BucketCache, DiscoveryConfig, EventQueryService, PageRefresher, QueueDispatcher,
};
use redis_connection::{MemoryStore, NativeCacheStore, RedisStore, connect_redis_db};
use sql_connection::connect_postgres_db;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_rapidoc::RapiDoc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Initializing connection pools...");

    let db = connect_postgres_db(&settings::postgres()).await?;
    let (available, size, replica) = db.get_pool_status();
    info!(
        postgres.available = available,
        postgres.size = size,
        postgres.read_replica = db.has_read_replica(),
        "PostgreSQL connection pool initialized"
    );
    if let Some((available, size)) = replica {
        info!("Read replica pool: {}/{} connections available", available, size);
    }

    let store: Arc<dyn NativeCacheStore> = match settings::redis()? {
        Some(redis_config) => {
            let pool = connect_redis_db(&redis_config).await?;
            info!("Native cache backed by Redis");
            Arc::new(RedisStore::new(pool))
        }
        None => {
            info!("REDIS_HOST not set, native cache kept in memory");
            Arc::new(MemoryStore::new(&settings::memory()?))
        }
    };

    let config: DiscoveryConfig = settings::from_env("DISCOVERY_")?;
    let ttl = Duration::from_secs(config.cache_ttl_secs);
    let (dispatcher, jobs) = QueueDispatcher::bounded(config.refresh_queue_capacity);
    let clock = Arc::new(SystemClock);

    let query = Arc::new(EventQueryService::new(
        Arc::new(EventDao::new(db.clone())),
        Arc::new(CatalogDao::new(db)),
        clock.clone(),
        config,
    ));
    let cache = Arc::new(BucketCache::new(store, Arc::new(dispatcher), clock, ttl));

    RefreshWorker::new(PageRefresher::new(query.clone(), cache.clone()), jobs).start();

    let app = Router::new()
        .merge(EventHandlers::routes())
        .with_state(EventServices::new(query, cache))
        .merge(RapiDoc::new("/api-docs/openapi.json").path("/docs"))
        .route(
            "/api-docs/openapi.json",
            get(|| async { axum::Json(ApiDoc::openapi()) }),
        )
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr = settings::bind_addr()?;
    info!("Discovery server starting on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

#[derive(OpenApi)]
#[openapi(
    paths(
        events_http::health_check,
        events_http::list_events,
        events_http::map_events,
        events_http::search_events,
        events_http::count_events,
        events_http::curated_events,
        events_http::when_tab,
        events_http::prices_tab,
        events_http::categories_tab,
        events_http::when_paginated,
        events_http::prices_paginated,
        events_http::categories_paginated
    ),
    components(
        schemas(
            events_responses::EventResponse,
            events_responses::BucketSection,
            events_responses::CountResponse,
            events_responses::HealthResponse,
            events_http::EventsQueryParams,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "events", description = "Event listing, map, search and count endpoints"),
        (name = "tabs", description = "Bucketed when, price and category tabs")
    ),
    info(
        title = "Discovery API",
        description = "Events discovery query API",
        version = "1.0.0"
    )
)]
struct ApiDoc;
