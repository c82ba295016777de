pub mod background_jobs;
pub mod params;

use std::sync::Arc;

use axum::{Router, extract::State, response::Json, routing::get};
use axum_extra::extract::Query;
use common_errors::AppError;
use events_cache_keys::CachedPage;
use events_filters::EventFilterParams;
use events_queries::Endpoint;
use events_query_handlers::{BucketCache, EventQueryService};
use events_responses::{
    BucketSection, CountResponse, EventResponse, HealthResponse, Page,
};
use serde_json::Value;
use tracing::{debug, instrument};

pub use crate::{background_jobs::RefreshWorker, params::EventsQueryParams};

#[derive(Clone)]
pub struct EventServices {
    pub query: Arc<EventQueryService>,
    pub cache: Arc<BucketCache>,
}

impl EventServices {
    pub fn new(query: Arc<EventQueryService>, cache: Arc<BucketCache>) -> Self {
        Self { query, cache }
    }

    async fn event_page(
        &self, endpoint: Endpoint, params: &EventsQueryParams,
    ) -> Result<Json<Page<EventResponse>>, AppError> {
        let filters = validated_filters(params)?;
        let request = params.page_request(endpoint.plan().page_size)?;
        let page = self.query.list_events(endpoint, &filters, request).await?;
        Ok(Json(page))
    }

    async fn cached_page(
        &self, page: CachedPage, params: &EventsQueryParams,
    ) -> Result<Json<Value>, AppError> {
        let filters = validated_filters(params)?;
        let request = params.page_request(page.default_page_size())?;
        let read = self.cache.read(&page.key(&filters, request)).await;
        debug!("Serving {:?} page from {:?}", page, read.source);
        Ok(Json(read.payload))
    }
}

fn validated_filters(params: &EventsQueryParams) -> Result<EventFilterParams, AppError> {
    let filters = params.filters()?;
    EventQueryService::validate(&filters)?;
    Ok(filters)
}

pub struct EventHandlers;

impl EventHandlers {
    pub fn routes() -> Router<EventServices> {
        Router::new()
            .route("/v2/events/", get(list_events))
            .route("/v2/events/map/", get(map_events))
            .route("/v2/events/search/", get(search_events))
            .route("/v2/events/count/", get(count_events))
            .route("/v2/events/curated/", get(curated_events))
            .route("/v2/events/when/", get(when_tab))
            .route("/v2/events/prices/", get(prices_tab))
            .route("/v2/events/categories/", get(categories_tab))
            .route("/v2/events/when_paginated/", get(when_paginated))
            .route("/v2/events/prices_paginated/", get(prices_paginated))
            .route("/v2/events/categories_paginated/", get(categories_paginated))
            .route("/health", get(health_check))
    }
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/v2/events/",
    params(EventsQueryParams),
    responses(
        (status = 200, description = "Page of events", body = Page<EventResponse>),
        (status = 400, description = "Invalid query parameters", body = common_errors::ApiErrorResponse),
        (status = 500, description = "Internal server error", body = common_errors::ApiErrorResponse)
    ),
    tag = "events"
)]
#[instrument(skip_all)]
pub async fn list_events(
    State(services): State<EventServices>,
    Query(params): Query<EventsQueryParams>,
) -> Result<Json<Page<EventResponse>>, AppError> {
    services.event_page(Endpoint::List, &params).await
}

#[utoipa::path(
    get,
    path = "/v2/events/map/",
    params(EventsQueryParams),
    responses(
        (status = 200, description = "Page of events for the map view", body = Page<EventResponse>),
        (status = 400, description = "Missing city or radius", body = common_errors::ApiErrorResponse),
        (status = 500, description = "Internal server error", body = common_errors::ApiErrorResponse)
    ),
    tag = "events"
)]
#[instrument(skip_all)]
pub async fn map_events(
    State(services): State<EventServices>,
    Query(params): Query<EventsQueryParams>,
) -> Result<Json<Page<EventResponse>>, AppError> {
    services.event_page(Endpoint::Map, &params).await
}

#[utoipa::path(
    get,
    path = "/v2/events/search/",
    params(EventsQueryParams),
    responses(
        (status = 200, description = "Page of matching events with the search key", body = Page<EventResponse>),
        (status = 400, description = "Missing search term", body = common_errors::ApiErrorResponse),
        (status = 500, description = "Internal server error", body = common_errors::ApiErrorResponse)
    ),
    tag = "events"
)]
#[instrument(skip_all)]
pub async fn search_events(
    State(services): State<EventServices>,
    Query(params): Query<EventsQueryParams>,
) -> Result<Json<Page<EventResponse>>, AppError> {
    services.event_page(Endpoint::Search, &params).await
}

#[utoipa::path(
    get,
    path = "/v2/events/curated/",
    params(EventsQueryParams),
    responses(
        (status = 200, description = "Page of staff-picked events", body = Page<EventResponse>),
        (status = 400, description = "Invalid query parameters", body = common_errors::ApiErrorResponse),
        (status = 500, description = "Internal server error", body = common_errors::ApiErrorResponse)
    ),
    tag = "events"
)]
#[instrument(skip_all)]
pub async fn curated_events(
    State(services): State<EventServices>,
    Query(params): Query<EventsQueryParams>,
) -> Result<Json<Page<EventResponse>>, AppError> {
    services.event_page(Endpoint::Curated, &params).await
}

#[utoipa::path(
    get,
    path = "/v2/events/count/",
    params(EventsQueryParams),
    responses(
        (status = 200, description = "Number of matching events", body = CountResponse),
        (status = 400, description = "Invalid query parameters", body = common_errors::ApiErrorResponse),
        (status = 500, description = "Internal server error", body = common_errors::ApiErrorResponse)
    ),
    tag = "events"
)]
#[instrument(skip_all)]
pub async fn count_events(
    State(services): State<EventServices>,
    Query(params): Query<EventsQueryParams>,
) -> Result<Json<CountResponse>, AppError> {
    let filters = validated_filters(&params)?;
    Ok(Json(services.query.count(&filters).await?))
}

#[utoipa::path(
    get,
    path = "/v2/events/when/",
    params(EventsQueryParams),
    responses(
        (status = 200, description = "Events grouped by when bucket", body = Vec<BucketSection>),
        (status = 400, description = "Invalid query parameters", body = common_errors::ApiErrorResponse),
        (status = 500, description = "Internal server error", body = common_errors::ApiErrorResponse)
    ),
    tag = "tabs"
)]
#[instrument(skip_all)]
pub async fn when_tab(
    State(services): State<EventServices>,
    Query(params): Query<EventsQueryParams>,
) -> Result<Json<Vec<BucketSection>>, AppError> {
    let filters = validated_filters(&params)?;
    Ok(Json(services.query.when_tab(&filters).await?))
}

#[utoipa::path(
    get,
    path = "/v2/events/prices/",
    params(EventsQueryParams),
    responses(
        (status = 200, description = "Events grouped by price tier", body = Vec<BucketSection>),
        (status = 400, description = "Invalid query parameters", body = common_errors::ApiErrorResponse),
        (status = 500, description = "Internal server error", body = common_errors::ApiErrorResponse)
    ),
    tag = "tabs"
)]
#[instrument(skip_all)]
pub async fn prices_tab(
    State(services): State<EventServices>,
    Query(params): Query<EventsQueryParams>,
) -> Result<Json<Vec<BucketSection>>, AppError> {
    let filters = validated_filters(&params)?;
    Ok(Json(services.query.prices_tab(&filters).await?))
}

#[utoipa::path(
    get,
    path = "/v2/events/categories/",
    params(EventsQueryParams),
    responses(
        (status = 200, description = "Events grouped by section category", body = Vec<BucketSection>),
        (status = 400, description = "Invalid query parameters", body = common_errors::ApiErrorResponse),
        (status = 500, description = "Internal server error", body = common_errors::ApiErrorResponse)
    ),
    tag = "tabs"
)]
#[instrument(skip_all)]
pub async fn categories_tab(
    State(services): State<EventServices>,
    Query(params): Query<EventsQueryParams>,
) -> Result<Json<Vec<BucketSection>>, AppError> {
    let filters = validated_filters(&params)?;
    Ok(Json(services.query.categories_tab(&filters).await?))
}

#[utoipa::path(
    get,
    path = "/v2/events/when_paginated/",
    params(EventsQueryParams),
    responses(
        (status = 200, description = "Cached page of when buckets", body = Page<BucketSection>),
        (status = 400, description = "Invalid query parameters", body = common_errors::ApiErrorResponse)
    ),
    tag = "tabs"
)]
#[instrument(skip_all)]
pub async fn when_paginated(
    State(services): State<EventServices>,
    Query(params): Query<EventsQueryParams>,
) -> Result<Json<Value>, AppError> {
    services.cached_page(CachedPage::WhenTab, &params).await
}

#[utoipa::path(
    get,
    path = "/v2/events/prices_paginated/",
    params(EventsQueryParams),
    responses(
        (status = 200, description = "Cached page of price buckets", body = Page<BucketSection>),
        (status = 400, description = "Invalid query parameters", body = common_errors::ApiErrorResponse)
    ),
    tag = "tabs"
)]
#[instrument(skip_all)]
pub async fn prices_paginated(
    State(services): State<EventServices>,
    Query(params): Query<EventsQueryParams>,
) -> Result<Json<Value>, AppError> {
    services.cached_page(CachedPage::PricesTab, &params).await
}

#[utoipa::path(
    get,
    path = "/v2/events/categories_paginated/",
    params(EventsQueryParams),
    responses(
        (status = 200, description = "Cached page of category sections", body = Page<BucketSection>),
        (status = 400, description = "Invalid query parameters", body = common_errors::ApiErrorResponse)
    ),
    tag = "tabs"
)]
#[instrument(skip_all)]
pub async fn categories_paginated(
    State(services): State<EventServices>,
    Query(params): Query<EventsQueryParams>,
) -> Result<Json<Value>, AppError> {
    services.cached_page(CachedPage::CategoriesTab, &params).await
}
