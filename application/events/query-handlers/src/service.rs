use std::sync::Arc;

use events_errors::{EventError, EventResult};
use events_filters::{
    CityCalendar, EventFilterParams, FilterContext, FilterError, Predicate,
    RadiusOrigin, compose_filters,
};
use events_models::{City, GeoPoint};
use events_queries::{
    CatalogReader, Clock, Endpoint, EventOrder, EventQuery, EventReader,
    PageRequest,
};
use events_responses::{CountResponse, EventResponse, Page};
use tracing::{debug, instrument};

use crate::{
    config::DiscoveryConfig,
    curated::{CuratedResolver, curation_exclusion},
    search::TextSearch,
};

/// Resolved request: the filter context plus the requested city when it
/// exists.
struct RequestScope {
    filters: FilterContext,
    city: Option<City>,
}

/// Entry point for every event listing. Holds no per-request state.
#[derive(Clone)]
pub struct EventQueryService {
    pub(crate) events: Arc<dyn EventReader>,
    pub(crate) catalog: Arc<dyn CatalogReader>,
    pub(crate) clock: Arc<dyn Clock>,
    resolver: CuratedResolver,
    search: TextSearch,
    config: DiscoveryConfig,
}

impl EventQueryService {
    pub fn new(
        events: Arc<dyn EventReader>, catalog: Arc<dyn CatalogReader>,
        clock: Arc<dyn Clock>, config: DiscoveryConfig,
    ) -> Self {
        Self {
            resolver: CuratedResolver::new(
                catalog.clone(),
                config.cluster.clone(),
                config.cluster_anchor.clone(),
            ),
            search: TextSearch::new(events.clone()),
            events,
            catalog,
            clock,
            config,
        }
    }

    pub fn config(&self) -> &DiscoveryConfig { &self.config }

    async fn scope(&self, params: &EventFilterParams) -> EventResult<RequestScope> {
        let now = self.clock.now();
        let city = match params.city_slug() {
            Some(slug) => self.catalog.city_by_slug(slug).await?,
            None => None,
        };

        let request_calendar =
            city.as_ref().map(|city| CityCalendar::for_city(city, now));
        let when_calendar = if params.city_slug().is_some() {
            request_calendar
        }
        else {
            self.catalog
                .city_by_slug(&self.config.fallback_city)
                .await?
                .map(|city| CityCalendar::for_city(&city, now))
        };

        let radius_origin = match params.radius {
            Some(_) => self.radius_origin(params, city.as_ref()).await?,
            None => RadiusOrigin::Unspecified,
        };

        let state_city_ids = match &params.state {
            Some(state) => Some(
                self.catalog
                    .cities_in_state(state)
                    .await?
                    .iter()
                    .map(|c| c.id)
                    .collect(),
            ),
            None => None,
        };

        Ok(RequestScope {
            filters: FilterContext {
                when_calendar,
                request_calendar,
                radius_origin,
                state_city_ids,
                alias_hundred_plus: self.config.alias_hundred_plus,
                ..FilterContext::new(now)
            },
            city,
        })
    }

    async fn radius_origin(
        &self, params: &EventFilterParams, city: Option<&City>,
    ) -> EventResult<RadiusOrigin> {
        let coordinates = params
            .latitude
            .zip(params.longitude)
            .map(|(lat, lon)| RadiusOrigin::Point(GeoPoint::new(lat, lon)));

        let Some(city) = city
        else {
            return Ok(match (params.city_slug(), coordinates) {
                (_, Some(point)) => point,
                (Some(_), None) => RadiusOrigin::Unresolvable,
                (None, None) => RadiusOrigin::Unspecified,
            });
        };

        if city.in_cluster(&self.config.cluster) {
            if let Some((sibling, _)) =
                self.catalog.nearest_cluster_sibling(city).await?
            {
                return Ok(RadiusOrigin::Cluster {
                    city: city.point,
                    sibling: sibling.point,
                });
            }
        }
        Ok(RadiusOrigin::Point(city.point))
    }

    /// Predicate and ordering of an endpoint's result set.
    #[instrument(skip(self))]
    pub async fn plan(
        &self, endpoint: Endpoint, params: &EventFilterParams,
    ) -> EventResult<(Predicate, EventOrder)> {
        let plan = endpoint.plan();
        let missing = plan.missing_fields(params);
        if !missing.is_empty() {
            return Err(FilterError::RequiredFields(missing).into());
        }

        let params = match plan.default_radius {
            Some(radius) => params.with_default_radius(radius),
            None => params.clone(),
        };
        let scope = self.scope(&params).await?;
        let order = plan.order(&params);
        let scoped = plan
            .base_predicate(&params, scope.filters.now)
            .and(compose_filters(&params, &scope.filters)?);

        if let Some(term) = params.search_term() {
            return self.search.narrow(scoped, term, order).await;
        }

        match scope.city {
            Some(city) if !city.is_curated => {
                let candidates = self.resolver.resolve(&city, params.radius).await?;
                debug!("{} curated candidates for {}", candidates.len(), city.slug);
                Ok((scoped.and(curation_exclusion(&candidates)), order))
            }
            _ => Ok((scoped, order)),
        }
    }

    /// One page of an endpoint's events. `limit` caps the result set
    /// before paging.
    #[instrument(skip(self))]
    pub async fn list_events(
        &self, endpoint: Endpoint, params: &EventFilterParams,
        request: PageRequest,
    ) -> EventResult<Page<EventResponse>> {
        let (predicate, order) = self.plan(endpoint, params).await?;

        let mut count = self.events.count_events(&predicate).await?;
        if let Some(limit) = params.limit {
            count = count.min(limit as u64);
        }

        let offset = request.offset();
        let take = count.saturating_sub(offset).min(request.page_size);
        let events = if take == 0 {
            Vec::new()
        }
        else {
            let query = EventQuery::new(predicate, order).offset(offset).limit(take);
            self.events.find_events(&query).await?
        };

        let results = events.into_iter().map(EventResponse::from).collect();
        let page = Page::new(results, count, request.page, request.page_size);
        Ok(match params.search_term() {
            Some(term) => page.with_search_key(term),
            None => page,
        })
    }

    #[instrument(skip(self))]
    pub async fn count(&self, params: &EventFilterParams) -> EventResult<CountResponse> {
        let (predicate, _) = self.plan(Endpoint::Count, params).await?;
        let mut count = self.events.count_events(&predicate).await?;
        if let Some(limit) = params.limit {
            count = count.min(limit as u64);
        }
        Ok(CountResponse { count })
    }

    /// Rejects values no store query can satisfy before any lookup runs.
    pub fn validate(params: &EventFilterParams) -> EventResult<()> {
        if params.limit == Some(0) {
            return Err(EventError::InvalidParameter("limit must be positive".into()));
        }
        if params.map_radius.is_some_and(|miles| !miles.is_finite() || miles < 0.0) {
            return Err(FilterError::InvalidValue {
                field: "map_radius",
                value: params.map_radius.map(|m| m.to_string()).unwrap_or_default(),
            }
            .into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, Utc};
    use chrono_tz::America::{Chicago, New_York};
    use events_models::{Event, PriceTier, RadiusToken, WhenToken};
    use test_utils::*;

    use super::*;

    /// Wednesday noon in Tampa.
    fn now() -> DateTime<Utc> { local_time(New_York, 2024, 5, 15, 12, 0) }

    fn service(events: Vec<Event>) -> EventQueryService {
        let store = Arc::new(InMemoryStore::seeded().with_events(events));
        EventQueryService::new(
            store.clone(),
            store,
            Arc::new(FixedClock::at(now())),
            DiscoveryConfig::default(),
        )
    }

    fn ids(page: &Page<EventResponse>) -> Vec<i64> {
        page.results.iter().map(|e| e.id).collect()
    }

    fn first_page() -> PageRequest { PageRequest::new(None, None, 20) }

    #[tokio::test]
    async fn test_weekend_free_in_tampa() {
        let saturday = local_time(New_York, 2024, 5, 18, 14, 0);
        let paid_saturday = Event {
            prices_available: vec![PriceTier::Price25],
            ..event_in(2, "Paid Saturday", &tampa_bay(), saturday)
        };
        let service = service(vec![
            event_in(1, "Free Saturday", &tampa_bay(), saturday),
            paid_saturday,
            event_in(3, "Free Thursday", &tampa_bay(), local_time(New_York, 2024, 5, 16, 14, 0)),
        ]);
        let params = EventFilterParams {
            city: Some(TAMPA_BAY.into()),
            when: vec![WhenToken::Weekend],
            price: Some(PriceTier::Free),
            ..Default::default()
        };

        let page = service.list_events(Endpoint::List, &params, first_page()).await.unwrap();
        assert_eq!(ids(&page), vec![1]);
        assert_eq!(page.count, 1);
    }

    #[tokio::test]
    async fn test_uncurated_city_without_candidates_hides_promoted() {
        let start = local_time(Chicago, 2024, 5, 16, 19, 0);
        let featured = Event {
            is_featured: true,
            ..event_in(1, "Featured", &austin(), start)
        };
        let picked = Event {
            is_staff_picked: true,
            ..event_in(2, "Picked", &austin(), start)
        };
        let service = service(vec![
            featured,
            picked,
            event_in(3, "Ordinary", &austin(), start),
        ]);
        let params = EventFilterParams {
            city: Some(AUSTIN.into()),
            radius: Some(RadiusToken::Mile25),
            ..Default::default()
        };

        let page = service.list_events(Endpoint::List, &params, first_page()).await.unwrap();
        assert_eq!(ids(&page), vec![3]);
    }

    #[tokio::test]
    async fn test_curated_city_keeps_promoted_events() {
        let start = now() + Duration::days(1);
        let featured = Event {
            is_featured: true,
            ..event_in(1, "Featured", &tampa_bay(), start)
        };
        let service = service(vec![featured]);
        let params = EventFilterParams {
            city: Some(TAMPA_BAY.into()),
            ..Default::default()
        };
        let page = service.list_events(Endpoint::List, &params, first_page()).await.unwrap();
        assert_eq!(ids(&page), vec![1]);
    }

    #[tokio::test]
    async fn test_search_falls_through_to_substring() {
        let start = now() + Duration::days(1);
        let described = Event {
            description: "An evening with the Pajazzo orchestra downtown celebration festival"
                .to_string(),
            ..event_in(1, "Evening Orchestra", &tampa_bay(), start)
        };
        let service = service(vec![described, event_in(2, "Farmers Market", &tampa_bay(), start)]);
        let params = EventFilterParams {
            search: Some(" jaz ".into()),
            ..Default::default()
        };

        let page = service.list_events(Endpoint::Search, &params, first_page()).await.unwrap();
        assert_eq!(ids(&page), vec![1]);
        assert_eq!(page.search_key.as_deref(), Some("jaz"));
    }

    #[tokio::test]
    async fn test_map_requires_city_and_radius() {
        let err = service(Vec::new())
            .list_events(Endpoint::Map, &EventFilterParams::default(), first_page())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EventError::Filter(FilterError::RequiredFields(ref fields)) if fields == &["city", "radius"]
        ));
    }

    #[tokio::test]
    async fn test_unknown_city_radius_needs_coordinates() {
        let start = now() + Duration::hours(2);
        let service = service(vec![event_in(1, "Today", &tampa_bay(), start)]);

        let radius = EventFilterParams {
            city: Some("atlantis".into()),
            radius: Some(RadiusToken::Mile25),
            ..Default::default()
        };
        let page = service.list_events(Endpoint::List, &radius, first_page()).await.unwrap();
        assert!(page.results.is_empty());

        let coordinates = EventFilterParams {
            latitude: Some(tampa_bay().point.latitude),
            longitude: Some(tampa_bay().point.longitude),
            ..radius.clone()
        };
        let page = service.list_events(Endpoint::List, &coordinates, first_page()).await.unwrap();
        assert_eq!(ids(&page), vec![1]);

    }

    #[tokio::test]
    async fn test_limit_caps_before_paging() {
        let events = (1..=5)
            .map(|id| event_in(id, "Show", &tampa_bay(), now() + Duration::hours(id)))
            .collect();
        let service = service(events);
        let params = EventFilterParams {
            limit: Some(3),
            ..Default::default()
        };

        let first = service
            .list_events(Endpoint::List, &params, PageRequest::new(Some(1), Some(2), 20))
            .await
            .unwrap();
        assert_eq!((ids(&first), first.count, first.next), (vec![1, 2], 3, Some(2)));

        let second = service
            .list_events(Endpoint::List, &params, PageRequest::new(Some(2), Some(2), 20))
            .await
            .unwrap();
        assert_eq!(ids(&second), vec![3]);
        assert_eq!(service.count(&params).await.unwrap().count, 3);
    }

    #[tokio::test]
    async fn test_past_view_orders_by_end() {
        let events = vec![
            event_in(1, "Older", &tampa_bay(), now() - Duration::days(3)),
            event_in(2, "Newer", &tampa_bay(), now() - Duration::days(1)),
            event_in(3, "Upcoming", &tampa_bay(), now() + Duration::days(1)),
        ];
        let params = EventFilterParams {
            when: vec![WhenToken::Past],
            ..Default::default()
        };
        let page = service(events)
            .list_events(Endpoint::List, &params, first_page())
            .await
            .unwrap();
        assert_eq!(ids(&page), vec![2, 1]);
    }

    #[test]
    fn test_validate_rejects_zero_limit() {
        let params = EventFilterParams {
            limit: Some(0),
            ..Default::default()
        };
        assert!(matches!(
            EventQueryService::validate(&params),
            Err(EventError::InvalidParameter(_))
        ));
        assert!(EventQueryService::validate(&EventFilterParams::default()).is_ok());
    }
}
