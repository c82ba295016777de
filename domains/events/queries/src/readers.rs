use async_trait::async_trait;
use events_errors::EventResult;
use events_filters::Predicate;
use events_models::{BucketType, Category, City, Event, EventBucket, GeoPoint};

use crate::query::EventQuery;

#[async_trait]
pub trait EventReader: Send + Sync {
    /// Only active, public events are ever returned, whatever the predicate.
    async fn find_events(&self, query: &EventQuery) -> EventResult<Vec<Event>>;

    async fn count_events(&self, predicate: &Predicate) -> EventResult<u64>;

    async fn any_event(&self, predicate: &Predicate) -> EventResult<bool>;
}

/// Read-only reference data: cities, categories and event buckets.
#[async_trait]
pub trait CatalogReader: Send + Sync {
    async fn city_by_slug(&self, slug: &str) -> EventResult<Option<City>>;

    /// Curated cities within `meters` of `point` with their distance,
    /// nearest first.
    async fn curated_cities_within(
        &self, point: GeoPoint, meters: f64,
    ) -> EventResult<Vec<(City, f64)>>;

    /// Closest other member of the city's cluster, with its distance.
    async fn nearest_cluster_sibling(
        &self, city: &City,
    ) -> EventResult<Option<(City, f64)>>;

    /// Cities whose state slug matches, or failing that whose state code
    /// matches case-insensitively.
    async fn cities_in_state(&self, state: &str) -> EventResult<Vec<City>>;

    /// Active buckets of the kind, by `sort_order`.
    async fn event_buckets(&self, kind: BucketType) -> EventResult<Vec<EventBucket>>;

    /// Categories shown as sections of the categories tab, by name.
    async fn category_sections(&self) -> EventResult<Vec<Category>>;

    /// Viewable categories with at least one event matching `predicate`,
    /// by name.
    async fn categories_with_events(
        &self, predicate: &Predicate,
    ) -> EventResult<Vec<Category>>;
}
