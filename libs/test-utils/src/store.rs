use async_trait::async_trait;
use events_errors::EventResult;
use events_filters::{Condition, Predicate, geo};
use events_models::{BucketType, Category, City, Event, EventBucket, GeoPoint};
use events_queries::{CatalogReader, EventQuery, EventReader};

use crate::fixtures;

/// Event catalog held in memory. Evaluates predicates directly instead of
/// compiling them, so it shares filter semantics with the SQL store but
/// none of its code.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    pub cities: Vec<City>,
    pub categories: Vec<Category>,
    /// Slugs of the categories shown as category-tab sections.
    pub sections: Vec<String>,
    pub buckets: Vec<EventBucket>,
    pub events: Vec<Event>,
}

impl InMemoryStore {
    /// Store seeded with the fixture cities, categories and buckets.
    pub fn seeded() -> Self {
        let categories = fixtures::categories();
        Self {
            cities: fixtures::cities(),
            sections: categories.iter().map(|c| c.slug.clone()).collect(),
            categories,
            buckets: fixtures::when_buckets()
                .into_iter()
                .chain(fixtures::price_buckets())
                .collect(),
            events: Vec::new(),
        }
    }

    pub fn with_events(mut self, events: Vec<Event>) -> Self {
        self.events = events;
        self
    }

    fn visible<'a>(
        &'a self, predicate: &'a Predicate,
    ) -> impl Iterator<Item = &'a Event> + 'a {
        let viewable = Predicate::from(Condition::Viewable);
        self.events
            .iter()
            .filter(move |e| viewable.matches(e) && predicate.matches(e))
    }

    fn by_name(mut categories: Vec<Category>) -> Vec<Category> {
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        categories
    }
}

#[async_trait]
impl EventReader for InMemoryStore {
    async fn find_events(&self, query: &EventQuery) -> EventResult<Vec<Event>> {
        let mut events: Vec<Event> =
            self.visible(&query.predicate).cloned().collect();
        events.sort_by(|a, b| query.order.compare(a, b));
        let offset = query.offset.unwrap_or(0) as usize;
        let limit = query.limit.map_or(usize::MAX, |l| l as usize);
        Ok(events.into_iter().skip(offset).take(limit).collect())
    }

    async fn count_events(&self, predicate: &Predicate) -> EventResult<u64> {
        Ok(self.visible(predicate).count() as u64)
    }

    async fn any_event(&self, predicate: &Predicate) -> EventResult<bool> {
        Ok(self.visible(predicate).next().is_some())
    }
}

#[async_trait]
impl CatalogReader for InMemoryStore {
    async fn city_by_slug(&self, slug: &str) -> EventResult<Option<City>> {
        Ok(self.cities.iter().find(|c| c.slug == slug).cloned())
    }

    async fn curated_cities_within(
        &self, point: GeoPoint, meters: f64,
    ) -> EventResult<Vec<(City, f64)>> {
        let mut found: Vec<(City, f64)> = self
            .cities
            .iter()
            .filter(|c| c.is_curated)
            .map(|c| (c.clone(), geo::haversine_distance(point, c.point)))
            .filter(|(_, distance)| *distance <= meters)
            .collect();
        found.sort_by(|a, b| a.1.total_cmp(&b.1));
        Ok(found)
    }

    async fn nearest_cluster_sibling(
        &self, city: &City,
    ) -> EventResult<Option<(City, f64)>> {
        let Some(cluster) = city.cluster.as_deref()
        else {
            return Ok(None);
        };
        Ok(self
            .cities
            .iter()
            .filter(|c| c.id != city.id && c.in_cluster(cluster))
            .map(|c| (c.clone(), geo::haversine_distance(city.point, c.point)))
            .min_by(|a, b| a.1.total_cmp(&b.1)))
    }

    async fn cities_in_state(&self, state: &str) -> EventResult<Vec<City>> {
        let by_slug: Vec<City> = self
            .cities
            .iter()
            .filter(|c| c.state_slug.as_deref() == Some(state))
            .cloned()
            .collect();
        if !by_slug.is_empty() {
            return Ok(by_slug);
        }
        Ok(self
            .cities
            .iter()
            .filter(|c| {
                c.state_code
                    .as_deref()
                    .is_some_and(|code| code.eq_ignore_ascii_case(state))
            })
            .cloned()
            .collect())
    }

    async fn event_buckets(&self, kind: BucketType) -> EventResult<Vec<EventBucket>> {
        let mut buckets: Vec<EventBucket> = self
            .buckets
            .iter()
            .filter(|b| b.is_active && b.bucket_type == kind)
            .cloned()
            .collect();
        buckets.sort_by_key(|b| b.sort_order);
        Ok(buckets)
    }

    async fn category_sections(&self) -> EventResult<Vec<Category>> {
        Ok(Self::by_name(
            self.categories
                .iter()
                .filter(|c| self.sections.contains(&c.slug))
                .cloned()
                .collect(),
        ))
    }

    async fn categories_with_events(
        &self, predicate: &Predicate,
    ) -> EventResult<Vec<Category>> {
        let matching: Vec<&Event> = self.visible(predicate).collect();
        Ok(Self::by_name(
            self.categories
                .iter()
                .filter(|c| c.is_viewable)
                .filter(|c| matching.iter().any(|e| e.category_slugs.contains(&c.slug)))
                .cloned()
                .collect(),
        ))
    }
}
