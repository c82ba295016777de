//! Bucketed views: one short event list per when token, price tier or
//! category.

use events_cache_keys::{CachedPage, NativeCacheKey};
use events_errors::EventResult;
use events_filters::{Condition, EventFilterParams, Predicate};
use events_models::{BucketType, PriceTier, WhenToken};
use events_queries::{
    BUCKET_EVENT_LIMIT, Endpoint, EventOrder, EventQuery, PageRequest,
};
use events_responses::{BucketSection, EventResponse, Page};
use tracing::{instrument, warn};

use crate::service::EventQueryService;

fn page_window<T>(items: Vec<T>, request: PageRequest) -> Page<T> {
    let count = items.len() as u64;
    let results = items
        .into_iter()
        .skip(request.offset() as usize)
        .take(request.page_size as usize)
        .collect();
    Page::new(results, count, request.page, request.page_size)
}

/// Registered users do not get the happening-later bucket.
fn is_hidden(token: WhenToken, registered_user: bool) -> bool {
    registered_user && token == WhenToken::HappeningLater
}

impl EventQueryService {
    /// Latest located events of the list pipeline for `params`, further
    /// narrowed by `extra`.
    async fn bucket_events(
        &self, params: &EventFilterParams, extra: Predicate,
    ) -> EventResult<Vec<EventResponse>> {
        let (predicate, _) = self.plan(Endpoint::List, params).await?;
        let predicate = predicate
            .and(extra)
            .and(Condition::HasAnyLocation.into());
        let query = EventQuery::new(predicate, EventOrder::StartDesc)
            .limit(BUCKET_EVENT_LIMIT);
        Ok(self
            .events
            .find_events(&query)
            .await?
            .into_iter()
            .map(EventResponse::from)
            .collect())
    }

    async fn when_section(
        &self, params: &EventFilterParams, token: WhenToken, name: String,
    ) -> EventResult<BucketSection> {
        Ok(BucketSection {
            bucket: token.to_string(),
            name,
            events: self
                .bucket_events(&params.with_when(token), Predicate::All)
                .await?,
        })
    }

    async fn price_section(
        &self, params: &EventFilterParams, tier: PriceTier, name: String,
        strict: bool,
    ) -> EventResult<BucketSection> {
        let params = if strict {
            params.with_price_sections(tier)
        }
        else {
            let mut plain = params.with_price(tier);
            if tier == PriceTier::Free {
                plain.ongoing = Some(false);
            }
            plain
        };
        Ok(BucketSection {
            bucket: tier.to_string(),
            name,
            events: self.bucket_events(&params, Predicate::All).await?,
        })
    }

    async fn category_section(
        &self, params: &EventFilterParams, slug: String, name: String,
    ) -> EventResult<BucketSection> {
        let in_category = Condition::InCategories(vec![slug.clone()]).into();
        Ok(BucketSection {
            events: self.bucket_events(params, in_category).await?,
            bucket: slug,
            name,
        })
    }

    #[instrument(skip(self))]
    pub async fn when_tab(
        &self, params: &EventFilterParams,
    ) -> EventResult<Vec<BucketSection>> {
        let mut sections = Vec::new();
        let tokens = WhenToken::ALL.iter().copied();
        for token in tokens.filter(|t| !is_hidden(*t, params.registered_user)) {
            sections.push(
                self.when_section(params, token, token.label().to_string())
                    .await?,
            );
        }
        Ok(sections)
    }

    #[instrument(skip(self))]
    pub async fn prices_tab(
        &self, params: &EventFilterParams,
    ) -> EventResult<Vec<BucketSection>> {
        let mut sections = Vec::new();
        for tier in PriceTier::ALL.iter().copied() {
            sections.push(
                self.price_section(params, tier, tier.label().to_string(), false)
                    .await?,
            );
        }
        Ok(sections)
    }

    #[instrument(skip(self))]
    pub async fn categories_tab(
        &self, params: &EventFilterParams,
    ) -> EventResult<Vec<BucketSection>> {
        let mut sections = Vec::new();
        for category in self.catalog.category_sections().await? {
            sections.push(
                self.category_section(params, category.slug, category.name)
                    .await?,
            );
        }
        Ok(sections)
    }

    /// Computes the cached tab page `key` stands for, from the key alone.
    #[instrument(skip(self, key), fields(key = %key))]
    pub async fn paginated_page(
        &self, key: &NativeCacheKey,
    ) -> EventResult<Page<BucketSection>> {
        let params = key.filter_params();
        let request = key.page_request();

        let mut sections = Vec::new();
        match key.page {
            CachedPage::WhenTab => {
                let buckets = self.catalog.event_buckets(BucketType::When).await?;
                let named: Vec<(WhenToken, String)> = buckets
                    .into_iter()
                    .filter_map(|bucket| match bucket.when_token() {
                        Ok(token) => Some((token, bucket.name)),
                        Err(e) => {
                            warn!("Skipping bucket {}: {}", bucket.id, e);
                            None
                        }
                    })
                    .filter(|(token, _)| !is_hidden(*token, params.registered_user))
                    .collect();
                let page = page_window(named, request);
                for (token, name) in page.results {
                    sections.push(self.when_section(&params, token, name).await?);
                }
                Ok(Page::new(sections, page.count, request.page, request.page_size))
            }
            CachedPage::PricesTab => {
                let buckets = self.catalog.event_buckets(BucketType::Price).await?;
                let named: Vec<(PriceTier, String)> = buckets
                    .into_iter()
                    .filter_map(|bucket| match bucket.price_tier() {
                        Ok(tier) => Some((tier, bucket.name)),
                        Err(e) => {
                            warn!("Skipping bucket {}: {}", bucket.id, e);
                            None
                        }
                    })
                    .collect();
                let page = page_window(named, request);
                for (tier, name) in page.results {
                    sections.push(self.price_section(&params, tier, name, true).await?);
                }
                Ok(Page::new(sections, page.count, request.page, request.page_size))
            }
            CachedPage::CategoriesTab => {
                let (listed, _) = self.plan(Endpoint::List, &params).await?;
                let upcoming = listed.and(Predicate::upcoming(self.clock.now()));
                let categories = self.catalog.categories_with_events(&upcoming).await?;
                let page = page_window(categories, request);
                for category in page.results {
                    sections.push(
                        self.category_section(&params, category.slug, category.name)
                            .await?,
                    );
                }
                Ok(Page::new(sections, page.count, request.page, request.page_size))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{DateTime, Duration, Utc};
    use chrono_tz::America::New_York;
    use events_models::{Event, EventBucket};
    use test_utils::*;

    use super::*;
    use crate::config::DiscoveryConfig;

    fn now() -> DateTime<Utc> { local_time(New_York, 2024, 5, 15, 12, 0) }

    fn service_over(store: InMemoryStore) -> EventQueryService {
        let store = Arc::new(store);
        EventQueryService::new(
            store.clone(),
            store,
            Arc::new(FixedClock::at(now())),
            DiscoveryConfig::default(),
        )
    }

    fn service(events: Vec<Event>) -> EventQueryService {
        service_over(InMemoryStore::seeded().with_events(events))
    }

    fn tampa() -> EventFilterParams {
        EventFilterParams {
            city: Some(TAMPA_BAY.into()),
            ..Default::default()
        }
    }

    fn event_ids(section: &BucketSection) -> Vec<i64> {
        section.events.iter().map(|e| e.id).collect()
    }

    #[tokio::test]
    async fn test_when_tab_buckets() {
        let today = local_time(New_York, 2024, 5, 15, 18, 0);
        let later = local_time(New_York, 2024, 6, 20, 18, 0);
        let service = service(vec![
            event_in(1, "Tonight", &tampa_bay(), today),
            event_in(2, "Much later", &tampa_bay(), later),
            event_in(3, "Yesterday", &tampa_bay(), now() - Duration::days(1)),
        ]);

        let sections = service.when_tab(&tampa()).await.unwrap();
        let by_bucket = |bucket: &str| {
            sections
                .iter()
                .find(|s| s.bucket == bucket)
                .map(event_ids)
                .unwrap_or_default()
        };
        assert_eq!(sections.len(), WhenToken::ALL.len());
        assert_eq!(by_bucket("today"), vec![1]);
        assert_eq!(by_bucket("this-week"), vec![1]);
        assert_eq!(by_bucket("happening-later"), vec![2]);
        assert_eq!(by_bucket("past"), vec![3]);

        let registered = EventFilterParams {
            registered_user: true,
            ..tampa()
        };
        let sections = service.when_tab(&registered).await.unwrap();
        assert!(sections.iter().all(|s| s.bucket != "happening-later"));
    }

    #[tokio::test]
    async fn test_bucket_excludes_unlocated_and_caps_at_ten() {
        let mut events: Vec<Event> = (1..=12)
            .map(|id| event_in(id, "Show", &tampa_bay(), now() + Duration::hours(id)))
            .collect();
        events.push(Event {
            locations: Vec::new(),
            ..event_in(50, "Nowhere", &tampa_bay(), now() + Duration::hours(1))
        });
        let sections = service(events).prices_tab(&tampa()).await.unwrap();

        let free = &sections[0];
        assert_eq!(free.bucket, "free");
        assert_eq!(event_ids(free), vec![12, 11, 10, 9, 8, 7, 6, 5, 4, 3]);
    }

    #[tokio::test]
    async fn test_free_bucket_skips_ongoing_events() {
        let running = event_in(1, "Running", &tampa_bay(), now() - Duration::hours(1));
        let sections = service(vec![running]).prices_tab(&tampa()).await.unwrap();
        assert!(sections[0].events.is_empty());
    }

    #[tokio::test]
    async fn test_categories_tab_by_name() {
        let music = Event {
            category_slugs: vec!["music".into()],
            ..event_in(1, "Concert", &tampa_bay(), now() + Duration::days(1))
        };
        let sections = service(vec![music]).categories_tab(&tampa()).await.unwrap();
        let names: Vec<&str> = sections.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Arts", "Food & Drink", "Music"]);
        assert_eq!(event_ids(&sections[2]), vec![1]);
    }

    #[tokio::test]
    async fn test_paginated_prices_are_strict() {
        let cheap = Event {
            prices_available: vec![PriceTier::Price10, PriceTier::Price25],
            ..event_in(1, "Cheap", &tampa_bay(), now() + Duration::days(1))
        };
        let service = service(vec![cheap]);
        let key = CachedPage::PricesTab.key(&tampa(), PageRequest::new(Some(1), Some(3), 3));

        let page = service.paginated_page(&key).await.unwrap();
        assert_eq!(page.count, PriceTier::ALL.len() as u64);
        assert_eq!(page.next, Some(2));
        let buckets: Vec<&str> = page.results.iter().map(|s| s.bucket.as_str()).collect();
        assert_eq!(buckets, vec!["free", "price_10", "price_25"]);
        assert_eq!(event_ids(&page.results[1]), vec![1]);
        assert!(page.results[2].events.is_empty());
    }

    #[tokio::test]
    async fn test_paginated_when_skips_unknown_buckets() {
        let mut store = InMemoryStore::seeded();
        store.buckets.push(EventBucket {
            id: 99,
            bucket_type: BucketType::When,
            bucket: "someday".into(),
            name: "Someday".into(),
            sort_order: 0,
            is_active: true,
        });
        let key = CachedPage::WhenTab.key(&tampa(), PageRequest::new(Some(1), Some(20), 3));
        let page = service_over(store).paginated_page(&key).await.unwrap();
        assert_eq!(page.count, WhenToken::ALL.len() as u64);
    }

    #[tokio::test]
    async fn test_paginated_categories_only_with_upcoming_events() {
        let food = Event {
            category_slugs: vec!["food-drink".into()],
            ..event_in(1, "Tasting", &tampa_bay(), now() + Duration::days(2))
        };
        let key = CachedPage::CategoriesTab.key(&tampa(), PageRequest::new(None, None, 5));
        let page = service(vec![food]).paginated_page(&key).await.unwrap();
        assert_eq!(page.count, 1);
        assert_eq!(page.results[0].bucket, "food-drink");
        assert_eq!(event_ids(&page.results[0]), vec![1]);
    }
}
