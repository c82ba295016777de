use chrono::{DateTime, Utc};
use events_models::{Event, GeoPoint, PriceTier};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct EventResponse {
    pub id: i64,
    pub name: String,
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub prices_available: Vec<PriceTier>,
    pub is_featured: bool,
    pub is_staff_picked: bool,
    pub point: Option<GeoPoint>,
    pub categories: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Event> for EventResponse {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            name: event.name,
            description: event.description,
            start_date: event.start_date,
            end_date: event.end_date,
            prices_available: event.prices_available,
            is_featured: event.is_featured,
            is_staff_picked: event.is_staff_picked,
            point: event.point,
            categories: event.category_slugs,
            created_at: event.created_at,
        }
    }
}

/// One page of a numbered listing. `next`/`previous` carry page numbers
/// when those pages exist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Page<T> {
    pub count: u64,
    pub next: Option<u64>,
    pub previous: Option<u64>,
    pub results: Vec<T>,
    /// The trimmed search term, on searched listings.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_key: Option<String>,
}

impl<T> Page<T> {
    pub fn new(results: Vec<T>, count: u64, page: u64, page_size: u64) -> Self {
        let last_page = count.div_ceil(page_size.max(1)).max(1);
        Self {
            count,
            next: (page < last_page).then_some(page + 1),
            previous: (page > 1).then(|| (page - 1).min(last_page)),
            results,
            search_key: None,
        }
    }

    pub fn empty() -> Self {
        Self {
            count: 0,
            next: None,
            previous: None,
            results: Vec::new(),
            search_key: None,
        }
    }

    pub fn with_search_key(mut self, term: impl Into<String>) -> Self {
        self.search_key = Some(term.into());
        self
    }
}

/// A named group of events: one when/price bucket or one category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BucketSection {
    /// Token or category slug identifying the bucket.
    pub bucket: String,
    pub name: String,
    pub events: Vec<EventResponse>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct CountResponse {
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_links() {
        let page: Page<u8> = Page::new(vec![1, 2, 3], 7, 1, 3);
        assert_eq!((page.next, page.previous), (Some(2), None));

        let page: Page<u8> = Page::new(vec![7], 7, 3, 3);
        assert_eq!((page.next, page.previous), (None, Some(2)));

        let page: Page<u8> = Page::new(Vec::new(), 0, 1, 3);
        assert_eq!((page.next, page.previous), (None, None));
    }

    #[test]
    fn test_empty_page_serializes_like_listing() {
        let json = serde_json::to_value(Page::<BucketSection>::empty()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"count": 0, "next": null, "previous": null, "results": []})
        );
    }
}
