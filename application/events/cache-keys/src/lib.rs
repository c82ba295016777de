use std::fmt;

use events_filters::EventFilterParams;
use events_models::{PageType, Platform, RadiusToken, Tab};
use events_queries::{BUCKET_PAGE_SIZE, CATEGORY_PAGE_SIZE, PageRequest};
use serde::{Deserialize, Serialize};

const REGISTERED_USER: &str = "registered_user";

/// The paginated tab pages served through the native cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CachedPage {
    WhenTab,
    PricesTab,
    CategoriesTab,
}

impl CachedPage {
    pub fn url(&self) -> &'static str {
        match self {
            CachedPage::WhenTab => "/v2/events/when_paginated/",
            CachedPage::PricesTab => "/v2/events/prices_paginated/",
            CachedPage::CategoriesTab => "/v2/events/categories_paginated/",
        }
    }

    pub fn tab(&self) -> Tab {
        match self {
            CachedPage::WhenTab => Tab::Date,
            CachedPage::PricesTab => Tab::Price,
            CachedPage::CategoriesTab => Tab::Interests,
        }
    }

    pub fn default_page_size(&self) -> u64 {
        match self {
            CachedPage::CategoriesTab => CATEGORY_PAGE_SIZE,
            _ => BUCKET_PAGE_SIZE,
        }
    }

    /// Key for a request. Only the platform, the city or state, radius and
    /// paging (plus the registered-user flag on the when tab) take part;
    /// the page is always computed from the key alone. A state without a
    /// city keys a state page.
    pub fn key(
        &self, params: &EventFilterParams, request: PageRequest,
    ) -> NativeCacheKey {
        let mut extra = Vec::new();
        if *self == CachedPage::WhenTab && params.registered_user {
            extra.push(REGISTERED_USER.to_string());
        }
        let city = params.city_slug().map(str::to_string);
        let state = match city {
            Some(_) => None,
            None => params
                .state
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        };
        NativeCacheKey {
            page: *self,
            platform: params.platform.unwrap_or(Platform::Desktop),
            page_type: match state {
                Some(_) => PageType::StatePage,
                None => PageType::CityPage,
            },
            city,
            state,
            radius: params.radius,
            page_no: request.page,
            page_size: request.page_size,
            extra,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NativeCacheKey {
    pub page: CachedPage,
    pub platform: Platform,
    pub page_type: PageType,
    pub city: Option<String>,
    pub state: Option<String>,
    pub radius: Option<RadiusToken>,
    pub page_no: u64,
    pub page_size: u64,
    pub extra: Vec<String>,
}

impl NativeCacheKey {
    /// The same page with no place or radius: the fallback shown while a
    /// city or state page is still being computed.
    pub fn general(&self) -> Self {
        Self {
            page_type: PageType::CityPage,
            city: None,
            state: None,
            radius: None,
            ..self.clone()
        }
    }

    pub fn is_general(&self) -> bool {
        self.city.is_none() && self.state.is_none() && self.radius.is_none()
    }

    /// Filters the page is computed from.
    pub fn filter_params(&self) -> EventFilterParams {
        EventFilterParams {
            city: self.city.clone(),
            state: self.state.clone(),
            radius: self.radius,
            platform: Some(self.platform),
            registered_user: self.extra.iter().any(|e| e == REGISTERED_USER),
            ..Default::default()
        }
    }

    pub fn page_request(&self) -> PageRequest {
        PageRequest {
            page: self.page_no,
            page_size: self.page_size,
        }
    }
}

impl fmt::Display for NativeCacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}|{}|{}|{}|{}|{}|{}|{}",
            self.page.url(),
            self.platform,
            self.page_type,
            self.page.tab(),
            self.city.as_deref().or(self.state.as_deref()).unwrap_or("-"),
            self.radius.map(|r| r.as_str()).unwrap_or("-"),
            self.page_no,
            self.page_size,
        )?;
        for extra in &self.extra {
            write!(f, "|{extra}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> EventFilterParams {
        EventFilterParams {
            city: Some("tampa-bay-florida-united-states".into()),
            radius: Some(RadiusToken::Mile25),
            price: Some(events_models::PriceTier::Free),
            ..Default::default()
        }
    }

    #[test]
    fn test_key_renders_every_component() {
        let key = CachedPage::WhenTab.key(&params(), PageRequest::new(Some(2), None, 3));
        assert_eq!(
            key.to_string(),
            "/v2/events/when_paginated/|desktop|city_page|date|tampa-bay-florida-united-states|mile-25|2|3"
        );
    }

    #[test]
    fn test_general_key_drops_city_and_radius() {
        let key = CachedPage::PricesTab.key(&params(), PageRequest::new(None, None, 3));
        let general = key.general();
        assert!(general.is_general());
        assert_eq!(
            general.to_string(),
            "/v2/events/prices_paginated/|desktop|city_page|price|-|-|1|3"
        );
    }

    #[test]
    fn test_filter_params_come_from_key_only() {
        let mut request_params = params();
        request_params.registered_user = true;
        let key = CachedPage::WhenTab.key(&request_params, PageRequest::new(None, None, 3));
        let recomputed = key.filter_params();
        assert_eq!(recomputed.city, request_params.city);
        assert_eq!(recomputed.radius, Some(RadiusToken::Mile25));
        assert!(recomputed.registered_user);
        assert_eq!(recomputed.price, None);

        let prices = CachedPage::PricesTab.key(&request_params, PageRequest::new(None, None, 3));
        assert!(prices.extra.is_empty());
    }

    #[test]
    fn test_platform_and_state_page_keys() {
        let params = EventFilterParams {
            state: Some("florida".into()),
            platform: Some(Platform::Mobile),
            ..Default::default()
        };
        let key = CachedPage::CategoriesTab.key(&params, PageRequest::new(None, None, 5));
        assert_eq!(key.page_type, PageType::StatePage);
        assert_eq!(
            key.to_string(),
            "/v2/events/categories_paginated/|mobile|state_page|interests|florida|-|1|5"
        );
        assert_eq!(key.filter_params().state.as_deref(), Some("florida"));
        assert!(!key.is_general());

        let general = key.general();
        assert_eq!(
            general.to_string(),
            "/v2/events/categories_paginated/|mobile|city_page|interests|-|-|1|5"
        );

        // A city takes precedence over the state.
        let city_page = CachedPage::CategoriesTab.key(
            &EventFilterParams {
                city: Some("orlando-florida-united-states".into()),
                ..params
            },
            PageRequest::new(None, None, 5),
        );
        assert_eq!(city_page.page_type, PageType::CityPage);
        assert_eq!(city_page.state, None);
    }
}
