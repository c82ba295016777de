use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use events_models::{Platform, PriceTier, RadiusToken, WhenToken};

/// Parsed request filters. Never mutated once built; bucket views derive
/// modified copies through the `with_*` methods.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventFilterParams {
    pub city: Option<String>,
    pub when: Vec<WhenToken>,
    pub since: Option<NaiveDateTime>,
    pub until: Option<NaiveDateTime>,
    pub date: Option<NaiveDate>,
    pub price: Option<PriceTier>,
    pub price_sections: Option<PriceTier>,
    pub radius: Option<RadiusToken>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// Miles around `latitude`/`longitude`.
    pub map_radius: Option<f64>,
    pub is_featured: Option<bool>,
    pub is_curated: Option<bool>,
    pub has_location: Option<bool>,
    pub search: Option<String>,
    /// Category slugs.
    pub what: Vec<String>,
    pub venue: Option<String>,
    pub state: Option<String>,
    pub upcoming: Option<bool>,
    pub ongoing: Option<bool>,
    pub recent: Option<bool>,
    pub registered_user: bool,
    /// Requesting client; only keys cached pages.
    pub platform: Option<Platform>,
    pub created_after: Option<DateTime<Utc>>,
    pub updated_after: Option<DateTime<Utc>>,
    pub limit: Option<usize>,
}

impl EventFilterParams {
    pub fn with_when(&self, token: WhenToken) -> Self {
        Self {
            when: vec![token],
            ..self.clone()
        }
    }

    pub fn with_price(&self, tier: PriceTier) -> Self {
        Self {
            price: Some(tier),
            price_sections: None,
            ..self.clone()
        }
    }

    pub fn with_price_sections(&self, tier: PriceTier) -> Self {
        Self {
            price: None,
            price_sections: Some(tier),
            ..self.clone()
        }
    }

    pub fn with_category(&self, slug: &str) -> Self {
        Self {
            what: vec![slug.to_string()],
            ..self.clone()
        }
    }

    pub fn with_default_radius(&self, radius: RadiusToken) -> Self {
        Self {
            radius: self.radius.or(Some(radius)),
            ..self.clone()
        }
    }

    /// `when=past` given as the only when token.
    pub fn is_past_view(&self) -> bool { self.when == [WhenToken::Past] }

    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    pub fn city_slug(&self) -> Option<&str> {
        self.city.as_deref().filter(|slug| !slug.is_empty())
    }
}
