use chrono::{DateTime, Utc};
use events_filters::{Condition, EventFilterParams, FlagField, Predicate};
use events_models::RadiusToken;

use crate::{DEFAULT_PAGE_SIZE, MAP_PAGE_SIZE, query::EventOrder};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    List,
    Map,
    Search,
    Count,
    Curated,
}

/// Static description of how an endpoint builds its result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EndpointPlan {
    pub default_radius: Option<RadiusToken>,
    /// Parameters that must be present, by wire name.
    pub required: &'static [&'static str],
    pub staff_picked_only: bool,
    pub page_size: u64,
}

impl Endpoint {
    pub fn plan(&self) -> EndpointPlan {
        match self {
            Endpoint::List | Endpoint::Count => EndpointPlan {
                default_radius: Some(RadiusToken::Mile100Plus),
                required: &[],
                staff_picked_only: false,
                page_size: DEFAULT_PAGE_SIZE,
            },
            Endpoint::Curated => EndpointPlan {
                default_radius: Some(RadiusToken::Mile100Plus),
                required: &[],
                staff_picked_only: true,
                page_size: DEFAULT_PAGE_SIZE,
            },
            Endpoint::Map => EndpointPlan {
                default_radius: None,
                required: &["city", "radius"],
                staff_picked_only: false,
                page_size: MAP_PAGE_SIZE,
            },
            Endpoint::Search => EndpointPlan {
                default_radius: Some(RadiusToken::Mile100Plus),
                required: &["search"],
                staff_picked_only: false,
                page_size: DEFAULT_PAGE_SIZE,
            },
        }
    }
}

impl EndpointPlan {
    /// Names from `required` that `params` does not carry.
    pub fn missing_fields(&self, params: &EventFilterParams) -> Vec<&'static str> {
        self.required
            .iter()
            .copied()
            .filter(|name| match *name {
                "city" => params.city_slug().is_none(),
                "radius" => params.radius.is_none(),
                "search" => params.search_term().is_none(),
                _ => false,
            })
            .collect()
    }

    /// Viewable events that have not ended, or every viewable event for
    /// past views. Category requests only see upcoming events.
    pub fn base_predicate(
        &self, params: &EventFilterParams, now: DateTime<Utc>,
    ) -> Predicate {
        let mut base = Predicate::from(Condition::Viewable);
        if !params.is_past_view() {
            base = base.and(Predicate::not_ended(now));
        }
        if !params.what.is_empty() {
            base = base.and(Predicate::upcoming(now));
        }
        if self.staff_picked_only {
            base = base.and(Predicate::flag(FlagField::StaffPicked, true));
        }
        base
    }

    pub fn order(&self, params: &EventFilterParams) -> EventOrder {
        if params.recent == Some(true) {
            EventOrder::CreatedDesc
        }
        else if params.is_past_view() {
            EventOrder::EndDesc
        }
        else {
            EventOrder::StartAsc
        }
    }
}
