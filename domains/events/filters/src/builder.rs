use chrono::NaiveDateTime;
use events_models::{GeoPoint, PriceTier, RadiusToken, WhenToken};

use crate::{
    FilterError,
    calendar::CityCalendar,
    geo::{self, miles_to_meters},
    predicate::{FlagField, Predicate, TimeField},
};

pub const MIN_SEARCH_LENGTH: usize = 3;

/// Divisor applied to the distance between a cluster city and its nearest
/// sibling when widening a radius around their centroid.
const CLUSTER_INFLATION_DIVISOR: f64 = 1.999;

/// One when token as a predicate in the given city's calendar.
pub fn when_token_predicate(calendar: &CityCalendar, token: WhenToken) -> Predicate {
    let now = calendar.now();
    match token {
        WhenToken::Now => Predicate::ongoing(now),
        WhenToken::Today => Predicate::starts_within(calendar.today()),
        WhenToken::Tomorrow => Predicate::starts_within(calendar.tomorrow()),
        WhenToken::ThisWeek => Predicate::starts_within(calendar.this_week()),
        WhenToken::Weekend => Predicate::starts_within(calendar.weekend()),
        WhenToken::NextWeek => Predicate::starts_within(calendar.next_week()),
        WhenToken::NextWeekend => {
            Predicate::starts_within(calendar.next_weekend())
        }
        WhenToken::HappeningLater => Predicate::time(
            TimeField::Start,
            Some(calendar.next_weekend().end),
            None,
        ),
        WhenToken::Past => Predicate::time(TimeField::End, None, Some(now)),
    }
}

/// Explicit `since`/`until` bounds on the start date, in local time.
/// `None` when neither bound was given.
pub fn since_until_predicate(
    calendar: &CityCalendar, since: Option<NaiveDateTime>,
    until: Option<NaiveDateTime>,
) -> Option<Predicate> {
    if since.is_none() && until.is_none() {
        return None;
    }
    Some(Predicate::time(
        TimeField::Start,
        since.map(|s| calendar.since(s)),
        until.map(|u| calendar.until(u)),
    ))
}

/// OR of every token window, plus the explicit since/until range.
pub fn build_when_filter(
    calendar: &CityCalendar, tokens: &[WhenToken], since: Option<NaiveDateTime>,
    until: Option<NaiveDateTime>,
) -> Predicate {
    let mut parts: Vec<Predicate> = tokens
        .iter()
        .map(|token| when_token_predicate(calendar, *token))
        .collect();
    if let Some(range) = since_until_predicate(calendar, since, until) {
        parts.push(range);
    }
    if parts.is_empty() {
        return Predicate::All;
    }
    Predicate::any_of(parts)
}

/// Events tagged with `tier`. In `strict` mode events also tagged with any
/// cheaper tier are excluded, which makes the six tiers disjoint.
pub fn build_price_predicate(tier: PriceTier, strict: bool) -> Predicate {
    let tagged = Predicate::price_tagged(tier);
    if !strict {
        return tagged;
    }
    let cheaper = Predicate::any_of(tier.below().map(Predicate::price_tagged));
    tagged.and(cheaper.negate())
}

/// Where a radius filter is centred.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RadiusOrigin {
    /// Neither a city nor coordinates were requested.
    Unspecified,
    /// A city was requested but neither it nor coordinates could be used.
    Unresolvable,
    Point(GeoPoint),
    /// A cluster city together with its nearest cluster sibling.
    Cluster { city: GeoPoint, sibling: GeoPoint },
}

impl RadiusOrigin {
    /// Centre and extra metres for this origin.
    pub fn centre(&self) -> Option<(GeoPoint, f64)> {
        match self {
            RadiusOrigin::Unspecified | RadiusOrigin::Unresolvable => None,
            RadiusOrigin::Point(point) => Some((*point, 0.0)),
            RadiusOrigin::Cluster { city, sibling } => {
                let extra = geo::haversine_distance(*city, *sibling)
                    / CLUSTER_INFLATION_DIVISOR;
                Some((geo::centroid(*city, *sibling), extra))
            }
        }
    }
}

pub fn build_radius_predicate(
    origin: &RadiusOrigin, token: RadiusToken, alias_hundred_plus: bool,
) -> Predicate {
    let Some(miles) = token.filter_miles(alias_hundred_plus) else {
        return Predicate::All;
    };
    if *origin == RadiusOrigin::Unspecified {
        return Predicate::All;
    }
    match origin.centre() {
        Some((centre, extra)) => {
            Predicate::within(centre, miles_to_meters(miles) + extra)
        }
        None => Predicate::Nothing,
    }
}

pub fn build_map_radius_predicate(
    latitude: Option<f64>, longitude: Option<f64>, miles: f64,
) -> Result<Predicate, FilterError> {
    match (latitude, longitude) {
        (Some(latitude), Some(longitude)) => Ok(Predicate::within(
            GeoPoint::new(latitude, longitude),
            miles_to_meters(miles),
        )),
        (latitude, longitude) => {
            let mut missing = Vec::new();
            if latitude.is_none() {
                missing.push("latitude");
            }
            if longitude.is_none() {
                missing.push("longitude");
            }
            Err(FilterError::RequiredFields(missing))
        }
    }
}

pub fn build_curation_predicate(
    is_curated: Option<bool>, has_location: Option<bool>,
) -> Predicate {
    match is_curated {
        Some(false) => return Predicate::flag(FlagField::StaffPicked, false),
        Some(true) => {
            let promoted = Predicate::flag(FlagField::StaffPicked, true)
                .or(Predicate::flag(FlagField::Featured, true));
            return promoted.and(Predicate::flag(FlagField::HasLocation, true));
        }
        None => {}
    }
    match has_location {
        Some(true) => Predicate::flag(FlagField::HasLocation, true),
        _ => Predicate::All,
    }
}

pub fn is_searchable(term: &str) -> bool {
    term.chars().count() >= MIN_SEARCH_LENGTH
}
