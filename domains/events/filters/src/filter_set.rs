use chrono::{DateTime, Utc};

use crate::{
    FilterError,
    builder::{
        RadiusOrigin, build_curation_predicate, build_map_radius_predicate,
        build_price_predicate, build_radius_predicate, build_when_filter,
        since_until_predicate,
    },
    calendar::CityCalendar,
    params::EventFilterParams,
    predicate::{Condition, FlagField, Predicate, TimeField},
};

/// Catalog facts a request's filters depend on, looked up ahead of time so
/// that composing the filters stays pure.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterContext {
    pub now: DateTime<Utc>,
    /// Calendar of the requested city, or of the fallback city when none
    /// was requested. `None` when the requested slug is unknown.
    pub when_calendar: Option<CityCalendar>,
    /// Calendar of an explicitly requested, known city.
    pub request_calendar: Option<CityCalendar>,
    pub radius_origin: RadiusOrigin,
    /// Ids of the cities in the requested state.
    pub state_city_ids: Option<Vec<i64>>,
    pub alias_hundred_plus: bool,
}

impl FilterContext {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            now,
            when_calendar: None,
            request_calendar: None,
            radius_origin: RadiusOrigin::Unspecified,
            state_city_ids: None,
            alias_hundred_plus: true,
        }
    }
}

/// AND of every filter dimension present in `params`. Search is left to
/// the caller since its matching strategy depends on the result set.
pub fn compose_filters(
    params: &EventFilterParams, ctx: &FilterContext,
) -> Result<Predicate, FilterError> {
    let mut parts = Vec::new();

    if !params.when.is_empty() {
        if let Some(calendar) = &ctx.when_calendar {
            parts.push(build_when_filter(
                calendar,
                &params.when,
                params.since,
                params.until,
            ));
        }
    }
    else if let Some(calendar) = &ctx.request_calendar {
        if let Some(range) =
            since_until_predicate(calendar, params.since, params.until)
        {
            parts.push(range);
        }
    }

    if let (Some(date), Some(calendar)) = (params.date, &ctx.when_calendar) {
        parts.push(Predicate::starts_within(calendar.day(date)));
    }

    if let Some(tier) = params.price {
        parts.push(build_price_predicate(tier, false));
    }
    if let Some(tier) = params.price_sections {
        parts.push(build_price_predicate(tier, true));
    }

    if let Some(token) = params.radius {
        parts.push(build_radius_predicate(
            &ctx.radius_origin,
            token,
            ctx.alias_hundred_plus,
        ));
    }
    if let Some(miles) = params.map_radius {
        parts.push(build_map_radius_predicate(
            params.latitude,
            params.longitude,
            miles,
        )?);
    }

    if let Some(featured) = params.is_featured {
        parts.push(Predicate::flag(FlagField::Featured, featured));
    }
    parts.push(build_curation_predicate(params.is_curated, params.has_location));

    if !params.what.is_empty() {
        parts.push(Condition::InCategories(params.what.clone()).into());
    }
    if let Some(venue) = &params.venue {
        parts.push(Condition::AtVenue(venue.clone()).into());
    }
    if params.state.is_some() {
        let ids = ctx.state_city_ids.clone().unwrap_or_default();
        parts.push(Condition::LocatedInCities(ids).into());
    }
    if params.upcoming == Some(true) {
        parts.push(Predicate::upcoming(ctx.now));
    }
    if params.ongoing == Some(false) {
        parts.push(Predicate::ongoing(ctx.now).negate());
    }
    if let Some(after) = params.created_after {
        parts.push(Predicate::time(TimeField::Created, Some(after), None));
    }
    if let Some(after) = params.updated_after {
        parts.push(Predicate::time(TimeField::Updated, Some(after), None));
    }

    Ok(Predicate::all_of(parts))
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use chrono_tz::America::New_York;
    use events_models::{Event, EventLocation, GeoPoint, PriceTier, RadiusToken, WhenToken};

    use super::*;

    fn now() -> DateTime<Utc> {
        New_York
            .with_ymd_and_hms(2024, 5, 15, 12, 0, 0)
            .single()
            .unwrap()
            .with_timezone(&Utc)
    }

    fn ctx_with_city() -> FilterContext {
        let calendar = CityCalendar::new(New_York, now());
        FilterContext {
            when_calendar: Some(calendar),
            request_calendar: Some(calendar),
            ..FilterContext::new(now())
        }
    }

    fn event(start: DateTime<Utc>) -> Event {
        Event::builder()
            .id(1)
            .name("event")
            .start_date(start)
            .end_date(start + Duration::hours(3))
            .build()
    }

    #[test]
    fn test_empty_params_match_everything() {
        let predicate =
            compose_filters(&EventFilterParams::default(), &FilterContext::new(now()))
                .unwrap();
        assert_eq!(predicate, Predicate::All);
    }

    #[test]
    fn test_unknown_city_skips_time_filters() {
        let params = EventFilterParams {
            city: Some("nowhere".into()),
            when: vec![WhenToken::Today],
            ..Default::default()
        };
        let predicate = compose_filters(&params, &FilterContext::new(now())).unwrap();
        assert_eq!(predicate, Predicate::All);
    }

    #[test]
    fn test_since_until_needs_request_city() {
        let params = EventFilterParams {
            since: Some(now().naive_utc()),
            ..Default::default()
        };
        let fallback_only = FilterContext {
            when_calendar: Some(CityCalendar::new(New_York, now())),
            ..FilterContext::new(now())
        };
        assert_eq!(compose_filters(&params, &fallback_only).unwrap(), Predicate::All);
        assert_ne!(compose_filters(&params, &ctx_with_city()).unwrap(), Predicate::All);
    }

    #[test]
    fn test_dimensions_are_and_combined() {
        let params = EventFilterParams {
            when: vec![WhenToken::Today],
            price: Some(PriceTier::Free),
            ..Default::default()
        };
        let predicate = compose_filters(&params, &ctx_with_city()).unwrap();

        let free_today = Event {
            prices_available: vec![PriceTier::Free],
            ..event(now() + Duration::hours(2))
        };
        let paid_today = Event {
            prices_available: vec![PriceTier::Price25],
            ..event(now() + Duration::hours(2))
        };
        let free_later = Event {
            prices_available: vec![PriceTier::Free],
            ..event(now() + Duration::days(3))
        };
        assert!(predicate.matches(&free_today));
        assert!(!predicate.matches(&paid_today));
        assert!(!predicate.matches(&free_later));
    }

    #[test]
    fn test_unresolvable_radius_forces_empty() {
        let params = EventFilterParams {
            city: Some("nowhere".into()),
            radius: Some(RadiusToken::Mile25),
            ..Default::default()
        };
        let ctx = FilterContext {
            radius_origin: RadiusOrigin::Unresolvable,
            ..FilterContext::new(now())
        };
        assert_eq!(compose_filters(&params, &ctx).unwrap(), Predicate::Nothing);

        let with_point = FilterContext {
            radius_origin: RadiusOrigin::Point(GeoPoint::new(27.9, -82.4)),
            ..FilterContext::new(now())
        };
        assert!(matches!(
            compose_filters(&params, &with_point).unwrap(),
            Predicate::Leaf(Condition::WithinDistance { .. })
        ));
    }

    #[test]
    fn test_map_radius_error_propagates() {
        let params = EventFilterParams {
            map_radius: Some(10.0),
            longitude: Some(-82.4),
            ..Default::default()
        };
        assert_eq!(
            compose_filters(&params, &FilterContext::new(now())),
            Err(FilterError::RequiredFields(vec!["latitude"]))
        );
    }

    #[test]
    fn test_state_and_ongoing() {
        let params = EventFilterParams {
            state: Some("florida".into()),
            ongoing: Some(false),
            ..Default::default()
        };
        let ctx = FilterContext {
            state_city_ids: Some(vec![1, 2]),
            ..FilterContext::new(now())
        };
        let predicate = compose_filters(&params, &ctx).unwrap();

        let located = |start| Event {
            locations: vec![EventLocation { city_id: 2, venue_slug: None }],
            ..event(start)
        };
        assert!(predicate.matches(&located(now() + Duration::hours(1))));
        assert!(!predicate.matches(&located(now() - Duration::hours(1))));
        assert!(!predicate.matches(&event(now() + Duration::hours(1))));

        let unknown_state = FilterContext::new(now());
        assert_eq!(
            compose_filters(&params, &unknown_state).map(|p| p.matches(&located(now() + Duration::hours(1)))),
            Ok(false)
        );
    }
}
