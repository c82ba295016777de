use chrono::{DateTime, Utc};
use events_models::{Event, EventStatus, GeoPoint, PriceTier, Visibility};

use crate::{calendar::Window, geo, text};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeField {
    Start,
    End,
    Created,
    Updated,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagField {
    Featured,
    StaffPicked,
    HasLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TextMatch {
    /// Phrase over name and description, or a name prefix.
    Phrase(String),
    NamePrefix(String),
    /// Best of name/description trigram similarity above `threshold`.
    Similar { term: String, threshold: f64 },
    Contains(String),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Both bounds inclusive; a missing bound is open.
    TimeRange {
        field: TimeField,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    },
    Flag { field: FlagField, value: bool },
    /// Active and public.
    Viewable,
    PriceTagged(PriceTier),
    WithinDistance { origin: GeoPoint, meters: f64 },
    InCategories(Vec<String>),
    LocatedInCities(Vec<i64>),
    AtVenue(String),
    HasAnyLocation,
    Text(TextMatch),
}

/// Boolean expression over events.
///
/// The combinators fold constants away, so `All`/`Nothing` only survive
/// at the root of a tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    All,
    Nothing,
    Leaf(Condition),
    Not(Box<Predicate>),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Default for Predicate {
    fn default() -> Self { Predicate::All }
}

impl From<Condition> for Predicate {
    fn from(condition: Condition) -> Self { Predicate::Leaf(condition) }
}

impl Predicate {
    pub fn all_of<I>(parts: I) -> Predicate
    where
        I: IntoIterator<Item = Predicate>,
    {
        let mut flat = Vec::new();
        for part in parts {
            match part {
                Predicate::All => {}
                Predicate::Nothing => return Predicate::Nothing,
                Predicate::And(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Predicate::All,
            1 => flat.remove(0),
            _ => Predicate::And(flat),
        }
    }

    pub fn any_of<I>(parts: I) -> Predicate
    where
        I: IntoIterator<Item = Predicate>,
    {
        let mut flat = Vec::new();
        for part in parts {
            match part {
                Predicate::Nothing => {}
                Predicate::All => return Predicate::All,
                Predicate::Or(inner) => flat.extend(inner),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => Predicate::Nothing,
            1 => flat.remove(0),
            _ => Predicate::Or(flat),
        }
    }

    pub fn and(self, other: Predicate) -> Predicate {
        Predicate::all_of([self, other])
    }

    pub fn or(self, other: Predicate) -> Predicate {
        Predicate::any_of([self, other])
    }

    pub fn negate(self) -> Predicate {
        match self {
            Predicate::All => Predicate::Nothing,
            Predicate::Nothing => Predicate::All,
            Predicate::Not(inner) => *inner,
            other => Predicate::Not(Box::new(other)),
        }
    }

    pub fn is_all(&self) -> bool { matches!(self, Predicate::All) }

    pub fn is_nothing(&self) -> bool { matches!(self, Predicate::Nothing) }

    pub fn time(
        field: TimeField, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>,
    ) -> Predicate {
        Condition::TimeRange { field, from, to }.into()
    }

    pub fn starts_within(window: Window) -> Predicate {
        Predicate::time(TimeField::Start, Some(window.start), Some(window.end))
    }

    pub fn flag(field: FlagField, value: bool) -> Predicate {
        Condition::Flag { field, value }.into()
    }

    pub fn price_tagged(tier: PriceTier) -> Predicate {
        Condition::PriceTagged(tier).into()
    }

    pub fn within(origin: GeoPoint, meters: f64) -> Predicate {
        Condition::WithinDistance { origin, meters }.into()
    }

    pub fn text(matcher: TextMatch) -> Predicate {
        Condition::Text(matcher).into()
    }

    /// Events running at `now`: started and not yet finished.
    pub fn ongoing(now: DateTime<Utc>) -> Predicate {
        Predicate::all_of([
            Predicate::time(TimeField::Start, None, Some(now)),
            Predicate::time(TimeField::End, Some(now), None),
        ])
    }

    pub fn upcoming(now: DateTime<Utc>) -> Predicate {
        Predicate::time(TimeField::Start, Some(now), None)
    }

    pub fn not_ended(now: DateTime<Utc>) -> Predicate {
        Predicate::time(TimeField::End, Some(now), None)
    }

    pub fn matches(&self, event: &Event) -> bool {
        match self {
            Predicate::All => true,
            Predicate::Nothing => false,
            Predicate::Leaf(condition) => condition.matches(event),
            Predicate::Not(inner) => !inner.matches(event),
            Predicate::And(parts) => parts.iter().all(|p| p.matches(event)),
            Predicate::Or(parts) => parts.iter().any(|p| p.matches(event)),
        }
    }
}

impl TimeField {
    pub fn of(&self, event: &Event) -> DateTime<Utc> {
        match self {
            TimeField::Start => event.start_date,
            TimeField::End => event.end_date,
            TimeField::Created => event.created_at,
            TimeField::Updated => event.updated_at,
        }
    }
}

impl TextMatch {
    pub fn similarity(term: &str, event: &Event) -> f64 {
        text::trigram_similarity(&event.name, term)
            .max(text::trigram_similarity(&event.description, term))
    }

    pub fn matches(&self, event: &Event) -> bool {
        match self {
            TextMatch::Phrase(term) => {
                text::phrase_matches(
                    &format!("{} {}", event.name, event.description),
                    term,
                ) || text::starts_with_ignore_case(&event.name, term)
            }
            TextMatch::NamePrefix(term) => {
                text::starts_with_ignore_case(&event.name, term)
            }
            TextMatch::Similar { term, threshold } => {
                TextMatch::similarity(term, event) > *threshold
            }
            TextMatch::Contains(term) => {
                text::contains_ignore_case(&event.name, term)
                    || text::contains_ignore_case(&event.description, term)
            }
        }
    }
}

impl Condition {
    pub fn matches(&self, event: &Event) -> bool {
        match self {
            Condition::TimeRange { field, from, to } => {
                let value = field.of(event);
                from.is_none_or(|from| value >= from)
                    && to.is_none_or(|to| value <= to)
            }
            Condition::Flag { field, value } => {
                let actual = match field {
                    FlagField::Featured => event.is_featured,
                    FlagField::StaffPicked => event.is_staff_picked,
                    FlagField::HasLocation => event.has_location,
                };
                actual == *value
            }
            Condition::Viewable => {
                event.status == EventStatus::Active
                    && event.visibility == Visibility::Public
            }
            Condition::PriceTagged(tier) => event.is_tagged(*tier),
            Condition::WithinDistance { origin, meters } => event
                .point
                .is_some_and(|point| geo::within(*origin, point, *meters)),
            Condition::InCategories(slugs) => {
                event.category_slugs.iter().any(|slug| slugs.contains(slug))
            }
            Condition::LocatedInCities(ids) => {
                ids.iter().any(|id| event.is_located_in(*id))
            }
            Condition::AtVenue(venue) => event
                .locations
                .iter()
                .any(|loc| loc.venue_slug.as_deref() == Some(venue.as_str())),
            Condition::HasAnyLocation => !event.locations.is_empty(),
            Condition::Text(matcher) => matcher.matches(event),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use events_models::EventLocation;

    use super::*;

    fn event() -> Event {
        Event::builder()
            .id(1)
            .name("Jazz on the Bay")
            .description("An evening of live music")
            .start_date(Utc.with_ymd_and_hms(2024, 5, 17, 22, 0, 0).unwrap())
            .end_date(Utc.with_ymd_and_hms(2024, 5, 18, 2, 0, 0).unwrap())
            .prices_available(vec![PriceTier::Free])
            .locations(vec![EventLocation {
                city_id: 7,
                venue_slug: Some("the-pier".to_string()),
            }])
            .build()
    }

    #[test]
    fn test_combinators_fold_constants() {
        let leaf = Predicate::price_tagged(PriceTier::Free);
        assert_eq!(leaf.clone().and(Predicate::All), leaf);
        assert_eq!(leaf.clone().and(Predicate::Nothing), Predicate::Nothing);
        assert_eq!(leaf.clone().or(Predicate::Nothing), leaf);
        assert_eq!(leaf.clone().or(Predicate::All), Predicate::All);
        assert_eq!(Predicate::all_of(Vec::new()), Predicate::All);
        assert_eq!(Predicate::any_of(Vec::new()), Predicate::Nothing);
        assert_eq!(leaf.clone().negate().negate(), leaf);
    }

    #[test]
    fn test_nested_groups_are_flattened() {
        let a = Predicate::flag(FlagField::Featured, true);
        let b = Predicate::flag(FlagField::StaffPicked, true);
        let c = Predicate::flag(FlagField::HasLocation, true);
        let combined = a.clone().and(b.clone()).and(c.clone());
        assert_eq!(combined, Predicate::And(vec![a, b, c]));
    }

    #[test]
    fn test_time_range_is_inclusive() {
        let e = event();
        let exact = Predicate::time(TimeField::Start, Some(e.start_date), Some(e.start_date));
        assert!(exact.matches(&e));
        let after = Predicate::upcoming(e.start_date + chrono::Duration::seconds(1));
        assert!(!after.matches(&e));
    }

    #[test]
    fn test_location_conditions() {
        let e = event();
        assert!(Predicate::from(Condition::LocatedInCities(vec![3, 7])).matches(&e));
        assert!(Predicate::from(Condition::AtVenue("the-pier".into())).matches(&e));
        assert!(Predicate::from(Condition::HasAnyLocation).matches(&e));
        // No point recorded, so no distance can be satisfied.
        assert!(!Predicate::within(GeoPoint::new(0.0, 0.0), 1e9).matches(&e));
    }

    #[test]
    fn test_ongoing() {
        let e = event();
        let during = Utc.with_ymd_and_hms(2024, 5, 18, 0, 0, 0).unwrap();
        let after = Utc.with_ymd_and_hms(2024, 5, 18, 3, 0, 0).unwrap();
        assert!(Predicate::ongoing(during).matches(&e));
        assert!(!Predicate::ongoing(after).matches(&e));
    }

    #[test]
    fn test_text_matchers() {
        let e = event();
        assert!(Predicate::text(TextMatch::Phrase("live music".into())).matches(&e));
        assert!(Predicate::text(TextMatch::NamePrefix("JAZ".into())).matches(&e));
        assert!(!Predicate::text(TextMatch::NamePrefix("bay".into())).matches(&e));
        assert!(Predicate::text(TextMatch::Contains("EVENING".into())).matches(&e));
        assert!(
            Predicate::text(TextMatch::Similar { term: "jazz".into(), threshold: 0.03 })
                .matches(&e)
        );
    }
}
