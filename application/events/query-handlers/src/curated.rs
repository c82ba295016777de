use std::sync::Arc;

use events_errors::EventResult;
use events_filters::{Condition, FlagField, Predicate, geo::miles_to_meters};
use events_models::{City, RadiusToken};
use events_queries::CatalogReader;
use tracing::{debug, instrument};

/// Finds the curated cities whose promoted events an uncurated city may
/// show.
#[derive(Clone)]
pub struct CuratedResolver {
    catalog: Arc<dyn CatalogReader>,
    cluster: String,
    cluster_anchor: String,
}

impl CuratedResolver {
    pub fn new(
        catalog: Arc<dyn CatalogReader>, cluster: impl Into<String>,
        cluster_anchor: impl Into<String>,
    ) -> Self {
        Self {
            catalog,
            cluster: cluster.into(),
            cluster_anchor: cluster_anchor.into(),
        }
    }

    /// Curated cities within the radius's search bound, nearest first. A
    /// cluster member with none nearby gets the cluster anchor instead.
    #[instrument(skip(self, city), fields(city = %city.slug))]
    pub async fn resolve(
        &self, city: &City, radius: Option<RadiusToken>,
    ) -> EventResult<Vec<City>> {
        let Some(miles) = radius.and_then(|r| r.curated_search_miles())
        else {
            return Ok(Vec::new());
        };

        let candidates: Vec<City> = self
            .catalog
            .curated_cities_within(city.point, miles_to_meters(miles))
            .await?
            .into_iter()
            .map(|(city, _)| city)
            .collect();

        if candidates.is_empty() && city.in_cluster(&self.cluster) {
            debug!("No curated city nearby, using {}", self.cluster_anchor);
            let anchor = self.catalog.city_by_slug(&self.cluster_anchor).await?;
            return Ok(anchor.into_iter().collect());
        }

        Ok(candidates)
    }
}

/// Restriction on promoted events for an uncurated city: all of them go
/// without candidates, otherwise only the nearest candidate's stay.
pub fn curation_exclusion(candidates: &[City]) -> Predicate {
    let Some((_, others)) = candidates.split_first()
    else {
        return Predicate::flag(FlagField::Featured, false)
            .and(Predicate::flag(FlagField::StaffPicked, false));
    };
    if others.is_empty() {
        return Predicate::All;
    }

    let promoted = Predicate::flag(FlagField::Featured, true)
        .or(Predicate::flag(FlagField::StaffPicked, true));
    let elsewhere =
        Condition::LocatedInCities(others.iter().map(|c| c.id).collect());
    promoted.and(elsewhere.into()).negate()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use events_models::Event;
    use test_utils::*;

    use super::*;

    fn resolver() -> CuratedResolver {
        CuratedResolver::new(
            Arc::new(InMemoryStore::seeded()),
            TAMPA_CLUSTER,
            TAMPA_BAY,
        )
    }

    fn slugs(cities: &[City]) -> Vec<&str> {
        cities.iter().map(|c| c.slug.as_str()).collect()
    }

    #[tokio::test]
    async fn test_nearest_first_within_bound() {
        let all = resolver()
            .resolve(&st_petersburg(), Some(RadiusToken::Mile100Plus))
            .await
            .unwrap();
        assert_eq!(slugs(&all), vec![TAMPA_BAY, ORLANDO]);

        let near = resolver()
            .resolve(&st_petersburg(), Some(RadiusToken::Mile25))
            .await
            .unwrap();
        assert_eq!(slugs(&near), vec![TAMPA_BAY]);
    }

    #[tokio::test]
    async fn test_cluster_member_falls_back_to_anchor() {
        let found = resolver()
            .resolve(&clearwater(), Some(RadiusToken::Mile5))
            .await
            .unwrap();
        assert_eq!(slugs(&found), vec![TAMPA_BAY]);

        let outside = resolver()
            .resolve(&austin(), Some(RadiusToken::Mile25))
            .await
            .unwrap();
        assert!(outside.is_empty());
    }

    #[tokio::test]
    async fn test_tokens_without_search_bound() {
        let found = resolver()
            .resolve(&clearwater(), Some(RadiusToken::Mile200))
            .await
            .unwrap();
        assert!(found.is_empty());
        assert!(resolver().resolve(&clearwater(), None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_resolution_is_idempotent() {
        let resolver = resolver();
        let first = resolver
            .resolve(&austin(), Some(RadiusToken::Mile100Plus))
            .await
            .unwrap();
        let second = resolver
            .resolve(&austin(), Some(RadiusToken::Mile100Plus))
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(curation_exclusion(&first), curation_exclusion(&second));
    }

    #[test]
    fn test_exclusion_keeps_nearest_city_content() {
        let now = Utc::now();
        let promoted_in = |id, city: &City| Event {
            is_featured: true,
            ..event_in(id, "promo", city, now)
        };

        let none = curation_exclusion(&[]);
        assert!(!none.matches(&promoted_in(1, &tampa_bay())));
        assert!(none.matches(&event_in(2, "plain", &tampa_bay(), now)));

        assert_eq!(curation_exclusion(&[tampa_bay()]), Predicate::All);

        let pair = curation_exclusion(&[tampa_bay(), orlando()]);
        assert!(pair.matches(&promoted_in(3, &tampa_bay())));
        assert!(!pair.matches(&promoted_in(4, &orlando())));
        assert!(pair.matches(&event_in(5, "plain", &orlando(), now)));
    }
}
