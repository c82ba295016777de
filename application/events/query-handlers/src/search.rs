use std::sync::Arc;

use events_errors::EventResult;
use events_filters::{Predicate, TextMatch, is_searchable};
use events_queries::{EventOrder, EventReader};
use tracing::{debug, instrument};

/// Minimum trigram similarity for the fuzzy tier.
pub const SIMILARITY_THRESHOLD: f64 = 0.03;

/// Text matching strategies, tried in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchTier {
    /// English phrase over name and description, or a name prefix.
    Phrase,
    NamePrefix,
    Similar,
    Contains,
}

impl SearchTier {
    pub const ALL: [SearchTier; 4] = [
        SearchTier::Phrase,
        SearchTier::NamePrefix,
        SearchTier::Similar,
        SearchTier::Contains,
    ];

    pub fn predicate(&self, term: &str) -> Predicate {
        let term = term.to_string();
        Predicate::text(match self {
            SearchTier::Phrase => TextMatch::Phrase(term),
            SearchTier::NamePrefix => TextMatch::NamePrefix(term),
            SearchTier::Similar => TextMatch::Similar {
                term,
                threshold: SIMILARITY_THRESHOLD,
            },
            SearchTier::Contains => TextMatch::Contains(term),
        })
    }

    /// Only the fuzzy tier ranks its results.
    pub fn order(&self, term: &str, fallback: EventOrder) -> EventOrder {
        match self {
            SearchTier::Similar => EventOrder::Similarity(term.to_string()),
            _ => fallback,
        }
    }
}

/// Fallback chain over [`SearchTier`]: the first tier with any match in
/// the base set wins.
#[derive(Clone)]
pub struct TextSearch {
    events: Arc<dyn EventReader>,
}

impl TextSearch {
    pub fn new(events: Arc<dyn EventReader>) -> Self { Self { events } }

    #[instrument(skip(self, base))]
    pub async fn select_tier(
        &self, base: &Predicate, term: &str,
    ) -> EventResult<Option<SearchTier>> {
        if !is_searchable(term) {
            debug!("Search term too short");
            return Ok(None);
        }
        for tier in SearchTier::ALL {
            let candidate = base.clone().and(tier.predicate(term));
            if self.events.any_event(&candidate).await? {
                debug!("Search matched on {:?} tier", tier);
                return Ok(Some(tier));
            }
        }
        debug!("Search matched nothing");
        Ok(None)
    }

    /// `base` narrowed to the winning tier with that tier's ordering, or
    /// an empty set when no tier matches.
    pub async fn narrow(
        &self, base: Predicate, term: &str, fallback: EventOrder,
    ) -> EventResult<(Predicate, EventOrder)> {
        match self.select_tier(&base, term).await? {
            Some(tier) => Ok((base.and(tier.predicate(term)), tier.order(term, fallback))),
            None => Ok((Predicate::Nothing, fallback)),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use events_models::Event;
    use test_utils::*;

    use super::*;

    fn search_over(events: Vec<Event>) -> TextSearch {
        TextSearch::new(Arc::new(InMemoryStore::seeded().with_events(events)))
    }

    fn soon() -> chrono::DateTime<Utc> { Utc::now() + Duration::days(1) }

    #[tokio::test]
    async fn test_phrase_tier_wins_first() {
        let search = search_over(vec![event_in(1, "Jazz Brunch", &tampa_bay(), soon())]);
        let tier = search.select_tier(&Predicate::All, "jazz").await.unwrap();
        assert_eq!(tier, Some(SearchTier::Phrase));
    }

    #[tokio::test]
    async fn test_substring_in_description_is_last_resort() {
        let event = Event {
            description: "An evening with the Pajazzo orchestra downtown celebration festival"
                .to_string(),
            ..event_in(1, "Evening Orchestra", &tampa_bay(), soon())
        };
        let search = search_over(vec![event]);
        let tier = search.select_tier(&Predicate::All, "jaz").await.unwrap();
        assert_eq!(tier, Some(SearchTier::Contains));
    }

    #[tokio::test]
    async fn test_similarity_tier_ranks_results() {
        let search = search_over(vec![event_in(1, "Live Concerts", &tampa_bay(), soon())]);
        let (predicate, order) = search
            .narrow(Predicate::All, "concert", EventOrder::StartAsc)
            .await
            .unwrap();
        assert_ne!(predicate, Predicate::Nothing);
        assert_eq!(order, EventOrder::Similarity("concert".into()));
    }

    #[tokio::test]
    async fn test_short_or_unmatched_terms_yield_nothing() {
        let search = search_over(vec![event_in(1, "Jazz Brunch", &tampa_bay(), soon())]);
        let (short, _) = search
            .narrow(Predicate::All, "ja", EventOrder::StartAsc)
            .await
            .unwrap();
        assert_eq!(short, Predicate::Nothing);

        let (missing, _) = search
            .narrow(Predicate::All, "opera", EventOrder::StartAsc)
            .await
            .unwrap();
        assert_eq!(missing, Predicate::Nothing);
    }
}
