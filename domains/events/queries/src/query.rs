use std::cmp::Ordering;

use events_filters::{Predicate, TextMatch};
use events_models::Event;

#[derive(Debug, Clone, PartialEq)]
pub enum EventOrder {
    StartAsc,
    StartDesc,
    EndDesc,
    CreatedDesc,
    /// Descending trigram similarity to the term.
    Similarity(String),
}

impl EventOrder {
    /// Ordering used by in-memory readers; ties fall back to id.
    pub fn compare(&self, a: &Event, b: &Event) -> Ordering {
        let primary = match self {
            EventOrder::StartAsc => a.start_date.cmp(&b.start_date),
            EventOrder::StartDesc => b.start_date.cmp(&a.start_date),
            EventOrder::EndDesc => b.end_date.cmp(&a.end_date),
            EventOrder::CreatedDesc => b.created_at.cmp(&a.created_at),
            EventOrder::Similarity(term) => TextMatch::similarity(term, b)
                .total_cmp(&TextMatch::similarity(term, a)),
        };
        primary.then(a.id.cmp(&b.id))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EventQuery {
    pub predicate: Predicate,
    pub order: EventOrder,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
}

impl EventQuery {
    pub fn new(predicate: Predicate, order: EventOrder) -> Self {
        Self {
            predicate,
            order,
            limit: None,
            offset: None,
        }
    }

    pub fn limit(mut self, limit: u64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: u64) -> Self {
        self.offset = Some(offset);
        self
    }
}
