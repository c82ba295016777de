//! Filter construction for the event catalog.
//!
//! Every filter dimension is turned into a [`Predicate`] node. Nodes are
//! combined eagerly into one tree per request, which a store then compiles
//! once (to SQL, or to in-memory evaluation in tests).

pub mod builder;
pub mod calendar;
pub mod filter_set;
pub mod geo;
pub mod params;
pub mod predicate;
pub mod text;

use thiserror::Error;

pub use builder::{
    MIN_SEARCH_LENGTH, RadiusOrigin, build_curation_predicate,
    build_map_radius_predicate, build_price_predicate,
    build_radius_predicate, build_when_filter, is_searchable,
};
pub use calendar::{CityCalendar, Window};
pub use filter_set::{FilterContext, compose_filters};
pub use params::EventFilterParams;
pub use predicate::{Condition, FlagField, Predicate, TextMatch, TimeField};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("Required fields missing: {}", .0.join(", "))]
    RequiredFields(Vec<&'static str>),
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
}
