use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use utoipa::ToSchema;

use crate::{GeoPoint, PriceTier};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    #[default]
    Active,
    Inactive,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ToSchema,
)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    #[default]
    Public,
    Private,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct EventLocation {
    pub city_id: i64,
    pub venue_slug: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct Event {
    pub id: i64,
    #[builder(setter(into))]
    pub name: String,
    #[builder(default, setter(into))]
    pub description: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    #[builder(default)]
    pub status: EventStatus,
    #[builder(default)]
    pub visibility: Visibility,
    #[builder(default)]
    pub prices_available: Vec<PriceTier>,
    #[builder(default)]
    pub is_featured: bool,
    #[builder(default)]
    pub is_staff_picked: bool,
    #[builder(default)]
    pub has_location: bool,
    #[builder(default, setter(strip_option))]
    pub point: Option<GeoPoint>,
    #[builder(default)]
    pub category_slugs: Vec<String>,
    #[builder(default)]
    pub locations: Vec<EventLocation>,
    #[builder(default = Utc::now())]
    pub created_at: DateTime<Utc>,
    #[builder(default = Utc::now())]
    pub updated_at: DateTime<Utc>,
}

impl Event {
    pub fn is_tagged(&self, tier: PriceTier) -> bool {
        self.prices_available.contains(&tier)
    }

    pub fn is_located_in(&self, city_id: i64) -> bool {
        self.locations.iter().any(|loc| loc.city_id == city_id)
    }
}
