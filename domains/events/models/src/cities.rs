use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct GeoPoint {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoPoint {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Reference data; read-only from the point of view of the query core.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TypedBuilder)]
pub struct City {
    pub id: i64,
    #[builder(setter(into))]
    pub slug: String,
    #[builder(setter(into))]
    pub name: String,
    pub point: GeoPoint,
    #[builder(default)]
    pub is_curated: bool,
    #[builder(default = chrono_tz::America::New_York)]
    pub timezone: Tz,
    /// Named metro cluster the city belongs to, if any.
    #[builder(default, setter(strip_option, into))]
    pub cluster: Option<String>,
    #[builder(default, setter(strip_option, into))]
    pub state_slug: Option<String>,
    #[builder(default, setter(strip_option, into))]
    pub state_code: Option<String>,
}

impl City {
    pub fn in_cluster(&self, cluster: &str) -> bool {
        self.cluster.as_deref() == Some(cluster)
    }
}
