use std::str::FromStr;

use chrono_tz::Tz;
use events_models::{
    BucketType, Category, City, Event, EventBucket, EventLocation, EventStatus,
    GeoPoint, PriceTier, Visibility,
};
use tokio_postgres::Row;
use tracing::warn;

pub const EVENT_COLUMNS: &str = "e.id, e.name, e.description, e.start_date, \
     e.end_date, e.status, e.visibility, e.prices_available, e.is_featured, \
     e.is_staff_picked, e.has_location, ST_Y(e.point::geometry), \
     ST_X(e.point::geometry), e.created_at, e.updated_at, \
     ARRAY(SELECT c.slug FROM event_categories ec \
           JOIN categories c ON c.id = ec.category_id \
           WHERE ec.event_id = e.id ORDER BY c.slug), \
     ARRAY(SELECT el.city_id FROM event_locations el \
           WHERE el.event_id = e.id ORDER BY el.id), \
     ARRAY(SELECT el.venue_slug FROM event_locations el \
           WHERE el.event_id = e.id ORDER BY el.id)";

pub const CITY_COLUMNS: &str = "c.id, c.slug, c.name, ST_Y(c.point::geometry), \
     ST_X(c.point::geometry), c.is_curated, c.timezone, c.cluster, \
     c.state_slug, c.state_code";

pub const CATEGORY_COLUMNS: &str = "c.id, c.slug, c.name, c.level, c.is_viewable";

pub fn event_from_row(row: &Row) -> Event {
    let latitude: Option<f64> = row.get(11);
    let longitude: Option<f64> = row.get(12);
    let prices: Vec<String> = row.get(7);
    let city_ids: Vec<i64> = row.get(16);
    let venues: Vec<Option<String>> = row.get(17);

    Event {
        id: row.get(0),
        name: row.get(1),
        description: row.get(2),
        start_date: row.get(3),
        end_date: row.get(4),
        status: match row.get::<_, &str>(5) {
            "active" => EventStatus::Active,
            _ => EventStatus::Inactive,
        },
        visibility: match row.get::<_, &str>(6) {
            "public" => Visibility::Public,
            _ => Visibility::Private,
        },
        prices_available: prices
            .iter()
            .filter_map(|p| PriceTier::from_str(p).ok())
            .collect(),
        is_featured: row.get(8),
        is_staff_picked: row.get(9),
        has_location: row.get(10),
        point: latitude.zip(longitude).map(|(lat, lon)| GeoPoint::new(lat, lon)),
        created_at: row.get(13),
        updated_at: row.get(14),
        category_slugs: row.get(15),
        locations: city_ids
            .into_iter()
            .zip(venues)
            .map(|(city_id, venue_slug)| EventLocation {
                city_id,
                venue_slug,
            })
            .collect(),
    }
}

pub fn city_from_row(row: &Row) -> City {
    let timezone: String = row.get(6);
    City {
        id: row.get(0),
        slug: row.get(1),
        name: row.get(2),
        point: GeoPoint::new(row.get(3), row.get(4)),
        is_curated: row.get(5),
        timezone: Tz::from_str(&timezone).unwrap_or_else(|_| {
            warn!("Unknown timezone {} for city {}", timezone, row.get::<_, String>(1));
            Tz::UTC
        }),
        cluster: row.get(7),
        state_slug: row.get(8),
        state_code: row.get(9),
    }
}

pub fn category_from_row(row: &Row) -> Category {
    Category {
        id: row.get(0),
        slug: row.get(1),
        name: row.get(2),
        level: row.get(3),
        is_viewable: row.get(4),
    }
}

pub fn bucket_from_row(row: &Row, bucket_type: BucketType) -> EventBucket {
    EventBucket {
        id: row.get(0),
        bucket_type,
        bucket: row.get(1),
        name: row.get(2),
        sort_order: row.get(3),
        is_active: row.get(4),
    }
}
