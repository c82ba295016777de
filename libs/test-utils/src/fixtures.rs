use chrono::{DateTime, Duration, Utc};
use chrono_tz::America::{Chicago, New_York};
use events_models::{
    BucketType, Category, City, Event, EventBucket, EventLocation, GeoPoint,
    PriceTier, WhenToken,
};

pub const TAMPA_BAY: &str = "tampa-bay-florida-united-states";
pub const ST_PETERSBURG: &str = "st-petersburg-florida-united-states";
pub const CLEARWATER: &str = "clearwater-florida-united-states";
pub const ORLANDO: &str = "orlando-florida-united-states";
pub const AUSTIN: &str = "austin-texas-united-states";
pub const TAMPA_CLUSTER: &str = "tampa-bay";

/// Curated anchor of the Tampa Bay cluster.
pub fn tampa_bay() -> City {
    City::builder()
        .id(1)
        .slug(TAMPA_BAY)
        .name("Tampa Bay")
        .point(GeoPoint::new(27.9506, -82.4572))
        .is_curated(true)
        .timezone(New_York)
        .cluster(TAMPA_CLUSTER)
        .state_slug("florida")
        .state_code("FL")
        .build()
}

pub fn st_petersburg() -> City {
    City::builder()
        .id(2)
        .slug(ST_PETERSBURG)
        .name("St. Petersburg")
        .point(GeoPoint::new(27.7676, -82.6403))
        .timezone(New_York)
        .cluster(TAMPA_CLUSTER)
        .state_slug("florida")
        .state_code("FL")
        .build()
}

pub fn clearwater() -> City {
    City::builder()
        .id(3)
        .slug(CLEARWATER)
        .name("Clearwater")
        .point(GeoPoint::new(27.9659, -82.8001))
        .timezone(New_York)
        .cluster(TAMPA_CLUSTER)
        .state_slug("florida")
        .state_code("FL")
        .build()
}

pub fn orlando() -> City {
    City::builder()
        .id(4)
        .slug(ORLANDO)
        .name("Orlando")
        .point(GeoPoint::new(28.5383, -81.3792))
        .is_curated(true)
        .timezone(New_York)
        .state_slug("florida")
        .state_code("FL")
        .build()
}

/// Uncurated, outside any cluster, hundreds of miles from curated cities.
pub fn austin() -> City {
    City::builder()
        .id(5)
        .slug(AUSTIN)
        .name("Austin")
        .point(GeoPoint::new(30.2672, -97.7431))
        .timezone(Chicago)
        .state_slug("texas")
        .state_code("TX")
        .build()
}

pub fn cities() -> Vec<City> {
    vec![tampa_bay(), st_petersburg(), clearwater(), orlando(), austin()]
}

pub fn categories() -> Vec<Category> {
    let category = |id: i64, slug: &str, name: &str| Category {
        id,
        slug: slug.to_string(),
        name: name.to_string(),
        level: 0,
        is_viewable: true,
    };
    vec![
        category(1, "music", "Music"),
        category(2, "food-drink", "Food & Drink"),
        category(3, "arts", "Arts"),
    ]
}

pub fn when_buckets() -> Vec<EventBucket> {
    WhenToken::ALL
        .iter()
        .enumerate()
        .map(|(i, token)| EventBucket {
            id: i as i64 + 1,
            bucket_type: BucketType::When,
            bucket: token.as_str().to_string(),
            name: token.label().to_string(),
            sort_order: i as i32,
            is_active: true,
        })
        .collect()
}

pub fn price_buckets() -> Vec<EventBucket> {
    PriceTier::ALL
        .iter()
        .enumerate()
        .map(|(i, tier)| EventBucket {
            id: i as i64 + 100,
            bucket_type: BucketType::Price,
            bucket: tier.as_str().to_string(),
            name: tier.label().to_string(),
            sort_order: i as i32,
            is_active: true,
        })
        .collect()
}

/// A two-hour public event located in `city`, free unless overridden.
pub fn event_in(id: i64, name: &str, city: &City, start: DateTime<Utc>) -> Event {
    Event::builder()
        .id(id)
        .name(name)
        .description(format!("{name} in {}", city.name))
        .start_date(start)
        .end_date(start + Duration::hours(2))
        .prices_available(vec![PriceTier::Free])
        .has_location(true)
        .point(city.point)
        .locations(vec![EventLocation {
            city_id: city.id,
            venue_slug: None,
        }])
        .created_at(start - Duration::days(30))
        .updated_at(start - Duration::days(30))
        .build()
}
