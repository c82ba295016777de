pub mod buckets;
pub mod categories;
pub mod cities;
pub mod events;
pub mod tokens;

pub use buckets::{BucketType, EventBucket};
pub use categories::Category;
pub use cities::{City, GeoPoint};
pub use events::{Event, EventLocation, EventStatus, Visibility};
pub use tokens::{
    PageType, Platform, PriceTier, RadiusToken, Tab, UnknownToken, WhenToken,
};
