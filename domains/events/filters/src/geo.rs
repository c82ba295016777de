use events_models::GeoPoint;

/// Mile length used by every radius filter. Kept at the whole-metre value
/// the catalog has always used so stored bounds stay comparable.
pub const METERS_PER_MILE: f64 = 1609.0;

const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

pub fn miles_to_meters(miles: f64) -> f64 { miles * METERS_PER_MILE }

/// Great-circle distance in metres.
pub fn haversine_distance(a: GeoPoint, b: GeoPoint) -> f64 {
    let lat1_rad = a.latitude.to_radians();
    let lat2_rad = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lng = (b.longitude - a.longitude).to_radians();

    let h = (delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

pub fn within(a: GeoPoint, b: GeoPoint, meters: f64) -> bool {
    haversine_distance(a, b) <= meters
}

/// Planar centroid of two points, the same value a two-point multipoint
/// centroid yields in lon/lat space.
pub fn centroid(a: GeoPoint, b: GeoPoint) -> GeoPoint {
    GeoPoint::new(
        (a.latitude + b.latitude) / 2.0,
        (a.longitude + b.longitude) / 2.0,
    )
}
