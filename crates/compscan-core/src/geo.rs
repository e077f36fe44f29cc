use crate::models::Coordinate;

const EARTH_RADIUS_MILES: f64 = 3_958.8;

/// Great-circle distance between two coordinates, in miles, rounded to
/// two decimals.
#[must_use]
pub fn haversine_miles(from: Coordinate, to: Coordinate) -> f64 {
    let (lat1, lat2) = (from.lat.to_radians(), to.lat.to_radians());
    let d_lat = (to.lat - from.lat).to_radians();
    let d_lng = (to.lng - from.lng).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    let miles = 2.0 * EARTH_RADIUS_MILES * a.sqrt().atan2((1.0 - a).sqrt());
    (miles * 100.0).round() / 100.0
}
