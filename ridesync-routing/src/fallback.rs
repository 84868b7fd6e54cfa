use ridesync_core::Location;

/// Mean road distance over straight-line distance for the service area
pub const ROAD_CIRCUITY_FACTOR: f64 = 1.2;

const EARTH_RADIUS_KM: f64 = 6371.0;

/// Great-circle distance between two points, in km
pub fn haversine_km(from: &Location, to: &Location) -> f64 {
    let (lat1, lon1) = (from.lat.to_radians(), from.lng.to_radians());
    let (lat2, lon2) = (to.lat.to_radians(), to.lng.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let sin_dlat = (dlat * 0.5).sin();
    let sin_dlon = (dlon * 0.5).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

/// Local estimate used whenever the routing service is unreachable: the
/// great-circle distance scaled by the circuity factor, with a straight
/// two-point path
pub fn estimate_km(from: &Location, to: &Location) -> f64 {
    let km = haversine_km(from, to) * ROAD_CIRCUITY_FACTOR;
    (km * 100.0).round() / 100.0
}
