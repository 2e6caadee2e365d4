use crate::EARTH_RADIUS_M;
use crate::routing_common::GeoPoint;

/// Bearings of the corner walk, clockwise from north.
pub const CORNER_BEARINGS_DEG: [f64; 4] = [0.0, 90.0, 180.0, 270.0];

/// Point reached by travelling `distance_m` from `origin` along a great circle
/// starting at `bearing_deg`.
pub fn project_forward(origin: GeoPoint, bearing_deg: f64, distance_m: f64) -> GeoPoint {
    let lat_rad = origin.lat.to_radians();
    let lon_rad = origin.lon.to_radians();
    let bearing_rad = bearing_deg.to_radians();
    let angular_distance = distance_m / EARTH_RADIUS_M;

    let new_lat_rad = (lat_rad.sin() * angular_distance.cos()
        + lat_rad.cos() * angular_distance.sin() * bearing_rad.cos())
    .asin();
    let new_lon_rad = lon_rad
        + (bearing_rad.sin() * angular_distance.sin() * lat_rad.cos())
            .atan2(angular_distance.cos() - lat_rad.sin() * new_lat_rad.sin());

    GeoPoint::new(new_lon_rad.to_degrees(), new_lat_rad.to_degrees())
}

/// Corners of a roughly square walk starting at `center`.
///
/// Each leg starts where the previous one ended, and a corner is the position
/// *before* its leg. The first corner is therefore `center` itself, and the
/// fourth leg lands close to, but generally not exactly on, the start.
pub fn project_corners(center: GeoPoint, side_length_m: f64) -> [GeoPoint; 4] {
    let mut corners = [center; 4];
    let mut current = center;
    for (corner, bearing) in corners.iter_mut().zip(CORNER_BEARINGS_DEG) {
        *corner = current;
        current = project_forward(current, bearing, side_length_m);
    }
    corners
}
