//! Conversions between geographic and radar relative Cartesian coordinates.
use serde::{Deserialize, Serialize};

/// Angular velocity of the earth, rad/s.
pub const EARTH_ROTATION: f64 = 7.292e-5;

/// A latitude and longitude in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude, degrees north.
    pub lat: f64,
    /// Longitude, degrees east.
    pub lon: f64,
}

impl GeoPoint {
    /// Create a new point.
    pub fn new(lat: f64, lon: f64) -> Self {
        GeoPoint { lat, lon }
    }
}

/// Kilometers per degree of latitude and of longitude at latitude `lat` (degrees).
pub fn km_per_degree(lat: f64) -> (f64, f64) {
    let phi = lat.to_radians();

    let fac_lat = 111.13209 - 0.56605 * (2.0 * phi).cos() + 0.00012 * (4.0 * phi).cos()
        - 0.000002 * (6.0 * phi).cos();
    let fac_lon =
        111.41513 * phi.cos() - 0.09455 * (3.0 * phi).cos() + 0.00012 * (5.0 * phi).cos();

    (fac_lat, fac_lon)
}

/// Position of `point` east (x) and north (y) of `origin` in km.
pub fn relative_xy(origin: GeoPoint, point: GeoPoint) -> (f64, f64) {
    let (fac_lat, fac_lon) = km_per_degree(origin.lat);

    (
        (point.lon - origin.lon) * fac_lon,
        (point.lat - origin.lat) * fac_lat,
    )
}

/// The point `x` km east and `y` km north of `origin`.
pub fn adjusted_lat_lon(origin: GeoPoint, x: f64, y: f64) -> GeoPoint {
    let (fac_lat, fac_lon) = km_per_degree(origin.lat);

    GeoPoint {
        lat: origin.lat + y / fac_lat,
        lon: origin.lon + x / fac_lon,
    }
}

/// Coriolis parameter at latitude `lat` (degrees), 1/s.
pub fn coriolis_parameter(lat: f64) -> f64 {
    2.0 * EARTH_ROTATION * lat.to_radians().sin()
}

/// Wrap an angle in radians into `[0, 2π)`.
pub(crate) fn fix_angle(angle: f64) -> f64 {
    angle.rem_euclid(2.0 * std::f64::consts::PI)
}
