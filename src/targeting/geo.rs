use std::f64::consts::{PI, TAU};

use nalgebra::Vector3;
use serde::{Deserialize, Serialize};

/// Geodetic position on the planet surface, degrees.
/// South and west are negative. No range normalization is applied.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,  // deg
    pub longitude: f64, // deg
}

impl GeoCoordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        GeoCoordinate { latitude, longitude }
    }

    pub fn lat_rad(&self) -> f64 {
        self.latitude.to_radians()
    }

    pub fn lon_rad(&self) -> f64 {
        self.longitude.to_radians()
    }

    /// Same point with longitude wrapped into [-180, 180).
    pub fn wrapped(&self) -> Self {
        GeoCoordinate {
            latitude: self.latitude,
            longitude: wrap_longitude(self.longitude),
        }
    }

    /// Unit vector in a planet-fixed frame (x through lon 0, z north).
    pub fn unit_vector(&self) -> Vector3<f64> {
        let (sin_lat, cos_lat) = self.lat_rad().sin_cos();
        let (sin_lon, cos_lon) = self.lon_rad().sin_cos();
        Vector3::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat)
    }

    /// Great-circle angle to `other` (rad), vector form. Well conditioned
    /// at small separations, unlike the law of cosines.
    pub fn angle_to(&self, other: &GeoCoordinate) -> f64 {
        let a = self.unit_vector();
        let b = other.unit_vector();
        a.cross(&b).norm().atan2(a.dot(&b))
    }
}

/// Wrap a longitude in degrees into [-180, 180).
pub fn wrap_longitude(lon_deg: f64) -> f64 {
    (lon_deg + 180.0).rem_euclid(360.0) - 180.0
}

// ---------------------------------------------------------------------------
// Spherical triangle relations (all angles in radians)
// ---------------------------------------------------------------------------

/// Slack allowed on an arc-cosine argument before it counts as a domain error.
const ROUNDING_SLACK: f64 = 1e-12;

/// `acos` that absorbs rounding overshoot just past +/-1. Arguments further
/// out still return NaN.
pub fn acos_rounded(x: f64) -> f64 {
    if x.abs() > 1.0 && x.abs() <= 1.0 + ROUNDING_SLACK {
        x.signum().acos()
    } else {
        x.acos()
    }
}

/// Wrap an angle in radians into [-pi, pi).
pub fn wrap_angle(angle: f64) -> f64 {
    (angle + PI).rem_euclid(TAU) - PI
}

/// Central angle between two points, in [0, pi]. `dlon` is the longitude
/// difference.
///
/// The cosine is the spherical law of cosines; the sine is taken from the
/// same triangle so arcs near 0 or pi keep full precision.
pub fn central_angle(lat1: f64, lat2: f64, dlon: f64) -> f64 {
    let (sin1, cos1) = lat1.sin_cos();
    let (sin2, cos2) = lat2.sin_cos();
    let (sin_dlon, cos_dlon) = dlon.sin_cos();

    let cos_theta = sin1 * sin2 + cos1 * cos2 * cos_dlon;
    let east = cos2 * sin_dlon;
    let north = cos1 * sin2 - sin1 * cos2 * cos_dlon;
    east.hypot(north).atan2(cos_theta)
}

/// Argument of latitude of a point at `lat` crossed with heading `azimuth`
/// (measured from north through east). Relies on sin(i) > 0.
pub fn argument_of_latitude(lat: f64, azimuth: f64) -> f64 {
    lat.sin().atan2(lat.cos() * azimuth.cos())
}

/// Latitude reached at argument of latitude `arg_lat` on an orbit of
/// inclination `inc`.
pub fn latitude_on_orbit(inc: f64, arg_lat: f64) -> f64 {
    (inc.sin() * arg_lat.sin()).asin()
}

/// Longitude east of the ascending node at argument of latitude `arg_lat`.
pub fn longitude_from_node(inc: f64, arg_lat: f64) -> f64 {
    (inc.cos() * arg_lat.sin()).atan2(arg_lat.cos())
}
