use crate::constants::*;
use crate::errors::{SimError, SimResult};
use nalgebra as na;

/// Geodetic position on the WGS84 ellipsoid. Angles in radians, altitude in metres.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Geodetic {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f64,
}

impl Geodetic {
    pub fn new(latitude: f64, longitude: f64, altitude: f64) -> Self {
        Self {
            latitude,
            longitude,
            altitude,
        }
    }

    pub fn latitude_deg(&self) -> f64 {
        self.latitude.to_degrees()
    }

    pub fn longitude_deg(&self) -> f64 {
        self.longitude.to_degrees()
    }
}

/// Rotation from the inertial frame to the Earth-fixed frame, `r_ecef = R(θ) r_eci`,
/// for Greenwich sidereal angle θ (rad).
pub fn eci_to_ecef_rotation(sidereal_angle: f64) -> na::Matrix3<f64> {
    let (s, c) = sidereal_angle.sin_cos();
    na::Matrix3::new(
        c, s, 0.0,
        -s, c, 0.0,
        0.0, 0.0, 1.0,
    )
}

const GEODETIC_MAX_ITERATIONS: usize = 20;
const GEODETIC_LATITUDE_TOLERANCE: f64 = 1e-12;

/// Convert ECEF Cartesian to Geodetic coordinates (WGS84)
///
/// Fails with [`SimError::GeodeticSingularity`] within [`GEODETIC_MIN_RADIUS`] of the
/// geocenter, or wherever the latitude iteration does not settle.
pub fn ecef_to_geodetic(pos: &na::Vector3<f64>) -> SimResult<Geodetic> {
    let radius = pos.magnitude();
    if !radius.is_finite() || radius < GEODETIC_MIN_RADIUS {
        return Err(SimError::GeodeticSingularity { radius });
    }

    let x = pos[0];
    let y = pos[1];
    let z = pos[2];

    let a = WGS84_A;
    let f = WGS84_F;
    let b = a * (1.0 - f); // Semi-minor axis
    let e2 = 2.0 * f - f * f; // First eccentricity squared

    let p = (x * x + y * y).sqrt();

    // On the polar axis longitude is arbitrary
    if p < 1e-10 {
        let latitude = if z < 0.0 { -PI / 2.0 } else { PI / 2.0 };
        return Ok(Geodetic::new(latitude, 0.0, z.abs() - b));
    }

    let longitude = y.atan2(x);

    // Initial guess
    let mut latitude = z.atan2(p * (1.0 - e2));

    let mut converged = false;
    for _ in 0..GEODETIC_MAX_ITERATIONS {
        let sin_lat = latitude.sin();
        let n = a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
        let h = p * latitude.cos() + z * sin_lat - a * a / n;

        let prev_lat = latitude;
        latitude = (z / p).atan2(1.0 - e2 * n / (n + h));

        if (latitude - prev_lat).abs() < GEODETIC_LATITUDE_TOLERANCE {
            converged = true;
            break;
        }
    }
    if !converged {
        return Err(SimError::GeodeticSingularity { radius });
    }

    let (sin_lat, cos_lat) = latitude.sin_cos();
    let n = a / (1.0 - e2 * sin_lat * sin_lat).sqrt();
    let altitude = p * cos_lat + z * sin_lat - a * a / n;

    Ok(Geodetic::new(latitude, longitude, altitude))
}

/// Convert Geodetic (WGS84) to ECEF Cartesian coordinates
pub fn geodetic_to_ecef(geodetic: &Geodetic) -> na::Vector3<f64> {
    let e2 = 2.0 * WGS84_F - WGS84_F * WGS84_F;
    let (sin_lat, cos_lat) = geodetic.latitude.sin_cos();
    let (sin_lon, cos_lon) = geodetic.longitude.sin_cos();
    let n = WGS84_A / (1.0 - e2 * sin_lat * sin_lat).sqrt();
    let h = geodetic.altitude;

    na::Vector3::new(
        (n + h) * cos_lat * cos_lon,
        (n + h) * cos_lat * sin_lon,
        (n * (1.0 - e2) + h) * sin_lat,
    )
}

/// Rotation from ECEF into the local East-North-Up triad.
pub fn ecef_to_enu_rotation(latitude: f64, longitude: f64) -> na::Matrix3<f64> {
    let (sin_lat, cos_lat) = latitude.sin_cos();
    let (sin_lon, cos_lon) = longitude.sin_cos();

    na::Matrix3::new(
        -sin_lon, cos_lon, 0.0,
        -sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat,
        cos_lat * cos_lon, cos_lat * sin_lon, sin_lat,
    )
}

/// Rotation from ECEF into the local North-East-Down triad.
pub fn ecef_to_ned_rotation(latitude: f64, longitude: f64) -> na::Matrix3<f64> {
    let (sin_lat, cos_lat) = latitude.sin_cos();
    let (sin_lon, cos_lon) = longitude.sin_cos();

    na::Matrix3::new(
        -sin_lat * cos_lon, -sin_lat * sin_lon, cos_lat,
        -sin_lon, cos_lon, 0.0,
        -cos_lat * cos_lon, -cos_lat * sin_lon, -sin_lat,
    )
}

/// (north, east, down) -> (east, north, up)
pub fn ned_to_enu(v: &na::Vector3<f64>) -> na::Vector3<f64> {
    na::Vector3::new(v[1], v[0], -v[2])
}

/// (east, north, up) -> (north, east, down)
pub fn enu_to_ned(v: &na::Vector3<f64>) -> na::Vector3<f64> {
    na::Vector3::new(v[1], v[0], -v[2])
}
