pub const MU_EARTH: f64 = 3.986004418e14; // Earth gravitational parameter (m³/s²)

pub const EARTH_ANGULAR_VELOCITY: f64 = 7.2921150e-5; // Earth's rotation rate (rad/s)
pub const WGS84_A: f64 = 6378137.0; // Semi-major axis [m]
pub const WGS84_F: f64 = 1.0 / 298.257223563; // Flattening

// Geomagnetic reference radius used by IGRF (m)
pub const IGRF_REFERENCE_RADIUS: f64 = 6_371_200.0;

// Positions closer than this to the geocenter have no meaningful geodetic coordinates
pub const GEODETIC_MIN_RADIUS: f64 = 50_000.0;

// Raw field samples are in nanotesla
pub const NANOTESLA_TO_TESLA: f64 = 1e-9;

pub const QUATERNION_NORM_TOLERANCE: f64 = 1e-6;

pub const SECONDS_PER_DAY: f64 = 86_400.0;
pub const MJD_J2000: f64 = 51_544.5;

// Math
pub const PI: f64 = std::f64::consts::PI;
pub const TWO_PI: f64 = 2.0 * std::f64::consts::PI;
