use crate::constants::{IGRF_REFERENCE_RADIUS, MJD_J2000};
use crate::coordinates::coordinate_transformation::{ecef_to_ned_rotation, geodetic_to_ecef, Geodetic};
use crate::errors::{SimError, SimResult};
use hifitime::Epoch;
use nalgebra as na;
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Bounds outside of which a field model refuses to answer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldModelValidity {
    pub min_altitude: f64,
    pub max_altitude: f64,
    pub min_year: f64,
    pub max_year: f64,
}

impl FieldModelValidity {
    pub fn check(&self, geodetic: &Geodetic, year: f64) -> SimResult<()> {
        check_range("altitude", geodetic.altitude, self.min_altitude, self.max_altitude)?;
        check_range("decimal year", year, self.min_year, self.max_year)
    }
}

fn check_range(what: &'static str, value: f64, min: f64, max: f64) -> SimResult<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(SimError::FieldModelOutOfRange {
            what,
            value,
            min,
            max,
        })
    }
}

/// Geomagnetic field source queried once per simulation step.
pub trait MagneticFieldModel: Send + Sync {
    fn validity(&self) -> FieldModelValidity;

    /// Field at `geodetic` in the local North-East-Down frame (nT).
    fn field_ned(&self, geodetic: &Geodetic, epoch: Epoch) -> SimResult<na::Vector3<f64>>;
}

pub fn decimal_year(epoch: Epoch) -> f64 {
    2000.0 + (epoch.to_mjd_utc_days() - MJD_J2000) / 365.25
}

/// Degree-1 (tilted dipole) geomagnetic field from the IGRF-13 main field and
/// secular variation, referenced to 2020.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DipoleFieldModel {
    pub g10: f64,
    pub g11: f64,
    pub h11: f64,
    pub g10_rate: f64,
    pub g11_rate: f64,
    pub h11_rate: f64,
    pub reference_year: f64,
    pub validity: FieldModelValidity,
}

impl Default for DipoleFieldModel {
    fn default() -> Self {
        Self::igrf13()
    }
}

impl DipoleFieldModel {
    pub fn igrf13() -> Self {
        Self {
            g10: -29404.8,
            g11: -1450.9,
            h11: 4652.5,
            g10_rate: 5.7,
            g11_rate: 7.4,
            h11_rate: -25.9,
            reference_year: 2020.0,
            validity: FieldModelValidity {
                min_altitude: -1_000.0,
                max_altitude: 6_000_000.0,
                min_year: 2015.0,
                max_year: 2030.0,
            },
        }
    }

    /// Dipole coefficients as an ECEF vector (g11, h11, g10) at `year`.
    fn coefficients(&self, year: f64) -> na::Vector3<f64> {
        let dt = year - self.reference_year;
        na::Vector3::new(
            self.g11 + self.g11_rate * dt,
            self.h11 + self.h11_rate * dt,
            self.g10 + self.g10_rate * dt,
        )
    }

    /// Field at an ECEF position (nT, ECEF components).
    pub fn field_ecef(&self, position: &na::Vector3<f64>, year: f64) -> na::Vector3<f64> {
        let r = position.magnitude();
        let r_hat = position / r;
        let g = self.coefficients(year);
        let scale = (IGRF_REFERENCE_RADIUS / r).powi(3);

        (3.0 * g.dot(&r_hat) * r_hat - g) * scale
    }
}

impl MagneticFieldModel for DipoleFieldModel {
    fn validity(&self) -> FieldModelValidity {
        self.validity
    }

    fn field_ned(&self, geodetic: &Geodetic, epoch: Epoch) -> SimResult<na::Vector3<f64>> {
        let year = decimal_year(epoch);
        self.validity.check(geodetic, year)?;

        let position = geodetic_to_ecef(geodetic);
        let b_ecef = self.field_ecef(&position, year);
        Ok(ecef_to_ned_rotation(geodetic.latitude, geodetic.longitude) * b_ecef)
    }
}

/// Sanity check on field magnitude against a physical ceiling (nT).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum FieldClampPolicy {
    #[default]
    Disabled,
    /// Abort the step when the ceiling is exceeded.
    Fail { ceiling: f64 },
    /// Rescale the field to the ceiling, keeping its direction.
    Clamp { ceiling: f64 },
}

impl FieldClampPolicy {
    pub fn apply(&self, field: na::Vector3<f64>) -> SimResult<na::Vector3<f64>> {
        let magnitude = field.magnitude();
        match *self {
            FieldClampPolicy::Disabled => Ok(field),
            FieldClampPolicy::Fail { ceiling } if magnitude > ceiling => {
                Err(SimError::FieldMagnitudeExceeded { magnitude, ceiling })
            }
            FieldClampPolicy::Clamp { ceiling } if magnitude > ceiling => {
                warn!(magnitude, ceiling, "clamping field magnitude");
                Ok(field * (ceiling / magnitude))
            }
            FieldClampPolicy::Fail { .. } | FieldClampPolicy::Clamp { .. } => Ok(field),
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        match *self {
            FieldClampPolicy::Fail { ceiling } | FieldClampPolicy::Clamp { ceiling }
                if !(ceiling.is_finite() && ceiling > 0.0) =>
            {
                Err(SimError::configuration("field clamp ceiling must be positive"))
            }
            _ => Ok(()),
        }
    }
}
