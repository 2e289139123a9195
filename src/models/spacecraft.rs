use crate::errors::{SimError, SimResult};
use nalgebra as na;

/// Constant, symmetric positive-definite inertia tensor (kg·m²) with its inverse.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct InertiaTensor {
    matrix: na::Matrix3<f64>,
    inverse: na::Matrix3<f64>,
}

impl InertiaTensor {
    pub fn new(matrix: na::Matrix3<f64>) -> SimResult<Self> {
        if matrix.iter().any(|v| !v.is_finite()) {
            return Err(SimError::configuration("inertia tensor has non-finite entries"));
        }

        let asymmetry = (matrix - matrix.transpose()).amax();
        if asymmetry > 1e-12 * matrix.amax() {
            return Err(SimError::configuration("inertia tensor is not symmetric"));
        }

        if na::Cholesky::new(matrix).is_none() {
            return Err(SimError::configuration(
                "inertia tensor is not positive definite",
            ));
        }

        let inverse = matrix
            .try_inverse()
            .ok_or_else(|| SimError::configuration("inertia tensor is singular"))?;

        Ok(Self { matrix, inverse })
    }

    pub fn diagonal(ixx: f64, iyy: f64, izz: f64) -> SimResult<Self> {
        Self::new(na::Matrix3::from_diagonal(&na::Vector3::new(ixx, iyy, izz)))
    }

    pub fn from_rows(rows: [[f64; 3]; 3]) -> SimResult<Self> {
        Self::new(na::Matrix3::from_fn(|i, j| rows[i][j]))
    }

    pub fn matrix(&self) -> &na::Matrix3<f64> {
        &self.matrix
    }

    pub fn inverse(&self) -> &na::Matrix3<f64> {
        &self.inverse
    }
}

/// Maximum commandable dipole per body axis (A·m²).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ActuatorLimit {
    pub max_dipole: na::Vector3<f64>,
}

impl ActuatorLimit {
    pub fn new(max_dipole: na::Vector3<f64>) -> SimResult<Self> {
        if max_dipole.iter().any(|m| !m.is_finite() || *m < 0.0) {
            return Err(SimError::configuration(
                "actuator dipole limits must be finite and non-negative",
            ));
        }
        Ok(Self { max_dipole })
    }

    /// Clips each axis of `dipole` to its limit.
    pub fn saturate(&self, dipole: &na::Vector3<f64>) -> na::Vector3<f64> {
        dipole.zip_map(&self.max_dipole, |m, limit| m.clamp(-limit, limit))
    }
}

/// Physical description of the vehicle being detumbled.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Spacecraft {
    pub inertia: InertiaTensor,
    pub actuators: ActuatorLimit,
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use test_case::test_case;

    #[test_case([[17.0, 0.0, 0.0], [0.0, 18.0, 0.0], [0.0, 0.0, 22.0]] => true; "diagonal")]
    #[test_case([[2.0, 0.1, 0.0], [0.1, 3.0, 0.2], [0.0, 0.2, 4.0]] => true; "products of inertia")]
    #[test_case([[2.0, 0.1, 0.0], [0.0, 3.0, 0.0], [0.0, 0.0, 4.0]] => false; "asymmetric")]
    #[test_case([[1.0, 0.0, 0.0], [0.0, -1.0, 0.0], [0.0, 0.0, 1.0]] => false; "indefinite")]
    #[test_case([[0.0, 0.0, 0.0], [0.0, 0.0, 0.0], [0.0, 0.0, 0.0]] => false; "zero")]
    fn inertia_validation(rows: [[f64; 3]; 3]) -> bool {
        InertiaTensor::from_rows(rows).is_ok()
    }

    #[test]
    fn inverse_is_stored() {
        let inertia = InertiaTensor::diagonal(2.0, 4.0, 8.0).unwrap();
        assert_abs_diff_eq!(
            inertia.matrix() * inertia.inverse(),
            na::Matrix3::identity(),
            epsilon = 1e-15
        );
    }

    #[test]
    fn saturate_clips_per_axis() {
        let limits = ActuatorLimit::new(na::Vector3::new(8.8e-3, 1.373e-2, 8.2e-3)).unwrap();
        let clipped = limits.saturate(&na::Vector3::new(1.0, -1.0, 1e-3));
        assert_eq!(clipped, na::Vector3::new(8.8e-3, -1.373e-2, 1e-3));
    }

    #[test]
    fn negative_limit_rejected() {
        assert!(ActuatorLimit::new(na::Vector3::new(1.0, -0.1, 1.0)).is_err());
    }
}
