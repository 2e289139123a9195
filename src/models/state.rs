use crate::constants::QUATERNION_NORM_TOLERANCE;
use crate::errors::{SimError, SimResult};
use crate::numerics::quaternion::Quaternion;
use nalgebra as na;

/// Attitude of the spacecraft: body-to-inertial quaternion (scalar first) and
/// body-frame angular velocity (rad/s).
///
/// Also used as the derivative type by the equations of motion, in which case
/// `quaternion` holds q̇ and `angular_velocity` holds ω̇.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttitudeState {
    pub quaternion: Quaternion,
    pub angular_velocity: na::Vector3<f64>,
}

impl AttitudeState {
    pub fn new(quaternion: Quaternion, angular_velocity: na::Vector3<f64>) -> Self {
        AttitudeState {
            quaternion,
            angular_velocity,
        }
    }

    /// Seeds a state from initial conditions, rejecting quaternions that are not unit
    /// within [`QUATERNION_NORM_TOLERANCE`].
    pub fn from_initial_conditions(
        quaternion: Quaternion,
        angular_velocity: na::Vector3<f64>,
    ) -> SimResult<Self> {
        let norm = quaternion.norm();
        if !norm.is_finite() || (norm - 1.0).abs() > QUATERNION_NORM_TOLERANCE {
            return Err(SimError::configuration(format!(
                "initial quaternion norm {norm} is not unit"
            )));
        }
        if angular_velocity.iter().any(|w| !w.is_finite()) {
            return Err(SimError::configuration("initial angular velocity is not finite"));
        }
        Ok(AttitudeState::new(quaternion, angular_velocity))
    }

    pub fn zero() -> Self {
        AttitudeState {
            quaternion: Quaternion::zero(),
            angular_velocity: na::Vector3::zeros(),
        }
    }

    /// Packs the state as `[q0, q1, q2, q3, ωx, ωy, ωz]`.
    pub fn to_vector(&self) -> na::SVector<f64, 7> {
        let q = &self.quaternion.data;
        let w = &self.angular_velocity;
        na::SVector::<f64, 7>::from_column_slice(&[q[0], q[1], q[2], q[3], w[0], w[1], w[2]])
    }

    pub fn from_vector(x: &na::SVector<f64, 7>) -> Self {
        AttitudeState {
            quaternion: Quaternion::new(x[0], x[1], x[2], x[3]),
            angular_velocity: na::Vector3::new(x[4], x[5], x[6]),
        }
    }

    pub fn quaternion_norm_error(&self) -> f64 {
        (self.quaternion.norm() - 1.0).abs()
    }

    pub fn normalized(&self) -> Self {
        AttitudeState {
            quaternion: self.quaternion.normalize(),
            angular_velocity: self.angular_velocity,
        }
    }
}

impl std::ops::Add for AttitudeState {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        AttitudeState {
            quaternion: self.quaternion + other.quaternion,
            angular_velocity: self.angular_velocity + other.angular_velocity,
        }
    }
}

impl std::ops::Mul<f64> for AttitudeState {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self {
        AttitudeState {
            quaternion: self.quaternion * scalar,
            angular_velocity: self.angular_velocity * scalar,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(Quaternion::new(1.0, 0.0, 0.0, 0.0) => true; "identity")]
    #[test_case(Quaternion::new(0.5, 0.5, 0.5, 0.5) => true; "unit")]
    #[test_case(Quaternion::new(1.0, 1e-7, 0.0, 0.0) => true; "within tolerance")]
    #[test_case(Quaternion::new(1.0, 0.01, 0.0, 0.0) => false; "drifted")]
    #[test_case(Quaternion::new(0.0, 0.0, 0.0, 0.0) => false; "zero")]
    fn initial_quaternion_must_be_unit(q: Quaternion) -> bool {
        AttitudeState::from_initial_conditions(q, na::Vector3::zeros()).is_ok()
    }

    #[test]
    fn vector_packing_is_scalar_first() {
        let state = AttitudeState::new(
            Quaternion::new(0.1, 0.2, 0.3, 0.4),
            na::Vector3::new(5.0, 6.0, 7.0),
        );
        let x = state.to_vector();
        assert_eq!(x.as_slice(), &[0.1, 0.2, 0.3, 0.4, 5.0, 6.0, 7.0]);
        assert_eq!(AttitudeState::from_vector(&x), state);
    }
}
