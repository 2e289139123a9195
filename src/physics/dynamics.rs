use super::attitude::{angular_acceleration, quaternion_derivative};
use crate::models::spacecraft::InertiaTensor;
use crate::models::AttitudeState;
use nalgebra as na;

pub trait EquationsOfMotion {
    type State;

    fn compute_derivative(&self, state: &Self::State) -> Self::State;
}

/// Rigid-body attitude kinematics and dynamics under a torque held constant
/// over the integration interval (zero-order hold).
pub struct AttitudeDynamics<'a> {
    inertia: &'a InertiaTensor,
    torque: na::Vector3<f64>,
}

impl<'a> AttitudeDynamics<'a> {
    pub fn new(inertia: &'a InertiaTensor, torque: na::Vector3<f64>) -> Self {
        Self { inertia, torque }
    }

    pub fn torque_free(inertia: &'a InertiaTensor) -> Self {
        Self::new(inertia, na::Vector3::zeros())
    }

    pub fn torque(&self) -> &na::Vector3<f64> {
        &self.torque
    }
}

impl EquationsOfMotion for AttitudeDynamics<'_> {
    type State = AttitudeState;

    fn compute_derivative(&self, state: &AttitudeState) -> AttitudeState {
        AttitudeState {
            quaternion: quaternion_derivative(state),
            angular_velocity: angular_acceleration(state, self.inertia, &self.torque),
        }
    }
}
