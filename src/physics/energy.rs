use crate::models::spacecraft::InertiaTensor;
use crate::models::AttitudeState;
use crate::numerics::quaternion::rotate_by_quaternion;
use nalgebra as na;

/// Rotational kinetic energy ½ ωᵀIω (J).
pub fn rotational_kinetic_energy(state: &AttitudeState, inertia: &InertiaTensor) -> f64 {
    let w = state.angular_velocity;
    0.5 * w.dot(&(inertia.matrix() * w))
}

/// Angular momentum Iω expressed in the inertial frame (N·m·s).
pub fn inertial_angular_momentum(state: &AttitudeState, inertia: &InertiaTensor) -> na::Vector3<f64> {
    let h_body = inertia.matrix() * state.angular_velocity;
    rotate_by_quaternion(&h_body, &state.quaternion)
}
