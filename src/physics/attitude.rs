use crate::constants::MU_EARTH;
use crate::models::spacecraft::InertiaTensor;
use crate::models::AttitudeState;
use crate::numerics::quaternion::{compute_quaternion_derivative, rotate_by_quaternion, Quaternion};
use nalgebra as na;

/// Gravity gradient torque (body frame, N·m) at inertial position `r_eci`.
pub fn gravity_gradient_torque(
    r_eci: &na::Vector3<f64>,
    attitude: &Quaternion,
    inertia: &InertiaTensor,
) -> na::Vector3<f64> {
    let r_mag = r_eci.magnitude();
    let r_body = rotate_by_quaternion(&(r_eci / r_mag), &attitude.inverse());

    (3.0 * MU_EARTH / r_mag.powi(3)) * r_body.cross(&(inertia.matrix() * r_body))
}

/// Euler's rigid-body equation solved for ω̇.
pub fn angular_acceleration(
    state: &AttitudeState,
    inertia: &InertiaTensor,
    torque: &na::Vector3<f64>,
) -> na::Vector3<f64> {
    let w = state.angular_velocity;
    let gyro = w.cross(&(inertia.matrix() * w));

    inertia.inverse() * (torque - gyro)
}

pub fn quaternion_derivative(state: &AttitudeState) -> Quaternion {
    compute_quaternion_derivative(&state.quaternion, &state.angular_velocity)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn symmetric_body_has_no_gyroscopic_coupling() {
        let inertia = InertiaTensor::diagonal(0.34375, 0.34375, 0.34375).unwrap();
        let state = AttitudeState::new(Quaternion::identity(), na::Vector3::new(0.01, 0.05, -0.03));

        let alpha = angular_acceleration(&state, &inertia, &na::Vector3::zeros());
        assert_abs_diff_eq!(alpha, na::Vector3::zeros(), epsilon = 1e-18);
    }

    #[test]
    fn asymmetric_body_couples_axes() {
        let inertia = InertiaTensor::diagonal(17.0, 18.0, 22.0).unwrap();
        let w = na::Vector3::new(0.01, 0.05, -0.03);
        let state = AttitudeState::new(Quaternion::identity(), w);

        let alpha = angular_acceleration(&state, &inertia, &na::Vector3::zeros());
        let expected = na::Vector3::new(
            (18.0 - 22.0) * w[1] * w[2] / 17.0,
            (22.0 - 17.0) * w[2] * w[0] / 18.0,
            (17.0 - 18.0) * w[0] * w[1] / 22.0,
        );
        assert_abs_diff_eq!(alpha, expected, epsilon = 1e-15);
    }

    #[test]
    fn torque_accelerates_along_principal_axis() {
        let inertia = InertiaTensor::diagonal(2.0, 4.0, 5.0).unwrap();
        let state = AttitudeState::new(Quaternion::identity(), na::Vector3::zeros());
        let alpha = angular_acceleration(&state, &inertia, &na::Vector3::new(0.0, 1e-3, 0.0));
        assert_abs_diff_eq!(alpha, na::Vector3::new(0.0, 2.5e-4, 0.0), epsilon = 1e-18);
    }

    #[test]
    fn gravity_gradient_vanishes_for_symmetric_body() {
        let inertia = InertiaTensor::diagonal(1.0, 1.0, 1.0).unwrap();
        let r = na::Vector3::new(7.0e6, 1.0e6, -2.0e6);
        let q = Quaternion::new(0.9, 0.2, 0.3, -0.1).normalize();
        assert_abs_diff_eq!(gravity_gradient_torque(&r, &q, &inertia), na::Vector3::zeros(), epsilon = 1e-18);
    }

    #[test]
    fn gravity_gradient_restores_tilted_long_axis() {
        // Long axis along body x, tilted 45 degrees from nadir about z
        let inertia = InertiaTensor::diagonal(1.0, 10.0, 10.0).unwrap();
        let r = na::Vector3::new(7.0e6, 0.0, 0.0);
        let q = Quaternion::from_axis_angle(&na::Vector3::z(), std::f64::consts::FRAC_PI_4);

        let torque = gravity_gradient_torque(&r, &q, &inertia);
        assert!(torque[2].abs() > 0.0);
        assert_abs_diff_eq!(torque[0], 0.0, epsilon = 1e-20);
        assert_abs_diff_eq!(torque[1], 0.0, epsilon = 1e-20);
    }
}
