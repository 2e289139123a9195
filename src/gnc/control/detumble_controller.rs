use crate::constants::NANOTESLA_TO_TESLA;
use crate::models::spacecraft::ActuatorLimit;
use nalgebra as na;
use serde::{Deserialize, Serialize};

/// Everything a detumble law may look at for one control interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlInput {
    /// Body-frame field rate, raw field units per second.
    pub b_dot: na::Vector3<f64>,
    /// Body-frame field, raw units.
    pub field_body: na::Vector3<f64>,
    pub angular_velocity: na::Vector3<f64>,
}

/// Dipole (A·m²) and resulting torque (N·m), both body frame, held for one interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ControlCommand {
    pub dipole: na::Vector3<f64>,
    pub torque: na::Vector3<f64>,
}

impl ControlCommand {
    pub fn zero() -> Self {
        Self {
            dipole: na::Vector3::zeros(),
            torque: na::Vector3::zeros(),
        }
    }

    fn from_dipole(dipole: na::Vector3<f64>, field_body: &na::Vector3<f64>, field_scale: f64) -> Self {
        let torque = field_scale * dipole.cross(field_body);
        Self { dipole, torque }
    }
}

pub trait DetumbleController: Send + Sync {
    fn command(&self, input: &ControlInput) -> ControlCommand;
}

/// `sign` with `sign(0) = 0`, unlike `f64::signum`.
fn sign(x: f64) -> f64 {
    if x > 0.0 {
        1.0
    } else if x < 0.0 {
        -1.0
    } else {
        0.0
    }
}

/// Full-authority B-dot law: each coil drives at its limit against the field rate.
#[derive(Debug, Clone)]
pub struct BangBangController {
    limits: ActuatorLimit,
    field_scale: f64,
}

impl BangBangController {
    pub fn new(limits: ActuatorLimit, field_scale: f64) -> Self {
        Self {
            limits,
            field_scale,
        }
    }
}

impl DetumbleController for BangBangController {
    fn command(&self, input: &ControlInput) -> ControlCommand {
        let dipole = input
            .b_dot
            .zip_map(&self.limits.max_dipole, |rate, max| -max * sign(rate));
        ControlCommand::from_dipole(dipole, &input.field_body, self.field_scale)
    }
}

/// Linear B-dot law, `m = k·Ḃ`, saturated per axis.
#[derive(Debug, Clone)]
pub struct ProportionalBDotController {
    gain: f64,
    limits: ActuatorLimit,
    field_scale: f64,
}

impl ProportionalBDotController {
    pub fn new(gain: f64, limits: ActuatorLimit, field_scale: f64) -> Self {
        Self {
            gain,
            limits,
            field_scale,
        }
    }
}

impl DetumbleController for ProportionalBDotController {
    fn command(&self, input: &ControlInput) -> ControlCommand {
        let dipole = self
            .limits
            .saturate(&(self.gain * self.field_scale * input.b_dot));
        ControlCommand::from_dipole(dipole, &input.field_body, self.field_scale)
    }
}

/// Rate-feedback law `m = k/|B|² (ω × B)`, saturated per axis.
#[derive(Debug, Clone)]
pub struct BCrossController {
    gain: f64,
    limits: ActuatorLimit,
    field_scale: f64,
}

impl BCrossController {
    pub fn new(gain: f64, limits: ActuatorLimit, field_scale: f64) -> Self {
        Self {
            gain,
            limits,
            field_scale,
        }
    }
}

impl DetumbleController for BCrossController {
    fn command(&self, input: &ControlInput) -> ControlCommand {
        let b = self.field_scale * input.field_body;
        let b_squared = b.norm_squared();
        if b_squared == 0.0 {
            return ControlCommand::zero();
        }
        let dipole = self
            .limits
            .saturate(&(self.gain / b_squared * input.angular_velocity.cross(&b)));
        ControlCommand::from_dipole(dipole, &input.field_body, self.field_scale)
    }
}

/// Controller selection carried in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
#[serde(tag = "law", rename_all = "snake_case")]
pub enum ControlLaw {
    #[default]
    BangBang,
    ProportionalBDot {
        gain: f64,
    },
    BCross {
        gain: f64,
    },
}

impl ControlLaw {
    pub fn build(&self, limits: ActuatorLimit, field_scale: f64) -> Box<dyn DetumbleController> {
        match *self {
            ControlLaw::BangBang => Box::new(BangBangController::new(limits, field_scale)),
            ControlLaw::ProportionalBDot { gain } => {
                Box::new(ProportionalBDotController::new(gain, limits, field_scale))
            }
            ControlLaw::BCross { gain } => Box::new(BCrossController::new(gain, limits, field_scale)),
        }
    }

    pub fn gain(&self) -> Option<f64> {
        match *self {
            ControlLaw::BangBang => None,
            ControlLaw::ProportionalBDot { gain } | ControlLaw::BCross { gain } => Some(gain),
        }
    }
}

/// Default conversion of raw field units to tesla for the torque law.
pub fn default_field_scale() -> f64 {
    NANOTESLA_TO_TESLA
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use proptest::prelude::*;
    use test_case::test_case;

    fn pycubed_limits() -> ActuatorLimit {
        ActuatorLimit::new(na::Vector3::new(8.8e-3, 1.373e-2, 8.2e-3)).unwrap()
    }

    fn input(b_dot: na::Vector3<f64>, field_body: na::Vector3<f64>) -> ControlInput {
        ControlInput {
            b_dot,
            field_body,
            angular_velocity: na::Vector3::new(0.01, 0.05, -0.03),
        }
    }

    #[test]
    fn bang_bang_saturates_against_rate() {
        let controller = BangBangController::new(pycubed_limits(), 1e-9);
        let field = na::Vector3::new(2.0e4, -1.0e4, 3.0e4);
        let command = controller.command(&input(na::Vector3::new(3.0, -0.2, 0.0), field));

        assert_eq!(command.dipole, na::Vector3::new(-8.8e-3, 1.373e-2, 0.0));
        let expected = 1e-9 * command.dipole.cross(&field);
        assert_abs_diff_eq!(command.torque, expected, epsilon = 1e-18);
    }

    #[test_case(1e-30 => -1.0; "tiny positive")]
    #[test_case(-1e-30 => 1.0; "tiny negative")]
    #[test_case(0.0 => 0.0; "zero")]
    #[test_case(-0.0 => 0.0; "negative zero")]
    fn bang_bang_axis_sign(rate: f64) -> f64 {
        let limits = ActuatorLimit::new(na::Vector3::repeat(1.0)).unwrap();
        let controller = BangBangController::new(limits, 1e-9);
        let command = controller.command(&input(na::Vector3::new(rate, 0.0, 0.0), na::Vector3::z()));
        command.dipole.x
    }

    #[test]
    fn torque_is_perpendicular_to_field() {
        let controller = BangBangController::new(pycubed_limits(), 1e-9);
        let field = na::Vector3::new(-1.2e4, 4.1e4, 2.2e4);
        let command = controller.command(&input(na::Vector3::new(-5.0, 7.0, 1.0), field));
        assert_abs_diff_eq!(command.torque.dot(&field), 0.0, epsilon = 1e-15);
    }

    #[test]
    fn proportional_is_linear_until_saturation() {
        let limits = pycubed_limits();
        let controller = ProportionalBDotController::new(-1e4, limits, 1e-9);
        let small = controller.command(&input(na::Vector3::new(100.0, 0.0, 0.0), na::Vector3::y()));
        assert_abs_diff_eq!(small.dipole.x, -1e-3, epsilon = 1e-15);

        let large = controller.command(&input(na::Vector3::new(1e6, -1e6, 1e6), na::Vector3::y()));
        assert_eq!(large.dipole, na::Vector3::new(-8.8e-3, 1.373e-2, -8.2e-3));
    }

    #[test]
    fn b_cross_zero_field_gives_zero_command() {
        let controller = BCrossController::new(1.0, pycubed_limits(), 1e-9);
        let command = controller.command(&input(na::Vector3::zeros(), na::Vector3::zeros()));
        assert_eq!(command, ControlCommand::zero());
    }

    #[test]
    fn b_cross_opposes_rotation() {
        let controller = BCrossController::new(1e-6, ActuatorLimit::new(na::Vector3::repeat(10.0)).unwrap(), 1e-9);
        let field = na::Vector3::new(2.0e4, 0.0, 0.0);
        let omega = na::Vector3::new(0.0, 0.0, 0.1);
        let command = controller.command(&ControlInput {
            b_dot: na::Vector3::zeros(),
            field_body: field,
            angular_velocity: omega,
        });
        // Torque (m × B) is the negative projection of ω onto the plane normal to B
        assert!(command.torque.dot(&omega) < 0.0);
    }

    #[test]
    fn control_law_from_json() {
        let law: ControlLaw = serde_json::from_str(r#"{"law":"b_cross","gain":2.0e-5}"#).unwrap();
        assert_eq!(law, ControlLaw::BCross { gain: 2.0e-5 });
        assert_eq!(law.gain(), Some(2.0e-5));
        assert_eq!(ControlLaw::default(), ControlLaw::BangBang);
    }

    proptest! {
        #[test]
        fn dipole_never_exceeds_limits(
            bx in -1e5f64..1e5, by in -1e5f64..1e5, bz in -1e5f64..1e5,
            fx in -6e4f64..6e4, fy in -6e4f64..6e4, fz in -6e4f64..6e4,
        ) {
            let limits = pycubed_limits();
            let laws = [
                ControlLaw::BangBang,
                ControlLaw::ProportionalBDot { gain: -5e4 },
                ControlLaw::BCross { gain: 1e-4 },
            ];
            for law in laws {
                let controller = law.build(limits, 1e-9);
                let command = controller.command(&input(
                    na::Vector3::new(bx, by, bz),
                    na::Vector3::new(fx, fy, fz),
                ));
                for k in 0..3 {
                    prop_assert!(command.dipole[k].abs() <= limits.max_dipole[k]);
                }
            }
        }

        #[test]
        fn zero_rate_gives_zero_bang_bang_command(
            fx in -6e4f64..6e4, fy in -6e4f64..6e4, fz in -6e4f64..6e4,
        ) {
            let controller = BangBangController::new(pycubed_limits(), 1e-9);
            let command = controller.command(&input(na::Vector3::zeros(), na::Vector3::new(fx, fy, fz)));
            prop_assert_eq!(command, ControlCommand::zero());
        }
    }
}
