use super::{IntegrableState, Integrator};
use crate::errors::{SimError, SimResult};
use crate::physics::dynamics::EquationsOfMotion;

/// Classical fixed-step RK4 over `substeps` equal sub-intervals.
#[derive(Debug, Clone)]
pub struct RK4 {
    substeps: usize,
}

impl RK4 {
    pub fn new(substeps: usize) -> Self {
        RK4 {
            substeps: substeps.max(1),
        }
    }

    fn step<E>(eom: &E, state: &E::State, dt: f64) -> E::State
    where
        E: EquationsOfMotion,
        E::State: IntegrableState,
    {
        let k1 = eom.compute_derivative(state);

        let state2 = state.clone() + k1.clone() * (dt / 2.0);
        let k2 = eom.compute_derivative(&state2);

        let state3 = state.clone() + k2.clone() * (dt / 2.0);
        let k3 = eom.compute_derivative(&state3);

        let state4 = state.clone() + k3.clone() * dt;
        let k4 = eom.compute_derivative(&state4);

        state.clone() + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (dt / 6.0)
    }
}

impl Integrator for RK4 {
    fn integrate<E>(&self, eom: &E, state: &E::State, dt: f64) -> SimResult<E::State>
    where
        E: EquationsOfMotion,
        E::State: IntegrableState,
    {
        let h = dt / self.substeps as f64;
        let mut current = state.clone();

        for i in 0..self.substeps {
            current = Self::step(eom, &current, h);
            if !current.is_finite() {
                return Err(SimError::IntegrationFailure {
                    what: "non-finite state",
                    t: (i + 1) as f64 * h,
                });
            }
        }
        Ok(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::integrators::test_systems::{FiniteTimeBlowup, HarmonicOscillator};
    use approx::assert_abs_diff_eq;
    use nalgebra as na;

    #[test]
    fn harmonic_oscillator_quarter_period() {
        let sys = HarmonicOscillator { omega: 1.0 };
        let y = RK4::new(100)
            .integrate(&sys, &na::Vector2::new(1.0, 0.0), std::f64::consts::FRAC_PI_2)
            .unwrap();
        assert_abs_diff_eq!(y, na::Vector2::new(0.0, -1.0), epsilon = 1e-8);
    }

    #[test]
    fn blowup_is_reported() {
        let err = RK4::new(4)
            .integrate(&FiniteTimeBlowup, &na::Vector1::new(1e150), 1e10)
            .unwrap_err();
        assert!(matches!(err, SimError::IntegrationFailure { .. }));
    }
}
