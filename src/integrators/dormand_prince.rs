//! Adaptive Dormand–Prince 5(4) integrator.
//!
//! The fifth-order solution is propagated; the embedded fourth-order solution
//! only drives the step-size controller. Failure to finish the interval within
//! `max_steps` accepted-or-rejected attempts, or a step that has to shrink below
//! `min_step`, is reported as [`SimError::IntegrationFailure`] instead of
//! handing back a state of unknown quality.

use super::{IntegrableState, Integrator, Tolerances};
use crate::errors::{SimError, SimResult};
use crate::physics::dynamics::EquationsOfMotion;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// Fifth-order weights (also the last stage row, FSAL)
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// Fifth minus fourth order weights
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

const SAFETY: f64 = 0.9;
const MIN_FACTOR: f64 = 0.2;
const MAX_FACTOR: f64 = 5.0;

#[derive(Debug, Clone)]
pub struct DormandPrince45 {
    pub tolerances: Tolerances,
    /// Budget of step attempts per call to `integrate`.
    pub max_steps: usize,
    pub min_step: f64,
}

impl Default for DormandPrince45 {
    fn default() -> Self {
        Self {
            tolerances: Tolerances::default(),
            max_steps: 10_000,
            min_step: 1e-9,
        }
    }
}

impl DormandPrince45 {
    pub fn new(tolerances: Tolerances) -> Self {
        Self {
            tolerances,
            ..Default::default()
        }
    }
}

impl Integrator for DormandPrince45 {
    fn integrate<E>(&self, eom: &E, state: &E::State, dt: f64) -> SimResult<E::State>
    where
        E: EquationsOfMotion,
        E::State: IntegrableState,
    {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(SimError::IntegrationFailure {
                what: "interval must be positive",
                t: 0.0,
            });
        }

        let mut t = 0.0;
        let mut h = dt;
        let mut y = state.clone();
        let mut k1 = eom.compute_derivative(&y);

        for _ in 0..self.max_steps {
            let remaining = dt - t;
            if remaining <= dt * 1e-14 {
                return Ok(y);
            }
            let last = h >= remaining;
            if last {
                h = remaining;
            }

            let k2 = eom.compute_derivative(&(y.clone() + k1.clone() * (h * A21)));
            let k3 = eom.compute_derivative(
                &(y.clone() + k1.clone() * (h * A31) + k2.clone() * (h * A32)),
            );
            let k4 = eom.compute_derivative(
                &(y.clone() + k1.clone() * (h * A41) + k2.clone() * (h * A42) + k3.clone() * (h * A43)),
            );
            let k5 = eom.compute_derivative(
                &(y.clone()
                    + k1.clone() * (h * A51)
                    + k2.clone() * (h * A52)
                    + k3.clone() * (h * A53)
                    + k4.clone() * (h * A54)),
            );
            let k6 = eom.compute_derivative(
                &(y.clone()
                    + k1.clone() * (h * A61)
                    + k2.clone() * (h * A62)
                    + k3.clone() * (h * A63)
                    + k4.clone() * (h * A64)
                    + k5.clone() * (h * A65)),
            );

            let y_new = y.clone()
                + k1.clone() * (h * B1)
                + k3.clone() * (h * B3)
                + k4.clone() * (h * B4)
                + k5.clone() * (h * B5)
                + k6.clone() * (h * B6);
            let k7 = eom.compute_derivative(&y_new);

            let error = k1.clone() * (h * E1)
                + k3 * (h * E3)
                + k4 * (h * E4)
                + k5 * (h * E5)
                + k6 * (h * E6)
                + k7.clone() * (h * E7);
            let err = <E::State as IntegrableState>::error_norm(&error, &y, &y_new, &self.tolerances);

            if !err.is_finite() || !y_new.is_finite() {
                // Treat as a rejected step; a persistent blow-up ends at min_step
                h *= MIN_FACTOR;
            } else if err <= 1.0 {
                t = if last { dt } else { t + h };
                y = y_new;
                k1 = k7;

                let factor = if err == 0.0 {
                    MAX_FACTOR
                } else {
                    (SAFETY * err.powf(-0.2)).clamp(MIN_FACTOR, MAX_FACTOR)
                };
                h *= factor;
                continue;
            } else {
                h *= (SAFETY * err.powf(-0.2)).clamp(MIN_FACTOR, 1.0);
            }

            if h < self.min_step {
                return Err(SimError::IntegrationFailure {
                    what: "step size fell below minimum",
                    t,
                });
            }
        }

        if dt - t <= dt * 1e-14 {
            return Ok(y);
        }
        Err(SimError::IntegrationFailure {
            what: "step budget exhausted",
            t,
        })
    }
}
