pub mod dormand_prince;
pub mod rk4;

use crate::errors::SimResult;
use crate::models::AttitudeState;
use crate::physics::dynamics::EquationsOfMotion;
use nalgebra as na;
use serde::{Deserialize, Serialize};

pub use dormand_prince::DormandPrince45;
pub use rk4::RK4;

/// Error tolerances for adaptive step-size control.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Tolerances {
    pub rel: f64,
    pub abs: f64,
}

impl Default for Tolerances {
    fn default() -> Self {
        Self {
            rel: 1e-10,
            abs: 1e-12,
        }
    }
}

/// State types an integrator can advance.
pub trait IntegrableState:
    Clone + std::ops::Add<Output = Self> + std::ops::Mul<f64, Output = Self>
{
    /// RMS of `error` weighted by `abs + rel * max(|y0|, |y1|)` per component.
    fn error_norm(error: &Self, y0: &Self, y1: &Self, tol: &Tolerances) -> f64;

    fn is_finite(&self) -> bool;
}

impl<const N: usize> IntegrableState for na::SVector<f64, N> {
    fn error_norm(error: &Self, y0: &Self, y1: &Self, tol: &Tolerances) -> f64 {
        let sum: f64 = (0..N)
            .map(|i| {
                let scale = tol.abs + tol.rel * y0[i].abs().max(y1[i].abs());
                (error[i] / scale).powi(2)
            })
            .sum();
        (sum / N as f64).sqrt()
    }

    fn is_finite(&self) -> bool {
        self.iter().all(|v| v.is_finite())
    }
}

impl IntegrableState for AttitudeState {
    fn error_norm(error: &Self, y0: &Self, y1: &Self, tol: &Tolerances) -> f64 {
        na::SVector::<f64, 7>::error_norm(&error.to_vector(), &y0.to_vector(), &y1.to_vector(), tol)
    }

    fn is_finite(&self) -> bool {
        IntegrableState::is_finite(&self.to_vector())
    }
}

/// Advances a state across one control interval. Internal sub-steps are not visible
/// to the caller.
pub trait Integrator: Send + Sync {
    fn integrate<E>(&self, eom: &E, state: &E::State, dt: f64) -> SimResult<E::State>
    where
        E: EquationsOfMotion,
        E::State: IntegrableState;
}

/// Integrator selection carried in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "method", rename_all = "snake_case")]
pub enum IntegratorConfig {
    DormandPrince45 {
        #[serde(default)]
        tolerances: Tolerances,
        #[serde(default = "default_max_steps")]
        max_steps: usize,
        #[serde(default = "default_min_step")]
        min_step: f64,
    },
    Rk4 {
        #[serde(default = "default_substeps")]
        substeps: usize,
    },
}

fn default_max_steps() -> usize {
    10_000
}

fn default_min_step() -> f64 {
    1e-9
}

fn default_substeps() -> usize {
    1
}

impl Default for IntegratorConfig {
    fn default() -> Self {
        IntegratorConfig::DormandPrince45 {
            tolerances: Tolerances::default(),
            max_steps: default_max_steps(),
            min_step: default_min_step(),
        }
    }
}

/// Concrete integrator built from an [`IntegratorConfig`].
#[derive(Debug, Clone)]
pub enum AnyIntegrator {
    DormandPrince45(DormandPrince45),
    Rk4(RK4),
}

impl IntegratorConfig {
    pub fn build(&self) -> AnyIntegrator {
        match *self {
            IntegratorConfig::DormandPrince45 {
                tolerances,
                max_steps,
                min_step,
            } => AnyIntegrator::DormandPrince45(DormandPrince45 {
                tolerances,
                max_steps,
                min_step,
            }),
            IntegratorConfig::Rk4 { substeps } => AnyIntegrator::Rk4(RK4::new(substeps)),
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        use crate::errors::SimError;
        match *self {
            IntegratorConfig::DormandPrince45 {
                tolerances,
                max_steps,
                min_step,
            } => {
                if !(tolerances.rel > 0.0 && tolerances.abs > 0.0) {
                    return Err(SimError::configuration("integrator tolerances must be positive"));
                }
                if max_steps == 0 || !(min_step > 0.0) {
                    return Err(SimError::configuration(
                        "integrator step budget and minimum step must be positive",
                    ));
                }
                Ok(())
            }
            IntegratorConfig::Rk4 { substeps } if substeps == 0 => {
                Err(SimError::configuration("RK4 needs at least one substep"))
            }
            IntegratorConfig::Rk4 { .. } => Ok(()),
        }
    }
}

impl Integrator for AnyIntegrator {
    fn integrate<E>(&self, eom: &E, state: &E::State, dt: f64) -> SimResult<E::State>
    where
        E: EquationsOfMotion,
        E::State: IntegrableState,
    {
        match self {
            AnyIntegrator::DormandPrince45(i) => i.integrate(eom, state, dt),
            AnyIntegrator::Rk4(i) => i.integrate(eom, state, dt),
        }
    }
}
