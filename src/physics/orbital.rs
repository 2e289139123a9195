use super::tle::Tle;
use crate::errors::{SimError, SimResult};
use hifitime::Epoch;
use nalgebra as na;
use satkit::sgp4::sgp4;

/// Source of the spacecraft's inertial position along its orbit.
pub trait OrbitPropagator: Send + Sync {
    /// Inertial position (m) at `epoch + elapsed_seconds`.
    fn position(&self, tle: &Tle, epoch: Epoch, elapsed_seconds: f64) -> SimResult<na::Vector3<f64>>;
}

/// SGP4 over the element set. Positions come back in TEME, which the frame
/// chain treats as inertial.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sgp4Propagator;

impl OrbitPropagator for Sgp4Propagator {
    fn position(&self, tle: &Tle, epoch: Epoch, elapsed_seconds: f64) -> SimResult<na::Vector3<f64>> {
        let since_epoch = (epoch - tle.epoch()).to_seconds() + elapsed_seconds;
        let time = tle.elements().epoch.clone() + satkit::Duration::from_seconds(since_epoch);

        // sgp4 caches its initialisation in the element set
        let mut elements = tle.elements().clone();
        let state = sgp4(&mut elements, &[time]).map_err(|_| SimError::Propagation {
            what: format!("SGP4 failed {since_epoch:.1} s past TLE epoch"),
        })?;

        let pos = state.pos.column(0);
        let position = na::Vector3::new(pos[0], pos[1], pos[2]);
        if position.iter().any(|c| !c.is_finite()) {
            return Err(SimError::Propagation {
                what: format!("non-finite position {since_epoch:.1} s past TLE epoch"),
            });
        }
        Ok(position)
    }
}
