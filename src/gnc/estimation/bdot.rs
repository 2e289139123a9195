use crate::coordinates::frames::Frame;
use crate::errors::{SimError, SimResult};
use crate::models::field::FieldSample;
use nalgebra as na;

/// Finite-difference rate of the body-frame field, `(current - previous) / dt`.
pub fn estimate(
    previous: &FieldSample,
    current: &FieldSample,
    dt: f64,
) -> SimResult<na::Vector3<f64>> {
    if !(dt.is_finite() && dt > 0.0) {
        return Err(SimError::InvalidInterval { dt });
    }
    let previous = previous.field().expect_frame(Frame::Body)?;
    let current = current.field().expect_frame(Frame::Body)?;

    Ok((current - previous) / dt)
}

/// B-dot estimator with a single-slot history of the last body-frame sample.
#[derive(Debug, Clone, Default)]
pub struct BDotEstimator {
    previous: Option<FieldSample>,
}

impl BDotEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn previous(&self) -> Option<&FieldSample> {
        self.previous.as_ref()
    }

    /// Returns the estimate against the stored sample, or `None` if there is no
    /// history yet. The new sample replaces the stored one only on success.
    pub fn update(&mut self, sample: FieldSample, dt: f64) -> SimResult<Option<na::Vector3<f64>>> {
        let b_dot = match &self.previous {
            Some(previous) => Some(estimate(previous, &sample, dt)?),
            None => {
                sample.field().expect_frame(Frame::Body)?;
                None
            }
        };
        self.previous = Some(sample);
        Ok(b_dot)
    }

    pub fn reset(&mut self) {
        self.previous = None;
    }
}
