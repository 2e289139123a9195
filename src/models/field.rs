use crate::coordinates::frames::{Frame, FrameVector};
use nalgebra as na;

/// One magnetic field measurement: the vector (raw units, nT), its frame and
/// the simulation time it was taken at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldSample {
    field: FrameVector,
    time: f64,
}

impl FieldSample {
    pub fn new(field: FrameVector, time: f64) -> Self {
        Self { field, time }
    }

    pub fn body(vector: na::Vector3<f64>, time: f64) -> Self {
        Self::new(FrameVector::new(vector, Frame::Body), time)
    }

    pub fn field(&self) -> &FrameVector {
        &self.field
    }

    pub fn vector(&self) -> &na::Vector3<f64> {
        &self.field.vector
    }

    pub fn frame(&self) -> Frame {
        self.field.frame
    }

    pub fn time(&self) -> f64 {
        self.time
    }
}
