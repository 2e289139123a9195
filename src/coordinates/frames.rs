//! Frame-tagged vectors.
//!
//! Vectors carry the frame they are expressed in so that the simulation loop can
//! not silently mix, say, a NED field sample with a body-frame one. Conversions
//! walk one hop at a time along
//!
//! ```text
//! Body <-> Inertial <-> EarthFixed <-> LocalTangentNed | LocalTangentEnu
//! ```
//!
//! and every hop is a proper rotation.

use super::coordinate_transformation::{
    ecef_to_enu_rotation, ecef_to_ned_rotation, eci_to_ecef_rotation, Geodetic,
};
use crate::errors::{SimError, SimResult};
use crate::numerics::quaternion::{rotate_by_quaternion, Quaternion};
use nalgebra as na;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Frame {
    Inertial,
    EarthFixed,
    LocalTangentNed,
    LocalTangentEnu,
    Body,
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Frame::Inertial => write!(f, "ECI"),
            Frame::EarthFixed => write!(f, "ECEF"),
            Frame::LocalTangentNed => write!(f, "NED"),
            Frame::LocalTangentEnu => write!(f, "ENU"),
            Frame::Body => write!(f, "Body"),
        }
    }
}

/// Everything needed to rotate between frames at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FrameContext {
    /// Greenwich sidereal angle (rad).
    pub sidereal_angle: f64,
    /// Geodetic point defining the local-tangent triad.
    pub geodetic: Geodetic,
    /// Body-to-inertial attitude.
    pub attitude: Quaternion,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameVector {
    pub vector: na::Vector3<f64>,
    pub frame: Frame,
}

impl FrameVector {
    pub fn new(vector: na::Vector3<f64>, frame: Frame) -> Self {
        Self { vector, frame }
    }

    pub fn magnitude(&self) -> f64 {
        self.vector.magnitude()
    }

    /// Returns the vector if it is expressed in `frame`.
    pub fn expect_frame(&self, frame: Frame) -> SimResult<na::Vector3<f64>> {
        if self.frame != frame {
            return Err(SimError::FrameMismatch {
                expected: frame,
                found: self.frame,
            });
        }
        Ok(self.vector)
    }

    /// Rotates the vector one hop into `target`.
    ///
    /// Asking for the frame the vector is already in is an error, as is asking for a
    /// frame that is not adjacent in the chain.
    pub fn transform(&self, target: Frame, ctx: &FrameContext) -> SimResult<FrameVector> {
        use Frame::*;

        let lat = ctx.geodetic.latitude;
        let lon = ctx.geodetic.longitude;
        let v = &self.vector;

        let rotated = match (self.frame, target) {
            (Body, Inertial) => rotate_by_quaternion(v, &ctx.attitude),
            (Inertial, Body) => rotate_by_quaternion(v, &ctx.attitude.inverse()),
            (Inertial, EarthFixed) => eci_to_ecef_rotation(ctx.sidereal_angle) * v,
            (EarthFixed, Inertial) => eci_to_ecef_rotation(ctx.sidereal_angle).transpose() * v,
            (EarthFixed, LocalTangentNed) => ecef_to_ned_rotation(lat, lon) * v,
            (LocalTangentNed, EarthFixed) => ecef_to_ned_rotation(lat, lon).transpose() * v,
            (EarthFixed, LocalTangentEnu) => ecef_to_enu_rotation(lat, lon) * v,
            (LocalTangentEnu, EarthFixed) => ecef_to_enu_rotation(lat, lon).transpose() * v,
            (from, to) => {
                return Err(SimError::FrameMismatch {
                    expected: adjacent_source(to).unwrap_or(to),
                    found: from,
                })
            }
        };

        Ok(FrameVector::new(rotated, target))
    }

    /// Applies [`FrameVector::transform`] along `path`.
    pub fn transform_path(&self, path: &[Frame], ctx: &FrameContext) -> SimResult<FrameVector> {
        path.iter()
            .try_fold(*self, |current, &frame| current.transform(frame, ctx))
    }
}

// The frame a vector has to be in to reach `target` in one hop along the main chain
fn adjacent_source(target: Frame) -> Option<Frame> {
    match target {
        Frame::Body => Some(Frame::Inertial),
        Frame::Inertial => Some(Frame::EarthFixed),
        Frame::EarthFixed => Some(Frame::Inertial),
        Frame::LocalTangentNed | Frame::LocalTangentEnu => Some(Frame::EarthFixed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn context() -> FrameContext {
        FrameContext {
            sidereal_angle: 1.713,
            geodetic: Geodetic::new(0.83, -0.42, 650_000.0),
            attitude: Quaternion::new(0.8, 0.3, -0.5, 0.1).normalize(),
        }
    }

    #[test]
    fn ned_to_body_and_back() {
        let ctx = context();
        let ned = FrameVector::new(na::Vector3::new(18_500.0, -1_200.0, 41_000.0), Frame::LocalTangentNed);

        let body = ned
            .transform_path(&[Frame::EarthFixed, Frame::Inertial, Frame::Body], &ctx)
            .unwrap();
        assert_eq!(body.frame, Frame::Body);
        assert_relative_eq!(body.magnitude(), ned.magnitude(), max_relative = 1e-12);

        let back = body
            .transform_path(&[Frame::Inertial, Frame::EarthFixed, Frame::LocalTangentNed], &ctx)
            .unwrap();
        assert!((back.vector - ned.vector).norm() < 1e-9 * ned.magnitude());
    }

    #[test]
    fn enu_and_ned_agree_in_earth_fixed() {
        let ctx = context();
        let ned = FrameVector::new(na::Vector3::new(1.0, 2.0, 3.0), Frame::LocalTangentNed);
        let enu = FrameVector::new(
            crate::coordinates::coordinate_transformation::ned_to_enu(&ned.vector),
            Frame::LocalTangentEnu,
        );

        let a = ned.transform(Frame::EarthFixed, &ctx).unwrap();
        let b = enu.transform(Frame::EarthFixed, &ctx).unwrap();
        assert!((a.vector - b.vector).norm() < 1e-12);
    }

    #[test]
    fn same_frame_is_an_error() {
        let v = FrameVector::new(na::Vector3::x(), Frame::Body);
        let err = v.transform(Frame::Body, &context()).unwrap_err();
        assert!(matches!(
            err,
            SimError::FrameMismatch { expected: Frame::Inertial, found: Frame::Body }
        ));
    }

    #[test]
    fn non_adjacent_hop_is_an_error() {
        let v = FrameVector::new(na::Vector3::x(), Frame::LocalTangentNed);
        assert!(v.transform(Frame::Body, &context()).is_err());
        assert!(v.transform(Frame::LocalTangentEnu, &context()).is_err());
    }

    #[test]
    fn expect_frame_checks_tag() {
        let v = FrameVector::new(na::Vector3::y(), Frame::Inertial);
        assert_eq!(v.expect_frame(Frame::Inertial).unwrap(), na::Vector3::y());
        assert!(v.expect_frame(Frame::Body).is_err());
    }
}
