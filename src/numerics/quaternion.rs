use nalgebra as na;
use std::ops::{Add, Mul};

/// Quaternion utilities for spacecraft attitude dynamics
/// Following scalar-first convention: q = [q0; q1; q2; q3] = [w; x; y; z]
///
/// An attitude quaternion maps body-frame vectors into the inertial frame,
/// `v_eci = q ⊗ v_body ⊗ q⁻¹`. Use [`Quaternion::inverse`] for the opposite hop.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quaternion {
    pub data: na::Vector4<f64>,
}

impl Quaternion {
    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Quaternion {
            data: na::Vector4::new(w, x, y, z),
        }
    }

    pub fn identity() -> Self {
        Quaternion::new(1.0, 0.0, 0.0, 0.0)
    }

    pub fn zero() -> Self {
        Quaternion::new(0.0, 0.0, 0.0, 0.0)
    }

    /// Pure quaternion (0, v).
    pub fn pure(v: &na::Vector3<f64>) -> Self {
        Quaternion::new(0.0, v[0], v[1], v[2])
    }

    pub fn from_axis_angle(axis: &na::Vector3<f64>, angle: f64) -> Self {
        let axis = axis.normalize();
        let (s, c) = (0.5 * angle).sin_cos();
        Quaternion::new(c, s * axis[0], s * axis[1], s * axis[2])
    }

    pub fn from_array(q: [f64; 4]) -> Self {
        Quaternion::new(q[0], q[1], q[2], q[3])
    }

    pub fn to_array(&self) -> [f64; 4] {
        [self.data[0], self.data[1], self.data[2], self.data[3]]
    }

    pub fn scalar(&self) -> f64 {
        self.data[0]
    }

    pub fn vector(&self) -> na::Vector3<f64> {
        na::Vector3::new(self.data[1], self.data[2], self.data[3])
    }

    pub fn norm(&self) -> f64 {
        self.data.norm()
    }

    pub fn normalize(&self) -> Self {
        Quaternion {
            data: self.data.normalize(),
        }
    }

    pub fn conjugate(&self) -> Self {
        Quaternion::new(self.data[0], -self.data[1], -self.data[2], -self.data[3])
    }

    /// Multiplicative inverse. Equals the conjugate for unit quaternions.
    pub fn inverse(&self) -> Self {
        let norm_sq = self.data.norm_squared();
        let c = self.conjugate();
        Quaternion {
            data: c.data / norm_sq,
        }
    }

    pub fn to_rotation_matrix(&self) -> na::Matrix3<f64> {
        let q0 = self.data[0];
        let q1 = self.data[1];
        let q2 = self.data[2];
        let q3 = self.data[3];

        na::Matrix3::new(
            1.0-2.0*(q2*q2+q3*q3), 2.0*(q1*q2-q0*q3),     2.0*(q1*q3+q0*q2),
            2.0*(q1*q2+q0*q3),     1.0-2.0*(q1*q1+q3*q3), 2.0*(q2*q3-q0*q1),
            2.0*(q1*q3-q0*q2),     2.0*(q2*q3+q0*q1),     1.0-2.0*(q1*q1+q2*q2)
        )
    }

    /// Hamilton product `self ⊗ other`. Not normalized.
    pub fn multiply(&self, other: &Quaternion) -> Self {
        let s1 = self.scalar();
        let s2 = other.scalar();
        let v1 = self.vector();
        let v2 = other.vector();

        let s = s1 * s2 - v1.dot(&v2);
        let v = s1 * v2 + s2 * v1 + v1.cross(&v2);
        Quaternion::new(s, v[0], v[1], v[2])
    }

    /// Rotation angle (rad) of the attitude this quaternion represents.
    pub fn rotation_angle(&self) -> f64 {
        let q = self.normalize();
        2.0 * q.vector().norm().atan2(q.scalar().abs())
    }
}

impl Add for Quaternion {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Quaternion {
            data: self.data + other.data,
        }
    }
}

impl Mul<f64> for Quaternion {
    type Output = Self;

    fn mul(self, scalar: f64) -> Self {
        Quaternion {
            data: self.data * scalar,
        }
    }
}

/// Applies the rotation represented by `q` to `v`: the vector part of `q ⊗ (0, v) ⊗ q⁻¹`.
pub fn rotate_by_quaternion(v: &na::Vector3<f64>, q: &Quaternion) -> na::Vector3<f64> {
    q.multiply(&Quaternion::pure(v)).multiply(&q.inverse()).vector()
}

/// Kinematic rate `q̇ = ½ q ⊗ (0, ω)` with ω in the body frame.
pub fn compute_quaternion_derivative(q: &Quaternion, w: &na::Vector3<f64>) -> Quaternion {
    let wx = w[0];
    let wy = w[1];
    let wz = w[2];

    Quaternion::new(
        -0.5 * (q.data[1]*wx + q.data[2]*wy + q.data[3]*wz),
         0.5 * (q.data[0]*wx + q.data[2]*wz - q.data[3]*wy),
         0.5 * (q.data[0]*wy + q.data[3]*wx - q.data[1]*wz),
         0.5 * (q.data[0]*wz + q.data[1]*wy - q.data[2]*wx)
    )
}
