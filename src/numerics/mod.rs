pub mod quaternion;

pub use quaternion::{compute_quaternion_derivative, rotate_by_quaternion, Quaternion};
