pub mod bdot;

pub use bdot::{estimate, BDotEstimator};
