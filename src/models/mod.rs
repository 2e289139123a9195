pub mod field;
pub mod spacecraft;
pub mod state;
pub mod trajectory;

pub use field::FieldSample;
pub use spacecraft::{ActuatorLimit, InertiaTensor, Spacecraft};
pub use state::AttitudeState;
pub use trajectory::{Trajectory, TrajectoryPoint};
