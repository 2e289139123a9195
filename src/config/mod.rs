pub mod simulation;
pub mod spacecraft;

pub use simulation::{InitialAttitude, OrbitConfig, SimulationConfig};
pub use spacecraft::{PyCubed, SpacecraftConfig};
