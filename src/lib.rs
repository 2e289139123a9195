pub mod config;
pub mod constants;
pub mod coordinates;
pub mod errors;
pub mod fsm;
pub mod gnc;
pub mod integrators;
pub mod models;
pub mod numerics;
pub mod physics;
pub mod sim;

pub use errors::{SimError, SimResult};
pub use sim::Simulation;
