pub mod driver;
pub mod sweep;

pub use driver::{Collaborators, RunSummary, Simulation};
pub use sweep::{angular_velocity_variants, run_sweep, SweepOutcome};
