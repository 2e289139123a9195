use super::driver::{RunSummary, Simulation};
use crate::config::SimulationConfig;
use crate::errors::SimResult;
use crate::models::Trajectory;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;
use tracing::info;

#[derive(Debug, Clone)]
pub struct SweepOutcome {
    pub config: SimulationConfig,
    pub summary: RunSummary,
    pub trajectory: Trajectory,
}

/// Runs every configuration as an independent simulation on the rayon pool.
/// Results come back in input order.
pub fn run_sweep(configs: Vec<SimulationConfig>) -> Vec<SimResult<SweepOutcome>> {
    info!(runs = configs.len(), "starting sweep");
    configs
        .into_par_iter()
        .map(|config| {
            let mut sim = Simulation::new(config.clone())?;
            let summary = sim.run()?;
            Ok(SweepOutcome {
                config,
                summary,
                trajectory: sim.into_trajectory(),
            })
        })
        .collect()
}

/// `count` copies of `base` whose initial body rates are drawn uniformly from
/// `[-max_rate, max_rate]` per axis. The same seed gives the same variants.
pub fn angular_velocity_variants(
    base: &SimulationConfig,
    count: usize,
    max_rate: f64,
    seed: u64,
) -> Vec<SimulationConfig> {
    let mut rng = StdRng::seed_from_u64(seed);
    let max_rate = max_rate.abs();
    (0..count)
        .map(|_| {
            let mut config = base.clone();
            config.initial_attitude.angular_velocity = if max_rate > 0.0 {
                [
                    rng.gen_range(-max_rate..=max_rate),
                    rng.gen_range(-max_rate..=max_rate),
                    rng.gen_range(-max_rate..=max_rate),
                ]
            } else {
                [0.0; 3]
            };
            config
        })
        .collect()
}
