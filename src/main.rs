use detumble_sim::config::SimulationConfig;
use detumble_sim::physics::energy::inertial_angular_momentum;
use detumble_sim::sim::Simulation;
use std::error::Error;
use std::path::Path;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Optional JSON configuration; the PyCubed/BEESAT-1 scenario otherwise
    let config = match std::env::args().nth(1) {
        Some(path) => SimulationConfig::from_json_file(path)?,
        None => SimulationConfig::default(),
    };

    let mut sim = Simulation::new(config)?;
    let inertia = sim.spacecraft().inertia;
    let initial_momentum = inertial_angular_momentum(sim.state(), &inertia);

    let result = sim.run();

    // Whatever was recorded is written out, even when a step failed
    let output = Path::new("output").join("detumble_trajectory.csv");
    sim.trajectory().write_csv(&output)?;
    let summary = result?;

    let final_momentum = inertial_angular_momentum(&summary.final_state, &inertia);
    println!(
        "Detumble finished after {} steps ({:.1} s): |ω| {:.5} -> {:.5} rad/s, |H| {:.4e} -> {:.4e} N⋅m⋅s, mode {}",
        summary.steps,
        summary.final_time,
        sim.trajectory()
            .first()
            .map(|p| p.state.angular_velocity.magnitude())
            .unwrap_or_default(),
        summary.final_state.angular_velocity.magnitude(),
        initial_momentum.magnitude(),
        final_momentum.magnitude(),
        summary.mode,
    );
    println!("Simulation data has been written to {}", output.display());

    Ok(())
}
