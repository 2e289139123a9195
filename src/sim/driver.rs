//! Fixed-grid detumble simulation loop.
//!
//! Each step samples the geomagnetic field along the orbit, rotates it into the
//! body frame, estimates its rate, asks the controller for a dipole and holds the
//! resulting torque while the attitude is integrated across one interval.

use crate::config::SimulationConfig;
use crate::constants::QUATERNION_NORM_TOLERANCE;
use crate::coordinates::coordinate_transformation::{ecef_to_geodetic, eci_to_ecef_rotation};
use crate::coordinates::frames::{Frame, FrameContext, FrameVector};
use crate::coordinates::sidereal::{mjd_at, MeanSiderealTime, SiderealTime};
use crate::errors::{SimError, SimResult};
use crate::fsm::{DetumbleMode, DetumbleMonitor};
use crate::gnc::control::{ControlCommand, ControlInput, DetumbleController};
use crate::gnc::estimation::BDotEstimator;
use crate::integrators::{AnyIntegrator, Integrator};
use crate::models::{AttitudeState, FieldSample, Spacecraft, Trajectory, TrajectoryPoint};
use crate::physics::attitude::gravity_gradient_torque;
use crate::physics::dynamics::AttitudeDynamics;
use crate::physics::energy::rotational_kinetic_energy;
use crate::physics::magnetic_field::{DipoleFieldModel, MagneticFieldModel};
use crate::physics::orbital::{OrbitPropagator, Sgp4Propagator};
use crate::physics::tle::Tle;
use hifitime::{Duration, Epoch};
use tracing::{debug, info, warn};

// Upfront trajectory allocation; longer runs grow the buffer as they go
const PREALLOCATED_POINTS: usize = 1 << 16;

/// The external models a run queries every step.
pub struct Collaborators {
    pub propagator: Box<dyn OrbitPropagator>,
    pub field_model: Box<dyn MagneticFieldModel>,
    pub sidereal: Box<dyn SiderealTime>,
}

impl Collaborators {
    /// SGP4 orbit, IGRF-13 dipole field and mean sidereal time.
    pub fn reference() -> Self {
        Self {
            propagator: Box::new(Sgp4Propagator),
            field_model: Box::new(DipoleFieldModel::igrf13()),
            sidereal: Box::new(MeanSiderealTime),
        }
    }
}

/// End-of-run figures.
#[derive(Debug, Clone, PartialEq)]
pub struct RunSummary {
    pub steps: usize,
    /// Time of `final_state`, one interval past the last recorded point.
    pub final_time: f64,
    pub final_state: AttitudeState,
    pub initial_kinetic_energy: f64,
    pub final_kinetic_energy: f64,
    pub mode: DetumbleMode,
}

pub struct Simulation {
    config: SimulationConfig,
    spacecraft: Spacecraft,
    tle: Tle,
    epoch: Epoch,
    collaborators: Collaborators,
    controller: Box<dyn DetumbleController>,
    integrator: AnyIntegrator,
    state: AttitudeState,
    estimator: BDotEstimator,
    monitor: DetumbleMonitor,
    next_index: usize,
    num_steps: usize,
    failed: bool,
    trajectory: Trajectory,
}

impl Simulation {
    pub fn new(config: SimulationConfig) -> SimResult<Self> {
        let collaborators = Collaborators::reference();
        Self::with_collaborators(config, collaborators)
    }

    pub fn with_collaborators(
        config: SimulationConfig,
        collaborators: Collaborators,
    ) -> SimResult<Self> {
        config.validate()?;

        let spacecraft = config.spacecraft.build()?;
        let controller = config
            .control
            .build(spacecraft.actuators, config.field_scale);
        let num_steps = config.num_steps();
        let capacity = num_steps
            .min(config.max_steps.unwrap_or(usize::MAX))
            .min(PREALLOCATED_POINTS);

        Ok(Self {
            spacecraft,
            tle: config.tle()?,
            epoch: config.start_epoch()?,
            collaborators,
            controller,
            integrator: config.integrator.build(),
            state: config.initial_attitude.state()?,
            estimator: BDotEstimator::new(),
            monitor: DetumbleMonitor::new(config.monitor),
            next_index: 0,
            num_steps,
            failed: false,
            trajectory: Trajectory::with_capacity(capacity),
            config,
        })
    }

    /// Replaces the controller built from configuration.
    pub fn with_controller(mut self, controller: Box<dyn DetumbleController>) -> Self {
        self.controller = controller;
        self
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn spacecraft(&self) -> &Spacecraft {
        &self.spacecraft
    }

    /// Attitude at [`Simulation::time`].
    pub fn state(&self) -> &AttitudeState {
        &self.state
    }

    /// Simulation time of the current state.
    pub fn time(&self) -> f64 {
        self.grid_time(self.next_index)
    }

    pub fn steps_taken(&self) -> usize {
        self.next_index
    }

    pub fn num_steps(&self) -> usize {
        self.num_steps
    }

    pub fn mode(&self) -> DetumbleMode {
        self.monitor.mode()
    }

    pub fn trajectory(&self) -> &Trajectory {
        &self.trajectory
    }

    pub fn into_trajectory(self) -> Trajectory {
        self.trajectory
    }

    /// True at the end of the grid, at the step cap, once the monitor asks to
    /// stop, or after a step has failed.
    pub fn is_finished(&self) -> bool {
        self.failed
            || self.next_index >= self.num_steps
            || self.config.max_steps.is_some_and(|max| self.next_index >= max)
            || self.monitor.should_stop()
    }

    fn grid_time(&self, index: usize) -> f64 {
        self.config.start_offset + index as f64 * self.config.dt
    }

    /// Runs one step and returns its record, or `None` once the run is finished.
    ///
    /// A failed step leaves state, history and monitor as they were before it
    /// and ends the run.
    pub fn step(&mut self) -> SimResult<Option<&TrajectoryPoint>> {
        if self.is_finished() {
            return Ok(None);
        }

        let index = self.next_index;
        let time = self.grid_time(index);
        let point = match self.advance(index, time) {
            Ok(point) => point,
            Err(source) => {
                self.failed = true;
                return Err(SimError::Step {
                    index,
                    time,
                    source: Box::new(source),
                });
            }
        };

        self.trajectory.push(point);
        self.next_index += 1;
        Ok(self.trajectory.last())
    }

    fn advance(&mut self, index: usize, time: f64) -> SimResult<TrajectoryPoint> {
        let dt = self.config.dt;
        let epoch = self.epoch + Duration::from_seconds(time);

        let position_eci = self
            .collaborators
            .propagator
            .position(&self.tle, self.epoch, time)?;
        let sidereal_angle = self
            .collaborators
            .sidereal
            .sidereal_angle(mjd_at(self.epoch, time));
        let geodetic = ecef_to_geodetic(&(eci_to_ecef_rotation(sidereal_angle) * position_eci))?;

        let field_ned = self.collaborators.field_model.field_ned(&geodetic, epoch)?;
        let field_ned = self.config.field_clamp.apply(field_ned)?;

        let ctx = FrameContext {
            sidereal_angle,
            geodetic,
            attitude: self.state.quaternion,
        };
        let field_body = FrameVector::new(field_ned, Frame::LocalTangentNed).transform_path(
            &[Frame::EarthFixed, Frame::Inertial, Frame::Body],
            &ctx,
        )?;
        let field = FieldSample::new(field_body, time);

        let mut estimator = self.estimator.clone();
        let b_dot = estimator.update(field, dt)?;
        let command = match b_dot {
            Some(b_dot) => self.controller.command(&ControlInput {
                b_dot,
                field_body: *field.vector(),
                angular_velocity: self.state.angular_velocity,
            }),
            None => ControlCommand::zero(),
        };
        let kinetic_energy = rotational_kinetic_energy(&self.state, &self.spacecraft.inertia);

        let mut torque = command.torque;
        if self.config.gravity_gradient {
            torque += gravity_gradient_torque(
                &position_eci,
                &self.state.quaternion,
                &self.spacecraft.inertia,
            );
        }

        let eom = AttitudeDynamics::new(&self.spacecraft.inertia, torque);
        let mut next = self.integrator.integrate(&eom, &self.state, dt)?;

        let drift = next.quaternion_norm_error();
        if self.config.renormalize_quaternion {
            next = next.normalized();
        } else if drift > QUATERNION_NORM_TOLERANCE {
            warn!(index, time, drift, "quaternion norm drifted");
        }

        let mode = self
            .monitor
            .evaluate(time, &self.state.angular_velocity, b_dot.is_some());

        debug!(
            index,
            time,
            rate = self.state.angular_velocity.magnitude(),
            field_nt = field.field().magnitude(),
            kinetic_energy,
            %mode,
            "step"
        );

        let point = TrajectoryPoint {
            index,
            time,
            epoch,
            position_eci,
            geodetic,
            state: self.state,
            field,
            b_dot,
            command,
            kinetic_energy,
            mode,
        };
        self.estimator = estimator;
        self.state = next;
        Ok(point)
    }

    /// Runs to completion, handing every record to `on_step` as it is produced.
    pub fn run_with<F>(&mut self, mut on_step: F) -> SimResult<RunSummary>
    where
        F: FnMut(&TrajectoryPoint),
    {
        let initial_kinetic_energy =
            rotational_kinetic_energy(&self.state, &self.spacecraft.inertia);
        info!(
            steps = self.num_steps,
            dt = self.config.dt,
            control = ?self.config.control,
            "starting detumble run"
        );

        while let Some(point) = self.step()? {
            on_step(point);
        }

        let summary = RunSummary {
            steps: self.next_index,
            final_time: self.time(),
            final_state: self.state,
            initial_kinetic_energy,
            final_kinetic_energy: rotational_kinetic_energy(&self.state, &self.spacecraft.inertia),
            mode: self.monitor.mode(),
        };
        info!(
            steps = summary.steps,
            final_time = summary.final_time,
            rate = summary.final_state.angular_velocity.magnitude(),
            initial_kinetic_energy = summary.initial_kinetic_energy,
            final_kinetic_energy = summary.final_kinetic_energy,
            mode = %summary.mode,
            "detumble run finished"
        );
        Ok(summary)
    }

    pub fn run(&mut self) -> SimResult<RunSummary> {
        self.run_with(|_| {})
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coordinates::coordinate_transformation::Geodetic;
    use crate::integrators::{IntegratorConfig, Tolerances};
    use crate::physics::magnetic_field::{FieldClampPolicy, FieldModelValidity};
    use approx::assert_abs_diff_eq;
    use nalgebra as na;

    fn short_config(duration: f64) -> SimulationConfig {
        SimulationConfig {
            duration,
            ..Default::default()
        }
    }

    /// Same field everywhere, in NED.
    struct UniformField(na::Vector3<f64>);

    impl MagneticFieldModel for UniformField {
        fn validity(&self) -> FieldModelValidity {
            FieldModelValidity {
                min_altitude: f64::NEG_INFINITY,
                max_altitude: f64::INFINITY,
                min_year: f64::NEG_INFINITY,
                max_year: f64::INFINITY,
            }
        }

        fn field_ned(&self, _geodetic: &Geodetic, _epoch: Epoch) -> SimResult<na::Vector3<f64>> {
            Ok(self.0)
        }
    }

    #[test]
    fn grid_and_first_step() {
        let mut sim = Simulation::new(short_config(1.0)).unwrap();
        assert_eq!(sim.num_steps(), 10);

        let first = sim.step().unwrap().unwrap().clone();
        assert_eq!(first.index, 0);
        assert_eq!(first.time, 0.0);
        assert!(first.b_dot.is_none());
        assert_eq!(first.command, ControlCommand::zero());
        assert_eq!(first.mode, DetumbleMode::AwaitingHistory);
        assert_eq!(first.field.frame(), Frame::Body);

        let second = sim.step().unwrap().unwrap();
        assert_abs_diff_eq!(second.time, 0.1, epsilon = 1e-12);
        assert!(second.b_dot.is_some());
    }

    #[test]
    fn run_stops_at_grid_end() {
        let mut sim = Simulation::new(short_config(2.0)).unwrap();
        let mut seen = Vec::new();
        let summary = sim.run_with(|p| seen.push(p.index)).unwrap();

        assert_eq!(summary.steps, 20);
        assert_eq!(seen, (0..20).collect::<Vec<_>>());
        assert_abs_diff_eq!(summary.final_time, 2.0, epsilon = 1e-12);
        assert!(sim.step().unwrap().is_none());
    }

    #[test]
    fn max_steps_caps_run() {
        let config = SimulationConfig {
            max_steps: Some(3),
            ..short_config(10.0)
        };
        let mut sim = Simulation::new(config).unwrap();
        assert_eq!(sim.run().unwrap().steps, 3);
        assert_eq!(sim.trajectory().len(), 3);
    }

    #[test]
    fn step_cap_bounds_huge_grids() {
        let config = SimulationConfig {
            max_steps: Some(3),
            ..short_config(1.0e11)
        };
        let mut sim = Simulation::new(config).unwrap();
        assert_eq!(sim.num_steps(), 1_000_000_000_000);
        assert_eq!(sim.run().unwrap().steps, 3);
        assert_eq!(sim.trajectory().len(), 3);
    }

    #[test]
    fn failed_integration_ends_run_without_side_effects() {
        let config = SimulationConfig {
            integrator: IntegratorConfig::DormandPrince45 {
                tolerances: Tolerances {
                    rel: 1e-300,
                    abs: 1e-300,
                },
                max_steps: 1,
                min_step: 1e-12,
            },
            ..short_config(1.0)
        };
        let mut sim = Simulation::new(config).unwrap();
        let initial = *sim.state();

        let err = sim.step().unwrap_err();
        assert!(matches!(err, SimError::Step { index: 0, .. }));
        assert!(matches!(err.root(), SimError::IntegrationFailure { .. }));

        assert!(sim.estimator.previous().is_none());
        assert_eq!(sim.mode(), DetumbleMode::AwaitingHistory);
        assert_eq!(*sim.state(), initial);
        assert!(sim.is_finished());

        // Nothing further is recorded once a step has failed
        assert!(sim.step().unwrap().is_none());
        assert!(sim.trajectory().is_empty());
        assert_eq!(sim.steps_taken(), 0);
    }

    #[test]
    fn failure_after_history_keeps_last_committed_sample() {
        let mut config = short_config(1.0);
        config.field_clamp = FieldClampPolicy::Fail { ceiling: 1.0e5 };
        let mut sim = Simulation::new(config).unwrap();
        sim.step().unwrap();
        sim.step().unwrap();
        let mode = sim.mode();

        // Same grid, but the field now trips the ceiling
        sim.config.field_clamp = FieldClampPolicy::Fail { ceiling: 1.0 };
        assert!(sim.step().is_err());
        assert_abs_diff_eq!(sim.estimator.previous().unwrap().time(), 0.1, epsilon = 1e-12);
        assert_eq!(sim.mode(), mode);
        assert_eq!(sim.trajectory().len(), 2);
        assert!(sim.step().unwrap().is_none());
    }

    #[test]
    fn replacement_controller_drives_the_run() {
        struct FixedDipole(na::Vector3<f64>);

        impl DetumbleController for FixedDipole {
            fn command(&self, _input: &ControlInput) -> ControlCommand {
                ControlCommand {
                    dipole: self.0,
                    torque: na::Vector3::zeros(),
                }
            }
        }

        let dipole = na::Vector3::new(0.01, -0.02, 0.0);
        let mut sim = Simulation::new(short_config(0.5))
            .unwrap()
            .with_controller(Box::new(FixedDipole(dipole)));
        sim.run().unwrap();

        let points = sim.trajectory().points();
        assert_eq!(points[0].command, ControlCommand::zero());
        for point in &points[1..] {
            assert_eq!(point.command.dipole, dipole);
        }
    }

    #[test]
    fn field_failure_is_wrapped_with_step_context() {
        let mut config = short_config(1.0);
        config.field_clamp = FieldClampPolicy::Fail { ceiling: 100.0 };
        let collaborators = Collaborators {
            field_model: Box::new(UniformField(na::Vector3::new(2.0e4, 0.0, 4.0e4))),
            ..Collaborators::reference()
        };
        let mut sim = Simulation::with_collaborators(config, collaborators).unwrap();

        let err = sim.run().unwrap_err();
        assert!(matches!(err, SimError::Step { index: 0, .. }));
        assert!(matches!(err.root(), SimError::FieldMagnitudeExceeded { .. }));
        assert!(sim.trajectory().is_empty());
    }

    #[test]
    fn clamp_policy_limits_recorded_field() {
        let mut config = short_config(0.5);
        config.field_clamp = FieldClampPolicy::Clamp { ceiling: 1.0e4 };
        let collaborators = Collaborators {
            field_model: Box::new(UniformField(na::Vector3::new(3.0e4, 0.0, 4.0e4))),
            ..Collaborators::reference()
        };
        let mut sim = Simulation::with_collaborators(config, collaborators).unwrap();
        sim.run().unwrap();
        for point in sim.trajectory() {
            assert_abs_diff_eq!(point.field.field().magnitude(), 1.0e4, epsilon = 1e-6);
        }
    }

    #[test]
    fn renormalization_keeps_unit_quaternion() {
        let config = SimulationConfig {
            renormalize_quaternion: true,
            ..short_config(5.0)
        };
        let mut sim = Simulation::new(config).unwrap();
        sim.run().unwrap();
        assert_abs_diff_eq!(sim.state().quaternion.norm(), 1.0, epsilon = 1e-14);
    }

    #[test]
    fn gravity_gradient_changes_motion() {
        let base = short_config(5.0);
        let with_gg = SimulationConfig {
            gravity_gradient: true,
            spacecraft: crate::config::SpacecraftConfig {
                inertia: [[0.2, 0.0, 0.0], [0.0, 0.3, 0.0], [0.0, 0.0, 0.4]],
                ..Default::default()
            },
            ..base.clone()
        };
        let without_gg = SimulationConfig {
            gravity_gradient: false,
            ..with_gg.clone()
        };

        let a = Simulation::new(with_gg).unwrap().run().unwrap();
        let b = Simulation::new(without_gg).unwrap().run().unwrap();
        assert_ne!(a.final_state.angular_velocity, b.final_state.angular_velocity);
    }
}
