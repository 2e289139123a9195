use super::spacecraft::SpacecraftConfig;
use crate::errors::{SimError, SimResult};
use crate::fsm::MonitorConfig;
use crate::gnc::control::detumble_controller::default_field_scale;
use crate::gnc::control::ControlLaw;
use crate::integrators::IntegratorConfig;
use crate::models::AttitudeState;
use crate::numerics::quaternion::Quaternion;
use crate::physics::magnetic_field::FieldClampPolicy;
use crate::physics::tle::Tle;
use hifitime::Epoch;
use nalgebra as na;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

/// BEESAT-1 element set used by the reference scenario.
pub const BEESAT1_LINE1: &str =
    "1 35933U 09051C   19315.45643387  .00000096  00000-0  32767-4 0  9991";
pub const BEESAT1_LINE2: &str =
    "2 35933  98.6009 127.6424 0006914  92.0098 268.1890 14.56411486538102";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrbitConfig {
    pub tle_line1: String,
    pub tle_line2: String,
}

impl Default for OrbitConfig {
    fn default() -> Self {
        Self {
            tle_line1: BEESAT1_LINE1.to_string(),
            tle_line2: BEESAT1_LINE2.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialAttitude {
    /// Body-to-inertial, scalar first.
    pub quaternion: [f64; 4],
    /// Body frame, rad/s.
    pub angular_velocity: [f64; 3],
}

impl Default for InitialAttitude {
    fn default() -> Self {
        Self {
            quaternion: [1.0, 0.0, 0.0, 0.0],
            angular_velocity: [0.01, 0.05, -0.03],
        }
    }
}

impl InitialAttitude {
    pub fn state(&self) -> SimResult<AttitudeState> {
        AttitudeState::from_initial_conditions(
            Quaternion::from_array(self.quaternion),
            na::Vector3::from(self.angular_velocity),
        )
    }
}

/// One immutable bundle of everything a run needs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub spacecraft: SpacecraftConfig,
    pub initial_attitude: InitialAttitude,
    pub orbit: OrbitConfig,
    /// Start epoch, e.g. `2019-12-30T00:00:00 UTC`.
    pub epoch: String,
    /// Elapsed seconds at step 0.
    pub start_offset: f64,
    pub duration: f64,
    pub dt: f64,
    /// Raw field units to tesla.
    pub field_scale: f64,
    pub control: ControlLaw,
    pub integrator: IntegratorConfig,
    pub field_clamp: FieldClampPolicy,
    pub gravity_gradient: bool,
    pub renormalize_quaternion: bool,
    pub monitor: MonitorConfig,
    /// Optional cap on executed steps.
    pub max_steps: Option<usize>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            spacecraft: SpacecraftConfig::default(),
            initial_attitude: InitialAttitude::default(),
            orbit: OrbitConfig::default(),
            epoch: "2019-12-30T00:00:00 UTC".to_string(),
            start_offset: 0.0,
            duration: 600.0,
            dt: 0.1,
            field_scale: default_field_scale(),
            control: ControlLaw::default(),
            integrator: IntegratorConfig::default(),
            field_clamp: FieldClampPolicy::default(),
            gravity_gradient: false,
            renormalize_quaternion: false,
            monitor: MonitorConfig::default(),
            max_steps: None,
        }
    }
}

impl SimulationConfig {
    pub fn from_json_str(json: &str) -> SimResult<Self> {
        let config: SimulationConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> SimResult<Self> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn start_epoch(&self) -> SimResult<Epoch> {
        Epoch::from_str(self.epoch.trim())
            .map_err(|e| SimError::configuration(format!("bad epoch '{}': {e}", self.epoch)))
    }

    pub fn tle(&self) -> SimResult<Tle> {
        Tle::parse(&self.orbit.tle_line1, &self.orbit.tle_line2)
    }

    /// Number of recorded steps on the grid `start_offset + i·dt`.
    pub fn num_steps(&self) -> usize {
        // Absorbs round-off such as 0.3 / 0.1 = 2.9999999999999996
        (self.duration / self.dt + 1e-9).floor() as usize
    }

    pub fn validate(&self) -> SimResult<()> {
        if !(self.dt.is_finite() && self.dt > 0.0) {
            return Err(SimError::configuration(format!(
                "time step must be positive, got {}",
                self.dt
            )));
        }
        if !(self.duration.is_finite() && self.duration > 0.0) {
            return Err(SimError::configuration(format!(
                "duration must be positive, got {}",
                self.duration
            )));
        }
        if self.duration < self.dt {
            return Err(SimError::configuration(
                "duration is shorter than one time step",
            ));
        }
        if !self.start_offset.is_finite() {
            return Err(SimError::configuration("start offset is not finite"));
        }
        if !(self.field_scale.is_finite() && self.field_scale > 0.0) {
            return Err(SimError::configuration("field scale must be positive"));
        }
        if let Some(gain) = self.control.gain() {
            if !gain.is_finite() {
                return Err(SimError::configuration("controller gain is not finite"));
            }
        }
        if !(self.monitor.detumbled_rate > 0.0 && self.monitor.dwell_time >= 0.0) {
            return Err(SimError::configuration(
                "monitor threshold must be positive and dwell time non-negative",
            ));
        }

        self.spacecraft.build()?;
        self.initial_attitude.state()?;
        self.tle()?;
        self.start_epoch()?;
        self.integrator.validate()?;
        self.field_clamp.validate()
    }
}
