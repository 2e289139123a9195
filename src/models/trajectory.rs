use crate::coordinates::coordinate_transformation::Geodetic;
use crate::errors::SimResult;
use crate::fsm::DetumbleMode;
use crate::gnc::control::ControlCommand;
use crate::models::field::FieldSample;
use crate::models::state::AttitudeState;
use csv::Writer;
use hifitime::Epoch;
use nalgebra as na;
use std::fs::{self, File};
use std::io::Write;
use std::path::Path;

/// Everything recorded for one grid time `t_i`. The command is the one held over
/// `[t_i, t_{i+1}]`; the attitude is the state at `t_i`, before that interval.
#[derive(Debug, Clone, PartialEq)]
pub struct TrajectoryPoint {
    pub index: usize,
    pub time: f64,
    pub epoch: Epoch,
    pub position_eci: na::Vector3<f64>,
    pub geodetic: Geodetic,
    pub state: AttitudeState,
    pub field: FieldSample,
    /// Absent on the first step.
    pub b_dot: Option<na::Vector3<f64>>,
    pub command: ControlCommand,
    pub kinetic_energy: f64,
    pub mode: DetumbleMode,
}

const HEADER: [&str; 30] = [
    "Step",
    "Time (s)",
    "UTC Time",
    "Position X (km)",
    "Position Y (km)",
    "Position Z (km)",
    "Latitude (deg)",
    "Longitude (deg)",
    "Altitude (km)",
    "Quaternion W",
    "Quaternion X",
    "Quaternion Y",
    "Quaternion Z",
    "Angular Velocity X (rad/s)",
    "Angular Velocity Y (rad/s)",
    "Angular Velocity Z (rad/s)",
    "Field X (nT)",
    "Field Y (nT)",
    "Field Z (nT)",
    "B-dot X (nT/s)",
    "B-dot Y (nT/s)",
    "B-dot Z (nT/s)",
    "Dipole X (A⋅m²)",
    "Dipole Y (A⋅m²)",
    "Dipole Z (A⋅m²)",
    "Control Torque X (N⋅m)",
    "Control Torque Y (N⋅m)",
    "Control Torque Z (N⋅m)",
    "Kinetic Energy (J)",
    "Mode",
];

impl TrajectoryPoint {
    fn record(&self) -> Vec<String> {
        let q = self.state.quaternion.to_array();
        let w = &self.state.angular_velocity;
        let b = self.field.vector();
        let b_dot: [String; 3] = match &self.b_dot {
            Some(v) => [v.x.to_string(), v.y.to_string(), v.z.to_string()],
            None => Default::default(),
        };
        let m = &self.command.dipole;
        let tau = &self.command.torque;

        let mut record = vec![
            self.index.to_string(),
            self.time.to_string(),
            self.epoch.to_string(),
            (self.position_eci.x / 1000.0).to_string(),
            (self.position_eci.y / 1000.0).to_string(),
            (self.position_eci.z / 1000.0).to_string(),
            self.geodetic.latitude_deg().to_string(),
            self.geodetic.longitude_deg().to_string(),
            (self.geodetic.altitude / 1000.0).to_string(),
        ];
        record.extend(q.iter().map(f64::to_string));
        record.extend(w.iter().map(f64::to_string));
        record.extend(b.iter().map(f64::to_string));
        record.extend(b_dot);
        record.extend(m.iter().map(f64::to_string));
        record.extend(tau.iter().map(f64::to_string));
        record.push(self.kinetic_energy.to_string());
        record.push(self.mode.to_string());
        record
    }
}

/// Append-only record of a run, in step order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Trajectory {
    points: Vec<TrajectoryPoint>,
}

impl Trajectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            points: Vec::with_capacity(capacity),
        }
    }

    pub fn push(&mut self, point: TrajectoryPoint) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[TrajectoryPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&TrajectoryPoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&TrajectoryPoint> {
        self.points.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TrajectoryPoint> {
        self.points.iter()
    }

    pub fn into_points(self) -> Vec<TrajectoryPoint> {
        self.points
    }

    pub fn write_to<W: Write>(&self, writer: W) -> SimResult<()> {
        let mut writer = Writer::from_writer(writer);
        writer.write_record(HEADER)?;
        for point in &self.points {
            writer.write_record(point.record())?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Writes the trajectory as CSV, creating parent directories as needed.
    pub fn write_csv(&self, path: impl AsRef<Path>) -> SimResult<()> {
        let path = path.as_ref();
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)?;
        }
        self.write_to(File::create(path)?)
    }
}

impl<'a> IntoIterator for &'a Trajectory {
    type Item = &'a TrajectoryPoint;
    type IntoIter = std::slice::Iter<'a, TrajectoryPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}
