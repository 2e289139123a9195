use crate::errors::SimResult;
use crate::models::spacecraft::{ActuatorLimit, InertiaTensor, Spacecraft};
use nalgebra as na;
use serde::{Deserialize, Serialize};

/// PyCubed 1U CubeSat with three air-core torque coils.
pub struct PyCubed;

impl PyCubed {
    pub const INERTIA_DIAGONAL: f64 = 0.34375; // kg·m²
    pub const MAX_DIPOLE: [f64; 3] = [8.8e-3, 1.373e-2, 8.2e-3]; // A·m²

    pub fn inertia_rows() -> [[f64; 3]; 3] {
        let i = Self::INERTIA_DIAGONAL;
        [[i, 0.0, 0.0], [0.0, i, 0.0], [0.0, 0.0, i]]
    }
}

/// Vehicle parameters as written in a configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpacecraftConfig {
    pub inertia: [[f64; 3]; 3],
    pub max_dipole: [f64; 3],
}

impl Default for SpacecraftConfig {
    fn default() -> Self {
        Self {
            inertia: PyCubed::inertia_rows(),
            max_dipole: PyCubed::MAX_DIPOLE,
        }
    }
}

impl SpacecraftConfig {
    pub fn build(&self) -> SimResult<Spacecraft> {
        Ok(Spacecraft {
            inertia: InertiaTensor::from_rows(self.inertia)?,
            actuators: ActuatorLimit::new(na::Vector3::from(self.max_dipole))?,
        })
    }
}
