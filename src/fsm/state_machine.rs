use super::spacecraft_states::DetumbleMode;
use nalgebra as na;
use serde::{Deserialize, Serialize};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonitorConfig {
    /// Body rate magnitude (rad/s) below which the vehicle counts as detumbled.
    #[serde(default = "default_detumbled_rate")]
    pub detumbled_rate: f64,
    /// Time the rate must stay below the threshold before declaring success.
    #[serde(default)]
    pub dwell_time: f64,
    #[serde(default)]
    pub stop_when_detumbled: bool,
}

fn default_detumbled_rate() -> f64 {
    0.01
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            detumbled_rate: default_detumbled_rate(),
            dwell_time: 0.0,
            stop_when_detumbled: false,
        }
    }
}

/// Tracks detumble progress from the body rate. Observation only; it never
/// feeds back into the control law.
#[derive(Debug, Clone)]
pub struct DetumbleMonitor {
    config: MonitorConfig,
    mode: DetumbleMode,
    below_since: Option<f64>,
    last_mode_change: f64,
}

impl DetumbleMonitor {
    pub fn new(config: MonitorConfig) -> Self {
        Self {
            config,
            mode: DetumbleMode::AwaitingHistory,
            below_since: None,
            last_mode_change: 0.0,
        }
    }

    pub fn mode(&self) -> DetumbleMode {
        self.mode
    }

    pub fn last_mode_change(&self) -> f64 {
        self.last_mode_change
    }

    pub fn is_detumbled(&self) -> bool {
        self.mode == DetumbleMode::Detumbled
    }

    fn transition_to(&mut self, mode: DetumbleMode, time: f64, rate: f64) {
        if self.mode != mode {
            info!(
                time,
                rate,
                from = %self.mode,
                to = %mode,
                "detumble mode change"
            );
            self.mode = mode;
            self.last_mode_change = time;
        }
    }

    /// Feeds one step. `has_history` is false until the estimator has a previous sample.
    pub fn evaluate(
        &mut self,
        time: f64,
        angular_velocity: &na::Vector3<f64>,
        has_history: bool,
    ) -> DetumbleMode {
        let rate = angular_velocity.magnitude();
        if !has_history {
            self.below_since = None;
            self.transition_to(DetumbleMode::AwaitingHistory, time, rate);
            return self.mode;
        }

        if rate < self.config.detumbled_rate {
            let since = *self.below_since.get_or_insert(time);
            if time - since >= self.config.dwell_time {
                self.transition_to(DetumbleMode::Detumbled, time, rate);
            } else {
                self.transition_to(DetumbleMode::Detumbling, time, rate);
            }
        } else {
            self.below_since = None;
            self.transition_to(DetumbleMode::Detumbling, time, rate);
        }
        self.mode
    }

    /// Whether the run should end now.
    pub fn should_stop(&self) -> bool {
        self.config.stop_when_detumbled && self.is_detumbled()
    }
}
