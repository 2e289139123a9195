pub mod spacecraft_states;
pub mod state_machine;

pub use spacecraft_states::DetumbleMode;
pub use state_machine::{DetumbleMonitor, MonitorConfig};
