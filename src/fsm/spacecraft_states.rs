use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DetumbleMode {
    /// No field history yet, so no command has been issued.
    AwaitingHistory,
    Detumbling,
    Detumbled,
}

impl fmt::Display for DetumbleMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DetumbleMode::AwaitingHistory => write!(f, "Awaiting History"),
            DetumbleMode::Detumbling => write!(f, "Detumbling"),
            DetumbleMode::Detumbled => write!(f, "Detumbled"),
        }
    }
}
