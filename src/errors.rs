use crate::coordinates::frames::Frame;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("Invalid configuration: {what}")]
    Configuration { what: String },

    #[error("Invalid estimator interval: dt = {dt} (must be positive and finite)")]
    InvalidInterval { dt: f64 },

    #[error("Geodetic conversion undefined at radius {radius} m")]
    GeodeticSingularity { radius: f64 },

    #[error("Field model queried out of range: {what} = {value} (valid {min} .. {max})")]
    FieldModelOutOfRange {
        what: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("Field magnitude {magnitude} nT exceeds configured ceiling {ceiling} nT")]
    FieldMagnitudeExceeded { magnitude: f64, ceiling: f64 },

    #[error("Frame mismatch: expected {expected}, found {found}")]
    FrameMismatch { expected: Frame, found: Frame },

    #[error("Integration failed at t = {t} s: {what}")]
    IntegrationFailure { what: &'static str, t: f64 },

    #[error("Orbit propagation failed: {what}")]
    Propagation { what: String },

    #[error("Step {index} (t = {time} s) failed: {source}")]
    Step {
        index: usize,
        time: f64,
        #[source]
        source: Box<SimError>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    pub fn configuration(what: impl Into<String>) -> Self {
        SimError::Configuration { what: what.into() }
    }

    /// Strips the driver's step context, if any.
    pub fn root(&self) -> &SimError {
        match self {
            SimError::Step { source, .. } => source.root(),
            other => other,
        }
    }
}
