pub mod coordinate_transformation;
pub mod frames;
pub mod sidereal;

pub use coordinate_transformation::Geodetic;
pub use frames::{Frame, FrameContext, FrameVector};
pub use sidereal::{MeanSiderealTime, SiderealTime};
