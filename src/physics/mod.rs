pub mod attitude;
pub mod dynamics;
pub mod energy;
pub mod magnetic_field;
pub mod orbital;
pub mod tle;
