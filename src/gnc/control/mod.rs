pub mod detumble_controller;

pub use detumble_controller::{
    BCrossController, BangBangController, ControlCommand, ControlInput, ControlLaw,
    DetumbleController, ProportionalBDotController,
};
