pub mod control;
pub mod estimation;
