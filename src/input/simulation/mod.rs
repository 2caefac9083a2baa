//! Simulated input for development without sensor hardware.

pub mod sensors;

pub use sensors::{ReadingGenerator, run_sensor_simulation};
