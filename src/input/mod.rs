//! Input sources for the sensor bridge.
//!
//! This module contains sources that feed readings into a platform adapter.
//!
//! Current input sources:
//! - `simulation`: random-walk readings for the simulated platform

pub mod simulation;
