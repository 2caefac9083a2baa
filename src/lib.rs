//! Sensor Bridge library.
//!
//! Exposes device sensors to a game engine's scripting layer: availability
//! checks, listening, polling the latest values, sampling-rate control and
//! push callbacks into scripting objects when readings arrive.
//!
//! The platform sensor service is injected through the
//! [`platform::SensorPlatform`] port; outbound callbacks go through a
//! [`sensors::MessageSink`].

pub mod bridge;
pub mod config;
pub mod error;
pub mod input;
pub mod platform;
pub mod runtime;
pub mod sensors;

pub use bridge::SensorBridge;
pub use error::{BridgeError, Result};
