//! Platform sensor service port.
//!
//! The bridge never talks to sensor hardware directly. A [`SensorPlatform`]
//! implementation is injected at construction and provides:
//! - the [`SensorCatalog`] mapping kinds to platform sensor types
//! - lookup of the physical sensors of a type
//! - registration of [`SensorEventListener`]s at a sampling period
//!
//! Current adapters:
//! - `simulated`: in-memory platform driven by tests or a simulation task

pub mod simulated;

pub use simulated::SimulatedPlatform;

use crate::error::{BridgeError, Result};
use crate::sensors::kind::{SensorCatalog, SensorType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// One physical sensor exposed by the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SensorInfo {
    /// Platform-unique handle
    pub handle: u32,
    pub name: String,
    pub vendor: String,
    pub sensor_type: SensorType,
}

/// Raw event delivered by the platform.
#[derive(Debug, Clone, PartialEq)]
pub struct SensorEvent {
    pub sensor: SensorInfo,
    pub values: Vec<f32>,
    pub accuracy: i32,
    /// Event time in nanoseconds, platform clock
    pub timestamp_ns: i64,
}

/// Identity of a registered listener.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Allocate a process-unique id.
    pub fn next() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Receiver of raw platform events.
///
/// Callbacks run on the platform's delivery thread.
pub trait SensorEventListener: Send + Sync {
    fn id(&self) -> ListenerId;

    fn on_sensor_changed(&self, event: &SensorEvent);

    fn on_accuracy_changed(&self, sensor: &SensorInfo, accuracy: i32);
}

/// Requested interval between sensor events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SamplingPeriod(u32);

impl SamplingPeriod {
    /// As fast as the hardware allows.
    pub const FASTEST: Self = Self(0);
    /// Rate suitable for games (50 Hz).
    pub const GAME: Self = Self(20_000);
    /// Rate suitable for UI updates (~15 Hz).
    pub const UI: Self = Self(66_667);
    /// Rate suitable for screen orientation changes (5 Hz).
    pub const NORMAL: Self = Self(200_000);

    /// Validate a host-supplied period in microseconds.
    pub fn from_micros(micros: i64) -> Result<Self> {
        u32::try_from(micros)
            .map(Self)
            .map_err(|_| BridgeError::InvalidSamplingPeriod(micros))
    }

    pub fn as_micros(self) -> u32 {
        self.0
    }

    pub fn as_duration(self) -> std::time::Duration {
        std::time::Duration::from_micros(u64::from(self.0))
    }
}

impl Default for SamplingPeriod {
    fn default() -> Self {
        Self::GAME
    }
}

impl fmt::Display for SamplingPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}us", self.0)
    }
}

/// Platform sensor service.
///
/// Registration is assumed synchronous. Registering the same listener for
/// several sensors is allowed; unregistering removes it from all of them.
pub trait SensorPlatform: Send + Sync {
    /// Kind to sensor-type table of this platform.
    fn catalog(&self) -> &SensorCatalog;

    /// The default sensor of a type, if the device has one.
    fn default_sensor(&self, sensor_type: SensorType) -> Option<SensorInfo>;

    /// All sensors of a type.
    fn sensor_list(&self, sensor_type: SensorType) -> Vec<SensorInfo>;

    /// Start delivering events from `sensor` to `listener`.
    ///
    /// Returns `false` if the platform refused the registration.
    fn register_listener(
        &self,
        listener: Arc<dyn SensorEventListener>,
        sensor: &SensorInfo,
        period: SamplingPeriod,
    ) -> bool;

    /// Stop delivering events to the listener from every sensor.
    fn unregister_listener(&self, listener: ListenerId);
}
