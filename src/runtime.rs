//! Process-wide bridge instance and host call surface.
//!
//! Scripting runtimes reach native code through free functions, so the
//! bridge lives in a process-wide slot with an explicit lifecycle:
//!
//! ```ignore
//! runtime::init(platform, sink, &config.sensors)?;
//! runtime::start_sensor_listening("accelerometer");
//! let values = runtime::get_sensor_values("accelerometer");
//! runtime::shutdown();
//! ```
//!
//! The host functions mirror the scripting contract one to one. Called
//! without an instance they log a warning and return the neutral value.

use crate::bridge::SensorBridge;
use crate::config::SensorConfig;
use crate::error::{BridgeError, Result};
use crate::platform::SensorPlatform;
use crate::sensors::{CallbackTarget, MessageSink};
use log::{info, warn};
use parking_lot::RwLock;
use std::sync::Arc;

static INSTANCE: RwLock<Option<Arc<SensorBridge>>> = RwLock::new(None);

/// Install the process-wide bridge.
///
/// Fails with [`BridgeError::AlreadyInitialized`] if one is installed.
pub fn init(
    platform: Arc<dyn SensorPlatform>,
    sink: Arc<dyn MessageSink>,
    config: &SensorConfig,
) -> Result<Arc<SensorBridge>> {
    let mut slot = INSTANCE.write();
    if slot.is_some() {
        return Err(BridgeError::AlreadyInitialized);
    }
    let bridge = Arc::new(SensorBridge::new(platform, sink, config));
    *slot = Some(bridge.clone());
    info!("[Runtime] Sensor bridge initialized");
    Ok(bridge)
}

/// Return the installed bridge, creating it with `factory` if absent.
///
/// The fast path only takes the read lock; construction happens at most once
/// even when several threads race here.
pub fn get_or_init<F>(factory: F) -> Arc<SensorBridge>
where
    F: FnOnce() -> SensorBridge,
{
    if let Some(bridge) = INSTANCE.read().as_ref() {
        return bridge.clone();
    }

    let mut slot = INSTANCE.write();
    if let Some(bridge) = slot.as_ref() {
        return bridge.clone();
    }
    let bridge = Arc::new(factory());
    *slot = Some(bridge.clone());
    info!("[Runtime] Sensor bridge initialized");
    bridge
}

/// The installed bridge, if any.
pub fn instance() -> Option<Arc<SensorBridge>> {
    INSTANCE.read().clone()
}

/// Terminate and remove the installed bridge.
///
/// Returns `false` if nothing was installed. A new bridge may be installed
/// afterwards.
pub fn shutdown() -> bool {
    let Some(bridge) = INSTANCE.write().take() else {
        return false;
    };
    bridge.terminate();
    info!("[Runtime] Sensor bridge shut down");
    true
}

fn with_instance<T>(call: &str, neutral: T, f: impl FnOnce(&SensorBridge) -> T) -> T {
    match instance() {
        Some(bridge) => f(&bridge),
        None => {
            warn!("[Runtime] {} called before init: {}", call, BridgeError::NotInitialized);
            neutral
        }
    }
}

/// Host call: `hasSensor(kind)`.
pub fn has_sensor(kind: &str) -> bool {
    with_instance("hasSensor", false, |b| b.has_sensor(kind))
}

/// Host call: `startSensorListening(kind)`.
pub fn start_sensor_listening(kind: &str) {
    with_instance("startSensorListening", (), |b| b.start_listening(kind))
}

/// Host call: `addSensorEventListener(kind, gameObjectName, methodName)`.
///
/// An empty object or method name registers the listener without a callback.
pub fn add_sensor_event_listener(kind: &str, object: &str, method: &str) {
    let callback = CallbackTarget::from_host(Some(object), Some(method));
    with_instance("addSensorEventListener", (), |b| b.add_listener(kind, callback))
}

/// Host call: `getSensorValues(kind)`.
pub fn get_sensor_values(kind: &str) -> Option<Vec<f32>> {
    with_instance("getSensorValues", None, |b| b.last_values(kind))
}

/// Host call: `setSamplingPeriod(samplingPeriodUs)`.
pub fn set_sampling_period(micros: i32) {
    with_instance("setSamplingPeriod", (), |b| {
        b.set_sampling_period_micros(i64::from(micros))
    })
}

/// Host call: `terminate()`.
///
/// Clears every listener but keeps the instance installed; use
/// [`shutdown`] to remove it.
pub fn terminate() {
    with_instance("terminate", (), |b| b.terminate())
}
