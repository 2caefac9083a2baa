//! In-memory sensor platform.
//!
//! Holds a fixed list of installed sensors and a registration table.
//! Readings are injected with [`SimulatedPlatform::deliver`], either by
//! tests or by the simulation task in `input::simulation`.

use super::{
    ListenerId, SamplingPeriod, SensorEvent, SensorEventListener, SensorInfo, SensorPlatform,
};
use crate::sensors::kind::{SensorCatalog, SensorKind, SensorType};
use log::{debug, warn};
use parking_lot::Mutex;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

struct Registration {
    listener: Arc<dyn SensorEventListener>,
    sensor: SensorInfo,
    period: SamplingPeriod,
}

/// Simulated platform sensor service.
///
/// # Example
/// ```ignore
/// let platform = Arc::new(SimulatedPlatform::with_kinds([SensorKind::Accelerometer]));
/// // after a listener registered for the accelerometer:
/// platform.deliver(SensorKind::Accelerometer, &[0.0, 0.0, 9.81]);
/// ```
pub struct SimulatedPlatform {
    catalog: SensorCatalog,
    sensors: Vec<SensorInfo>,
    registrations: Mutex<Vec<Registration>>,
    register_calls: AtomicUsize,
    unregister_calls: AtomicUsize,
    started: Instant,
}

impl SimulatedPlatform {
    /// Create a platform with no sensors installed.
    pub fn new(catalog: SensorCatalog) -> Self {
        Self {
            catalog,
            sensors: Vec::new(),
            registrations: Mutex::new(Vec::new()),
            register_calls: AtomicUsize::new(0),
            unregister_calls: AtomicUsize::new(0),
            started: Instant::now(),
        }
    }

    /// Android catalog with one sensor installed per given kind.
    pub fn with_kinds(kinds: impl IntoIterator<Item = SensorKind>) -> Self {
        kinds
            .into_iter()
            .fold(Self::new(SensorCatalog::android()), |platform, kind| {
                platform.install(kind, format!("Simulated {}", kind))
            })
    }

    /// Install a sensor of `kind`. Several sensors of one kind are allowed.
    ///
    /// Kinds missing from the catalog are skipped.
    pub fn install(mut self, kind: SensorKind, name: impl Into<String>) -> Self {
        let Some(sensor_type) = self.catalog.sensor_type(kind) else {
            warn!("[Sim] {} has no sensor type in this catalog, not installed", kind);
            return self;
        };
        let handle = self.sensors.len() as u32 + 1;
        self.sensors.push(SensorInfo {
            handle,
            name: name.into(),
            vendor: "Simulated".to_string(),
            sensor_type,
        });
        self
    }

    /// Kinds that have at least one installed sensor.
    pub fn installed_kinds(&self) -> Vec<SensorKind> {
        let mut kinds: Vec<SensorKind> = self
            .sensors
            .iter()
            .filter_map(|s| self.catalog.kind_of(s.sensor_type))
            .collect();
        kinds.sort();
        kinds.dedup();
        kinds
    }

    /// Deliver a reading to every listener registered for sensors of `kind`.
    ///
    /// Returns the number of events delivered. Listeners are called after the
    /// registration lock is released, so they may call back into the platform.
    pub fn deliver(&self, kind: SensorKind, values: &[f32]) -> usize {
        let targets = self.targets_for(kind);
        let timestamp_ns = self.started.elapsed().as_nanos() as i64;
        for (listener, sensor) in &targets {
            let event = SensorEvent {
                sensor: sensor.clone(),
                values: values.to_vec(),
                accuracy: 3,
                timestamp_ns,
            };
            listener.on_sensor_changed(&event);
        }
        targets.len()
    }

    /// Report an accuracy change to every listener registered for `kind`.
    pub fn deliver_accuracy(&self, kind: SensorKind, accuracy: i32) -> usize {
        let targets = self.targets_for(kind);
        for (listener, sensor) in &targets {
            listener.on_accuracy_changed(sensor, accuracy);
        }
        targets.len()
    }

    /// Number of active (listener, sensor) registrations.
    pub fn registration_count(&self) -> usize {
        self.registrations.lock().len()
    }

    /// Active registrations for sensors of `kind`.
    pub fn registrations_for(&self, kind: SensorKind) -> Vec<(ListenerId, SamplingPeriod)> {
        let Some(sensor_type) = self.catalog.sensor_type(kind) else {
            return Vec::new();
        };
        self.registrations
            .lock()
            .iter()
            .filter(|r| r.sensor.sensor_type == sensor_type)
            .map(|r| (r.listener.id(), r.period))
            .collect()
    }

    /// Shortest period requested for `kind`, if anything is registered.
    pub fn period_for(&self, kind: SensorKind) -> Option<SamplingPeriod> {
        self.registrations_for(kind)
            .into_iter()
            .map(|(_, period)| period)
            .min()
    }

    /// Total `register_listener` calls so far.
    pub fn register_calls(&self) -> usize {
        self.register_calls.load(Ordering::SeqCst)
    }

    /// Total `unregister_listener` calls so far.
    pub fn unregister_calls(&self) -> usize {
        self.unregister_calls.load(Ordering::SeqCst)
    }

    fn sensors_of(&self, sensor_type: SensorType) -> impl Iterator<Item = &SensorInfo> {
        self.sensors
            .iter()
            .filter(move |s| s.sensor_type == sensor_type)
    }

    fn targets_for(&self, kind: SensorKind) -> Vec<(Arc<dyn SensorEventListener>, SensorInfo)> {
        let Some(sensor_type) = self.catalog.sensor_type(kind) else {
            return Vec::new();
        };
        self.registrations
            .lock()
            .iter()
            .filter(|r| r.sensor.sensor_type == sensor_type)
            .map(|r| (r.listener.clone(), r.sensor.clone()))
            .collect()
    }
}

impl SensorPlatform for SimulatedPlatform {
    fn catalog(&self) -> &SensorCatalog {
        &self.catalog
    }

    fn default_sensor(&self, sensor_type: SensorType) -> Option<SensorInfo> {
        self.sensors_of(sensor_type).next().cloned()
    }

    fn sensor_list(&self, sensor_type: SensorType) -> Vec<SensorInfo> {
        self.sensors_of(sensor_type).cloned().collect()
    }

    fn register_listener(
        &self,
        listener: Arc<dyn SensorEventListener>,
        sensor: &SensorInfo,
        period: SamplingPeriod,
    ) -> bool {
        self.register_calls.fetch_add(1, Ordering::SeqCst);
        if !self.sensors.iter().any(|s| s.handle == sensor.handle) {
            warn!("[Sim] Sensor {} is not installed", sensor.name);
            return false;
        }

        let id = listener.id();
        let mut registrations = self.registrations.lock();
        if let Some(existing) = registrations
            .iter_mut()
            .find(|r| r.listener.id() == id && r.sensor.handle == sensor.handle)
        {
            existing.period = period;
        } else {
            registrations.push(Registration {
                listener,
                sensor: sensor.clone(),
                period,
            });
        }
        debug!("[Sim] Listener {} registered for {} at {}", id, sensor.name, period);
        true
    }

    fn unregister_listener(&self, listener: ListenerId) {
        self.unregister_calls.fetch_add(1, Ordering::SeqCst);
        self.registrations
            .lock()
            .retain(|r| r.listener.id() != listener);
        debug!("[Sim] Listener {} unregistered", listener);
    }
}
