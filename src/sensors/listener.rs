//! Per-kind listener entry.
//!
//! One [`ListenerEntry`] exists for every sensor kind the host is listening
//! to. The platform delivers raw events for every physical sensor of that
//! kind to the entry, which caches the latest values and fans the reading
//! out to the callback set and the reading channel.

use super::callback::CallbackTarget;
use super::dispatch::{MessageSink, SensorReading};
use super::kind::SensorKind;
use super::payload::format_values;
use crate::platform::{ListenerId, SensorEvent, SensorEventListener, SensorInfo};
use log::{debug, trace};
use parking_lot::{Mutex, RwLock};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;

/// Event sink for one sensor kind.
///
/// Host calls (`add_callback`) and platform delivery (`on_sensor_changed`)
/// run on different threads. The callback set is locked for mutation and
/// dispatch iterates a snapshot, so adding a callback never races with an
/// in-flight event.
pub struct ListenerEntry {
    id: ListenerId,
    kind: SensorKind,
    sensors: Vec<SensorInfo>,
    last_values: RwLock<Option<Vec<f32>>>,
    callbacks: Mutex<HashSet<CallbackTarget>>,
    sink: Arc<dyn MessageSink>,
    readings: broadcast::Sender<SensorReading>,
    closed: AtomicBool,
}

impl ListenerEntry {
    /// Create an entry for `kind` covering the given physical sensors.
    pub fn new(
        kind: SensorKind,
        sensors: Vec<SensorInfo>,
        sink: Arc<dyn MessageSink>,
        readings: broadcast::Sender<SensorReading>,
    ) -> Self {
        Self {
            id: ListenerId::next(),
            kind,
            sensors,
            last_values: RwLock::new(None),
            callbacks: Mutex::new(HashSet::new()),
            sink,
            readings,
            closed: AtomicBool::new(false),
        }
    }

    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    /// Physical sensors this entry is registered for.
    pub fn sensors(&self) -> &[SensorInfo] {
        &self.sensors
    }

    /// Copy of the most recent reading, `None` until the first event.
    pub fn last_values(&self) -> Option<Vec<f32>> {
        self.last_values.read().clone()
    }

    /// Add a callback target. Returns `false` if it was already present.
    pub fn add_callback(&self, target: CallbackTarget) -> bool {
        let added = self.callbacks.lock().insert(target.clone());
        if added {
            debug!("[Sensor] {} callback added: {}", self.kind, target);
        }
        added
    }

    pub fn callback_count(&self) -> usize {
        self.callbacks.lock().len()
    }

    /// Stop dispatching. Events that arrive afterwards are dropped.
    pub fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

impl SensorEventListener for ListenerEntry {
    fn id(&self) -> ListenerId {
        self.id
    }

    fn on_sensor_changed(&self, event: &SensorEvent) {
        if self.is_closed() {
            trace!("[Sensor] {} closed, dropping event", self.kind);
            return;
        }

        *self.last_values.write() = Some(event.values.clone());

        // No subscribers is not an error
        let _ = self
            .readings
            .send(SensorReading::new(self.kind, event.values.clone()));

        let targets: Vec<CallbackTarget> = self.callbacks.lock().iter().cloned().collect();
        if targets.is_empty() {
            return;
        }
        let payload = format_values(&event.values);
        for target in &targets {
            self.sink.send(target.object(), target.method(), &payload);
        }
    }

    fn on_accuracy_changed(&self, sensor: &SensorInfo, accuracy: i32) {
        trace!(
            "[Sensor] {} accuracy changed to {} ({})",
            self.kind, accuracy, sensor.name
        );
    }
}
