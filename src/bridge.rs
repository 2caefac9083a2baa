//! Sensor bridge facade.
//!
//! [`SensorBridge`] is the surface the scripting host talks to. It owns the
//! registry of [`ListenerEntry`]s, one per sensor kind, created lazily on the
//! first listen request and dropped only by [`SensorBridge::terminate`].
//!
//! Host-facing operations never fail: unknown sensor names are logged and
//! answered with a neutral value (`false`, no-op, `None`).

use crate::config::SensorConfig;
use crate::error::Result;
use crate::platform::{SamplingPeriod, SensorEventListener, SensorPlatform};
use crate::sensors::{CallbackTarget, ListenerEntry, MessageSink, SensorKind, SensorReading};
use log::{debug, info, warn};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Capacity of the structured reading channel. Slow subscribers lag and
/// skip readings rather than blocking delivery.
const READING_CHANNEL_CAPACITY: usize = 256;

pub struct SensorBridge {
    platform: Arc<dyn SensorPlatform>,
    sink: Arc<dyn MessageSink>,
    registry: Mutex<HashMap<SensorKind, Arc<ListenerEntry>>>,
    sampling_period: Mutex<SamplingPeriod>,
    readings: broadcast::Sender<SensorReading>,
}

impl SensorBridge {
    /// Create a bridge over an injected platform and message sink.
    pub fn new(
        platform: Arc<dyn SensorPlatform>,
        sink: Arc<dyn MessageSink>,
        config: &SensorConfig,
    ) -> Self {
        let (readings, _) = broadcast::channel(READING_CHANNEL_CAPACITY);
        Self {
            platform,
            sink,
            registry: Mutex::new(HashMap::new()),
            sampling_period: Mutex::new(config.sampling_period),
            readings,
        }
    }

    /// Whether the device has at least one sensor of the named kind.
    ///
    /// Unknown names return `false`.
    pub fn has_sensor(&self, kind: &str) -> bool {
        match self.platform.catalog().resolve(kind) {
            Ok((_, sensor_type)) => self.platform.default_sensor(sensor_type).is_some(),
            Err(e) => {
                warn!("[Bridge] {}", e);
                false
            }
        }
    }

    /// Start listening to a sensor kind without a callback.
    pub fn start_listening(&self, kind: &str) {
        self.add_listener(kind, None);
    }

    /// Start listening to a sensor kind and optionally add a callback.
    ///
    /// The listener entry is created and registered on first use; later calls
    /// only add the callback. Adding a callback that is already present is a
    /// no-op.
    pub fn add_listener(&self, kind: &str, callback: Option<CallbackTarget>) {
        if let Err(e) = self.try_add_listener(kind, callback) {
            warn!("[Bridge] {}", e);
        }
    }

    fn try_add_listener(&self, kind: &str, callback: Option<CallbackTarget>) -> Result<()> {
        let (kind, sensor_type) = self.platform.catalog().resolve(kind)?;

        let entry = {
            let mut registry = self.registry.lock();
            match registry.get(&kind).cloned() {
                Some(entry) => entry,
                None => {
                    let sensors = self.platform.sensor_list(sensor_type);
                    if sensors.is_empty() {
                        warn!("[Bridge] No {} sensor on this device", kind);
                    }
                    let entry = Arc::new(ListenerEntry::new(
                        kind,
                        sensors,
                        self.sink.clone(),
                        self.readings.clone(),
                    ));
                    let period = *self.sampling_period.lock();
                    self.register(&entry, period);
                    info!(
                        "[Bridge] Listening to {} ({} sensor(s)) at {}",
                        kind,
                        entry.sensors().len(),
                        period
                    );
                    registry.insert(kind, entry.clone());
                    entry
                }
            }
        };

        if let Some(callback) = callback {
            entry.add_callback(callback);
        }
        Ok(())
    }

    /// Latest reading of a kind.
    ///
    /// `None` if nobody is listening to the kind or no event arrived yet.
    pub fn last_values(&self, kind: &str) -> Option<Vec<f32>> {
        let kind = SensorKind::parse(kind)?;
        let entry = self.registry.lock().get(&kind).cloned()?;
        entry.last_values()
    }

    /// Change the sampling period of every active listener.
    ///
    /// Each listener is unregistered and registered again at the new period,
    /// so delivery pauses briefly.
    pub fn set_sampling_period(&self, period: SamplingPeriod) {
        *self.sampling_period.lock() = period;

        let registry = self.registry.lock();
        for entry in registry.values() {
            self.platform.unregister_listener(entry.id());
            self.register(entry, period);
        }
        info!(
            "[Bridge] Sampling period set to {} ({} listener(s))",
            period,
            registry.len()
        );
    }

    /// Host variant of [`Self::set_sampling_period`] taking raw microseconds.
    ///
    /// Out of range values are logged and ignored.
    pub fn set_sampling_period_micros(&self, micros: i64) {
        match SamplingPeriod::from_micros(micros) {
            Ok(period) => self.set_sampling_period(period),
            Err(e) => warn!("[Bridge] {}", e),
        }
    }

    /// Unregister every listener and clear the registry.
    ///
    /// Calling this with nothing registered is a no-op.
    pub fn terminate(&self) {
        let mut registry = self.registry.lock();
        info!("[Bridge] Terminating ({} listener(s))", registry.len());
        for (kind, entry) in registry.drain() {
            self.platform.unregister_listener(entry.id());
            entry.close();
            debug!("[Bridge] {} listener removed", kind);
        }
    }

    /// Subscribe to structured readings of every active kind.
    pub fn subscribe(&self) -> broadcast::Receiver<SensorReading> {
        self.readings.subscribe()
    }

    /// Kinds with an active listener, sorted.
    pub fn active_kinds(&self) -> Vec<SensorKind> {
        let mut kinds: Vec<SensorKind> = self.registry.lock().keys().copied().collect();
        kinds.sort();
        kinds
    }

    pub fn sampling_period(&self) -> SamplingPeriod {
        *self.sampling_period.lock()
    }

    /// Number of callbacks registered for a kind.
    pub fn callback_count(&self, kind: &str) -> usize {
        SensorKind::parse(kind)
            .and_then(|kind| self.registry.lock().get(&kind).cloned())
            .map_or(0, |entry| entry.callback_count())
    }

    pub fn platform(&self) -> &Arc<dyn SensorPlatform> {
        &self.platform
    }

    fn register(&self, entry: &Arc<ListenerEntry>, period: SamplingPeriod) {
        for sensor in entry.sensors() {
            if !self
                .platform
                .register_listener(entry.clone(), sensor, period)
            {
                warn!(
                    "[Bridge] Platform refused {} registration for {}",
                    entry.kind(),
                    sensor.name
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::SimulatedPlatform;
    use crate::sensors::{ChannelSink, HostMessage};
    use tokio::sync::mpsc;

    fn bridge_with(
        kinds: &[SensorKind],
    ) -> (
        SensorBridge,
        Arc<SimulatedPlatform>,
        mpsc::UnboundedReceiver<HostMessage>,
    ) {
        let platform = Arc::new(SimulatedPlatform::with_kinds(kinds.iter().copied()));
        let (sink, rx) = ChannelSink::new();
        let bridge = SensorBridge::new(platform.clone(), Arc::new(sink), &SensorConfig::default());
        (bridge, platform, rx)
    }

    #[test]
    fn test_gyroscope_scenario() {
        let (bridge, platform, mut rx) = bridge_with(&[SensorKind::Gyroscope]);

        bridge.add_listener("gyroscope", Some(CallbackTarget::new("Player", "OnGyro")));
        platform.deliver(SensorKind::Gyroscope, &[0.1, 0.2, 9.8]);

        assert_eq!(bridge.last_values("gyroscope"), Some(vec![0.1, 0.2, 9.8]));
        assert_eq!(
            rx.try_recv().unwrap(),
            HostMessage {
                object: "Player".to_string(),
                method: "OnGyro".to_string(),
                payload: "[0.1, 0.2, 9.8]".to_string(),
            }
        );
    }

    #[test]
    fn test_has_sensor() {
        let (bridge, _platform, _rx) = bridge_with(&[SensorKind::Accelerometer]);

        assert!(bridge.has_sensor("accelerometer"));
        assert!(bridge.has_sensor("ACCELEROMETER"));
        assert!(!bridge.has_sensor("gyroscope"));
        assert!(!bridge.has_sensor("not_a_real_sensor"));
    }

    #[test]
    fn test_name_variants_share_one_entry() {
        let (bridge, platform, _rx) = bridge_with(&[SensorKind::Accelerometer]);

        bridge.start_listening("ACCELEROMETER");
        bridge.start_listening("accelerometer");
        bridge.start_listening("accel_erometer");

        assert_eq!(bridge.active_kinds(), vec![SensorKind::Accelerometer]);
        assert_eq!(platform.registration_count(), 1);
        assert_eq!(platform.register_calls(), 1);
    }

    #[test]
    fn test_unknown_kind_is_noop() {
        let (bridge, platform, _rx) = bridge_with(&[SensorKind::Accelerometer]);

        bridge.add_listener("barometer", Some(CallbackTarget::new("Player", "OnBaro")));

        assert!(bridge.active_kinds().is_empty());
        assert_eq!(platform.register_calls(), 0);
        assert_eq!(bridge.last_values("barometer"), None);
    }

    #[test]
    fn test_duplicate_callback_notified_once() {
        let (bridge, platform, mut rx) = bridge_with(&[SensorKind::Light]);

        bridge.add_listener("light", Some(CallbackTarget::new("Hud", "OnLight")));
        bridge.add_listener("LIGHT", Some(CallbackTarget::new("Hud", "OnLight")));
        assert_eq!(bridge.callback_count("light"), 1);

        platform.deliver(SensorKind::Light, &[300.0]);
        assert_eq!(rx.try_recv().unwrap().payload, "[300.0]");
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_last_values_before_and_after_delivery() {
        let (bridge, platform, _rx) = bridge_with(&[SensorKind::Accelerometer]);

        assert_eq!(bridge.last_values("accelerometer"), None);
        bridge.start_listening("accelerometer");
        assert_eq!(bridge.last_values("accelerometer"), None);

        platform.deliver(SensorKind::Accelerometer, &[0.0, 9.8, 0.0]);
        platform.deliver(SensorKind::Accelerometer, &[0.0, 0.0, 9.8]);
        assert_eq!(bridge.last_values("Accelerometer"), Some(vec![0.0, 0.0, 9.8]));
    }

    #[test]
    fn test_listener_covers_every_sensor_of_kind() {
        let platform = Arc::new(
            SimulatedPlatform::with_kinds([SensorKind::Accelerometer])
                .install(SensorKind::Accelerometer, "Wrist accelerometer"),
        );
        let (sink, _rx) = ChannelSink::new();
        let bridge = SensorBridge::new(platform.clone(), Arc::new(sink), &SensorConfig::default());

        bridge.start_listening("accelerometer");

        assert_eq!(platform.registration_count(), 2);
        assert_eq!(platform.deliver(SensorKind::Accelerometer, &[1.0, 1.0, 1.0]), 2);
    }

    #[test]
    fn test_missing_hardware_still_creates_entry() {
        let (bridge, platform, _rx) = bridge_with(&[]);

        bridge.start_listening("heart_rate");

        assert_eq!(bridge.active_kinds(), vec![SensorKind::HeartRate]);
        assert_eq!(platform.registration_count(), 0);
        assert_eq!(bridge.last_values("heartrate"), None);
    }

    #[test]
    fn test_set_sampling_period_reregisters() {
        let (bridge, platform, _rx) =
            bridge_with(&[SensorKind::Accelerometer, SensorKind::Gyroscope]);
        bridge.start_listening("accelerometer");
        bridge.start_listening("gyroscope");
        assert_eq!(
            platform.period_for(SensorKind::Accelerometer),
            Some(SamplingPeriod::GAME)
        );

        bridge.set_sampling_period_micros(100_000);

        assert_eq!(bridge.sampling_period().as_micros(), 100_000);
        assert_eq!(platform.unregister_calls(), 2);
        assert_eq!(platform.register_calls(), 4);
        assert_eq!(platform.registration_count(), 2);
        assert_eq!(
            platform.period_for(SensorKind::Gyroscope),
            SamplingPeriod::from_micros(100_000).ok()
        );

        // New listeners use the new period
        let (bridge, platform, _rx) = bridge_with(&[SensorKind::Light]);
        bridge.set_sampling_period(SamplingPeriod::NORMAL);
        bridge.start_listening("light");
        assert_eq!(
            platform.period_for(SensorKind::Light),
            Some(SamplingPeriod::NORMAL)
        );
    }

    #[test]
    fn test_negative_sampling_period_ignored() {
        let (bridge, platform, _rx) = bridge_with(&[SensorKind::Accelerometer]);
        bridge.start_listening("accelerometer");

        bridge.set_sampling_period_micros(-5);

        assert_eq!(bridge.sampling_period(), SamplingPeriod::GAME);
        assert_eq!(platform.unregister_calls(), 0);
    }

    #[test]
    fn test_terminate_clears_everything() {
        let (bridge, platform, mut rx) =
            bridge_with(&[SensorKind::Accelerometer, SensorKind::Gyroscope]);
        bridge.add_listener("accelerometer", Some(CallbackTarget::new("Player", "OnAccel")));
        bridge.start_listening("gyroscope");
        platform.deliver(SensorKind::Accelerometer, &[1.0, 2.0, 3.0]);
        assert!(rx.try_recv().is_ok());

        bridge.terminate();

        assert!(bridge.active_kinds().is_empty());
        assert_eq!(platform.registration_count(), 0);
        assert_eq!(bridge.last_values("accelerometer"), None);
        assert_eq!(bridge.last_values("gyroscope"), None);
        assert_eq!(platform.deliver(SensorKind::Accelerometer, &[4.0, 5.0, 6.0]), 0);
        assert!(rx.try_recv().is_err());

        // Idempotent on an empty registry
        bridge.terminate();
        assert_eq!(platform.unregister_calls(), 2);
    }

    #[test]
    fn test_subscribe_receives_structured_readings() {
        let (bridge, platform, _rx) = bridge_with(&[SensorKind::Pressure]);
        let mut readings = bridge.subscribe();
        bridge.start_listening("pressure");

        platform.deliver(SensorKind::Pressure, &[1013.25]);

        let reading = tokio_test::block_on(readings.recv()).unwrap();
        assert_eq!(reading.kind, SensorKind::Pressure);
        assert_eq!(reading.values, vec![1013.25]);
    }

    #[test]
    fn test_concurrent_add_listener_creates_single_entry() {
        let (bridge, platform, _rx) = bridge_with(&[SensorKind::Gravity]);
        let bridge = Arc::new(bridge);

        let handles: Vec<_> = (0..8)
            .map(|i| {
                let bridge = bridge.clone();
                std::thread::spawn(move || {
                    let target = CallbackTarget::new(format!("Object{}", i % 2), "OnGravity");
                    bridge.add_listener("gravity", Some(target));
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(bridge.active_kinds(), vec![SensorKind::Gravity]);
        assert_eq!(platform.register_calls(), 1);
        assert_eq!(bridge.callback_count("gravity"), 2);
    }
}
