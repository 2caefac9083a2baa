//! Sensor simulation for testing.
//!
//! Feeds synthetic readings into a [`SimulatedPlatform`] for development and
//! demos on machines without sensor hardware. Each kind is delivered at the
//! sampling period its listeners registered with.

use crate::platform::SimulatedPlatform;
use crate::sensors::SensorKind;
use log::{debug, info};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, interval};

/// Scheduler resolution. Periods shorter than this are delivered once per tick.
const TICK: Duration = Duration::from_millis(5);

/// Random-walk reading source for one sensor kind.
pub struct ReadingGenerator {
    kind: SensorKind,
    values: Vec<f32>,
    rng: StdRng,
}

impl ReadingGenerator {
    pub fn new(kind: SensorKind) -> Self {
        Self::with_rng(kind, StdRng::from_entropy())
    }

    /// Deterministic generator for tests.
    pub fn seeded(kind: SensorKind, seed: u64) -> Self {
        Self::with_rng(kind, StdRng::seed_from_u64(seed))
    }

    fn with_rng(kind: SensorKind, rng: StdRng) -> Self {
        Self {
            kind,
            values: resting_values(kind),
            rng,
        }
    }

    /// Produce the next reading.
    pub fn next_values(&mut self) -> Vec<f32> {
        match self.kind {
            SensorKind::StepCounter => {
                self.values[0] += f32::from(self.rng.gen_range(0u8..=2));
            }
            SensorKind::StepDetector | SensorKind::SignificantMotion => {
                self.values[0] = 1.0;
            }
            SensorKind::Proximity => {
                self.values[0] = if self.rng.gen_bool(0.1) { 0.0 } else { 5.0 };
            }
            _ => {
                let scale = noise_scale(self.kind);
                for value in &mut self.values {
                    *value += self.rng.gen_range(-scale..=scale);
                }
            }
        }
        self.values.clone()
    }
}

/// Plausible values for a device lying still on a desk.
fn resting_values(kind: SensorKind) -> Vec<f32> {
    match kind {
        SensorKind::Accelerometer => vec![0.0, 0.0, 9.81],
        SensorKind::Gravity => vec![0.0, 0.0, 9.81],
        SensorKind::MagneticField => vec![22.0, -5.0, -40.0],
        SensorKind::MagneticFieldUncalibrated => vec![22.0, -5.0, -40.0, 0.5, 0.5, 0.5],
        SensorKind::GameRotationVector => vec![0.0, 0.0, 0.0, 1.0],
        SensorKind::RotationVector | SensorKind::GeomagneticRotationVector => {
            vec![0.0, 0.0, 0.0, 1.0, 0.0]
        }
        SensorKind::AmbientTemperature => vec![21.5],
        SensorKind::HeartRate => vec![72.0],
        SensorKind::Light => vec![250.0],
        SensorKind::Pressure => vec![1013.25],
        SensorKind::Proximity => vec![5.0],
        SensorKind::RelativeHumidity => vec![45.0],
        kind => vec![0.0; kind.value_count()],
    }
}

fn noise_scale(kind: SensorKind) -> f32 {
    match kind {
        SensorKind::Light => 5.0,
        SensorKind::HeartRate | SensorKind::MagneticField | SensorKind::MagneticFieldUncalibrated => 0.5,
        SensorKind::Pressure | SensorKind::AmbientTemperature | SensorKind::RelativeHumidity => 0.05,
        _ => 0.02,
    }
}

/// Spawn a task that delivers simulated readings for every listened kind.
///
/// Kinds nobody listens to are skipped; a kind is delivered again once its
/// registered sampling period has elapsed.
///
/// # Returns
///
/// A `JoinHandle` that can be used to abort the simulation task.
pub fn run_sensor_simulation(
    platform: Arc<SimulatedPlatform>,
    kinds: Vec<SensorKind>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut generators: HashMap<SensorKind, ReadingGenerator> = kinds
            .iter()
            .map(|kind| (*kind, ReadingGenerator::new(*kind)))
            .collect();
        let mut next_due: HashMap<SensorKind, Instant> = HashMap::new();
        let mut ticker = interval(TICK);
        info!("[Sim] Sensor simulation running for {} kind(s)", kinds.len());

        loop {
            ticker.tick().await;
            let now = Instant::now();
            for kind in &kinds {
                let Some(period) = platform.period_for(*kind) else {
                    next_due.remove(kind);
                    continue;
                };
                if next_due.get(kind).is_some_and(|due| now < *due) {
                    continue;
                }
                next_due.insert(*kind, now + period.as_duration());

                if let Some(generator) = generators.get_mut(kind) {
                    let values = generator.next_values();
                    let delivered = platform.deliver(*kind, &values);
                    debug!("[Sim] {} -> {:?} ({} listener(s))", kind, values, delivered);
                }
            }
        }
    })
}
