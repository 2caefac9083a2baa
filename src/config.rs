use crate::error::Result;
use crate::platform::SamplingPeriod;
use crate::sensors::SensorKind;
use log::warn;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Load environment variables from .env file with robust parsing.
/// Handles values with spaces without requiring quotes.
pub fn load_dotenv() {
    let env_path = Path::new(".env");
    if !env_path.exists() {
        return;
    }

    let content = match fs::read_to_string(env_path) {
        Ok(c) => c,
        Err(_) => return,
    };

    for (key, value) in parse_dotenv(&content) {
        // Only set if not already set (env vars take precedence)
        if std::env::var(key).is_err() {
            // SAFETY: We're single-threaded at this point (called before any async runtime)
            unsafe { std::env::set_var(key, value) };
        }
    }
}

/// Parse `KEY=value` lines, skipping blanks and comments.
fn parse_dotenv(content: &str) -> Vec<(&str, &str)> {
    let mut pairs = Vec::new();
    for line in content.lines() {
        let line = line.trim();

        // Skip empty lines and comments
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        // Find the first '=' and split there
        if let Some(eq_pos) = line.find('=') {
            let key = line[..eq_pos].trim();
            let mut value = line[eq_pos + 1..].trim();

            // Remove surrounding quotes if present
            if value.len() >= 2
                && ((value.starts_with('"') && value.ends_with('"'))
                    || (value.starts_with('\'') && value.ends_with('\'')))
            {
                value = &value[1..value.len() - 1];
            }

            pairs.push((key, value));
        }
    }
    pairs
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub sensors: SensorConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SensorConfig {
    /// Initial sampling period for new listeners
    #[serde(default)]
    pub sampling_period: SamplingPeriod,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Whether the demo host drives the simulated platform
    pub enabled: bool,
    /// Sensors installed on the simulated device
    pub kinds: Vec<SensorKind>,
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            kinds: vec![
                SensorKind::Accelerometer,
                SensorKind::Gyroscope,
                SensorKind::MagneticField,
                SensorKind::Light,
                SensorKind::Proximity,
            ],
        }
    }
}

impl Config {
    /// Load a JSON config file. Missing sections take their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    pub fn from_env() -> Self {
        let mut config = Self::default();
        config.apply_env();
        config
    }

    /// Override fields from `SENSOR_*` environment variables.
    pub fn apply_env(&mut self) {
        if let Ok(period) = std::env::var("SENSOR_SAMPLING_PERIOD_US") {
            match period
                .parse::<i64>()
                .ok()
                .and_then(|p| SamplingPeriod::from_micros(p).ok())
            {
                Some(p) => self.sensors.sampling_period = p,
                None => warn!("Ignoring invalid SENSOR_SAMPLING_PERIOD_US: {}", period),
            }
        }
        if let Ok(enabled) = std::env::var("SENSOR_SIMULATION_ENABLED")
            && let Ok(e) = enabled.parse()
        {
            self.simulation.enabled = e;
        }
        if let Ok(kinds) = std::env::var("SENSOR_SIMULATION_KINDS") {
            self.simulation.kinds = parse_kinds(&kinds);
        }
    }
}

/// Parse a comma separated list of sensor names, skipping unknown ones.
pub fn parse_kinds(list: &str) -> Vec<SensorKind> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .filter_map(|name| {
            let kind = SensorKind::parse(name);
            if kind.is_none() {
                warn!("Ignoring unknown sensor kind: {}", name);
            }
            kind
        })
        .collect()
}
