//! Sensor availability probe.
//!
//! Usage:
//!   cargo run --bin sensor-probe -- --kinds accelerometer,light
//!
//! Builds a simulated device with the given sensors, asks the bridge about
//! every known sensor kind and prints the result. With `--json` the report
//! is printed as JSON.

use clap::Parser;
use log::info;
use sensor_bridge::SensorBridge;
use sensor_bridge::config::{Config, load_dotenv, parse_kinds};
use sensor_bridge::platform::{SensorPlatform, SimulatedPlatform};
use sensor_bridge::sensors::LogSink;
use serde::Serialize;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "sensor-probe", about = "Report which sensor kinds a device exposes")]
struct Args {
    /// Comma separated sensor kinds installed on the simulated device
    #[arg(long, env = "SENSOR_SIMULATION_KINDS")]
    kinds: Option<String>,

    /// Print the report as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
struct ProbeEntry {
    kind: &'static str,
    sensor_type: i32,
    available: bool,
}

fn main() {
    load_dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();
    let config = Config::from_env();
    let kinds = match &args.kinds {
        Some(list) => parse_kinds(list),
        None => config.simulation.kinds.clone(),
    };

    let platform = Arc::new(SimulatedPlatform::with_kinds(kinds));
    let bridge = SensorBridge::new(platform.clone(), Arc::new(LogSink), &config.sensors);

    let catalog = platform.catalog();
    let report: Vec<ProbeEntry> = catalog
        .kinds()
        .into_iter()
        .filter_map(|kind| {
            catalog.sensor_type(kind).map(|sensor_type| ProbeEntry {
                kind: kind.name(),
                sensor_type: sensor_type.0,
                available: bridge.has_sensor(kind.name()),
            })
        })
        .collect();

    if args.json {
        match serde_json::to_string_pretty(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Failed to serialize report: {}", e),
        }
        return;
    }

    info!("Probing {} sensor kind(s)", report.len());
    for entry in &report {
        println!(
            "{:<28} type {:>3}  {}",
            entry.kind,
            entry.sensor_type,
            if entry.available { "available" } else { "-" }
        );
    }
}
