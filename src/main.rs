//! Demo host for the sensor bridge.
//!
//! Behaves like a scripting behaviour on a simulated device: sets the
//! sampling period, starts listening to one sensor kind, polls its values
//! once per frame and terminates on exit.

use clap::Parser;
use log::{error, info};
use sensor_bridge::config::{Config, load_dotenv};
use sensor_bridge::input::simulation::run_sensor_simulation;
use sensor_bridge::platform::SimulatedPlatform;
use sensor_bridge::runtime;
use sensor_bridge::sensors::LogSink;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::time::{Duration, interval};

#[derive(Parser, Debug)]
#[command(name = "sensor-bridge", about = "Run the sensor bridge against a simulated device")]
struct Args {
    /// Sensor kind to listen to
    #[arg(long, default_value = "accelerometer")]
    kind: String,

    /// Sampling period in microseconds (overrides the configured period)
    #[arg(long)]
    period_us: Option<i32>,

    /// Scripting object receiving callbacks
    #[arg(long, requires = "method")]
    object: Option<String>,

    /// Method called on the scripting object
    #[arg(long, requires = "object")]
    method: Option<String>,

    /// Interval between value polls, in milliseconds
    #[arg(long, default_value_t = 500)]
    frame_ms: u64,

    /// Stop after this many seconds instead of waiting for Ctrl+C
    #[arg(long)]
    duration_secs: Option<u64>,

    /// JSON config file
    #[arg(long, env = "SENSOR_BRIDGE_CONFIG")]
    config: Option<PathBuf>,
}

fn init_logger() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();
}

fn load_config(path: Option<&PathBuf>) -> Config {
    let mut config = match path {
        Some(path) => match Config::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                error!("Failed to load config {}: {}", path.display(), e);
                std::process::exit(1);
            }
        },
        None => Config::default(),
    };
    config.apply_env();
    config
}

#[tokio::main]
async fn main() {
    // Load .env file before anything else
    load_dotenv();
    init_logger();
    info!("Starting Sensor Bridge");

    let args = Args::parse();
    let config = load_config(args.config.as_ref());
    info!("Configuration loaded:");
    info!("  Sampling period: {}", config.sensors.sampling_period);
    info!("  Simulated sensors: {:?}", config.simulation.kinds);

    let platform = Arc::new(SimulatedPlatform::with_kinds(
        config.simulation.kinds.iter().copied(),
    ));
    if let Err(e) = runtime::init(platform.clone(), Arc::new(LogSink), &config.sensors) {
        error!("Failed to initialize sensor bridge: {}", e);
        std::process::exit(1);
    }

    if let Some(period_us) = args.period_us {
        runtime::set_sampling_period(period_us);
    }
    match (&args.object, &args.method) {
        (Some(object), Some(method)) => {
            runtime::add_sensor_event_listener(&args.kind, object, method)
        }
        _ => runtime::start_sensor_listening(&args.kind),
    }

    let simulation = config
        .simulation
        .enabled
        .then(|| run_sensor_simulation(platform.clone(), config.simulation.kinds.clone()));

    info!("Sensor Bridge is running");
    info!("  - Listening to {}", args.kind);
    info!("  - Press Ctrl+C to exit");

    let kind = args.kind.clone();
    let frame_ms = args.frame_ms.max(1);
    let frames = tokio::spawn(async move {
        let mut frame = interval(Duration::from_millis(frame_ms));
        loop {
            frame.tick().await;
            if !runtime::has_sensor(&kind) {
                continue;
            }
            if let Some(values) = runtime::get_sensor_values(&kind) {
                let rendered: Vec<String> = values.iter().map(|v| v.to_string()).collect();
                info!("sensorValue:{}", rendered.join(","));
            }
        }
    });

    let stop = async {
        match args.duration_secs {
            Some(secs) => tokio::time::sleep(Duration::from_secs(secs)).await,
            None => std::future::pending::<()>().await,
        }
    };

    tokio::select! {
        result = signal::ctrl_c() => match result {
            Ok(()) => info!("Received shutdown signal"),
            Err(e) => error!("Failed to listen for shutdown signal: {}", e),
        },
        _ = stop => info!("Run duration elapsed"),
    }

    // Shutdown
    frames.abort();
    if let Some(simulation) = simulation {
        simulation.abort();
    }
    runtime::shutdown();

    info!("Sensor Bridge stopped");
}
