//! rig-io - bench data-collection flows for motorised test rigs
//!
//! One flow per invocation:
//!
//! - `rig-io matrix` - download a matrix from the bench TCP server
//! - `rig-io ft`     - log the force/torque sensor to CSV
//! - `rig-io gauge`  - benchmark Mark-10 query/reply latency

use rig_io::config::AppConfig;
use rig_io::error::{Error, Result};
use rig_io::ft::FtLogger;
use rig_io::gauge::GaugeBench;
use rig_io::matrix::MatrixReceiver;
use std::env;
use std::io::Write;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Default configuration file path
const DEFAULT_CONFIG: &str = "rigio.toml";

/// Parse config path from command line arguments.
///
/// Supports:
/// - `rig-io <flow> --config <path>` (flag-based)
/// - `rig-io <flow> -c <path>` (short flag)
///
/// Defaults to `rigio.toml` if not specified.
fn parse_config_path(args: &[String]) -> String {
    for i in 1..args.len() {
        if (args[i] == "--config" || args[i] == "-c") && i + 1 < args.len() {
            return args[i + 1].clone();
        }
    }
    DEFAULT_CONFIG.to_string()
}

/// Prompt the operator, returning `default` on empty input
fn prompt(label: &str, default: &str) -> String {
    print!("{} ({}): ", label, default);
    let _ = std::io::stdout().flush();

    let mut line = String::new();
    if std::io::stdin().read_line(&mut line).is_err() {
        return default.to_string();
    }

    let trimmed = line.trim();
    if trimmed.is_empty() {
        default.to_string()
    } else {
        trimmed.to_string()
    }
}

/// MatrixRx flow: connect, receive, persist, close
fn run_matrix(config: &AppConfig, running: &AtomicBool) -> Result<()> {
    let host = prompt("Server IP", &config.network.host);
    let port_input = prompt("Port", &config.network.port.to_string());
    let port: u16 = port_input
        .parse()
        .map_err(|_| Error::InvalidParameter(format!("Invalid port: {}", port_input)))?;

    let mut receiver = MatrixReceiver::connect(&host, port, config.network.float_order)?;
    let matrix = receiver.receive(running)?;

    let (rows, cols) = matrix.dim();
    println!("Received {}x{} matrix", rows, cols);

    let path = MatrixReceiver::persist(&matrix, Path::new(&config.output.dir))?;
    println!("Saved to {}", path.display());
    Ok(())
}

/// FTLogger flow: acquire the full run, then persist
fn run_ft(config: &AppConfig, running: &AtomicBool) -> Result<()> {
    let mut logger = FtLogger::open(&config.ft.serial_port, config.ft.baud)?;
    let samples = logger.run(
        config.ft.sample_rate_hz,
        config.ft.duration_minutes,
        running,
    )?;

    let path = Path::new(&config.output.dir).join(&config.output.ft_csv);
    rig_io::ft::persist_csv(&samples, &path)?;
    println!("Logged {} samples to {}", samples.len(), path.display());
    Ok(())
}

/// GaugePing flow: time the round trips and report the distribution
fn run_gauge(config: &AppConfig, running: &AtomicBool) -> Result<()> {
    let mut bench = GaugeBench::open(
        &config.gauge.serial_port,
        config.gauge.baud,
        Duration::from_millis(config.gauge.timeout_ms),
    )?;

    let timings = bench.measure(config.gauge.samples, running)?;
    let summary = rig_io::gauge::summarise(&timings)?;
    println!("{}", summary);
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = env::args().collect();
    let flow = args.get(1).map(String::as_str).unwrap_or("");

    // Load configuration, falling back to defaults when the file is absent
    let config_path = parse_config_path(&args);
    let config = if Path::new(&config_path).exists() {
        log::info!("Using config: {}", config_path);
        AppConfig::from_file(&config_path)?
    } else {
        log::warn!("Config {} not found, using defaults", config_path);
        AppConfig::bench_defaults()
    };

    // Ctrl-C aborts long acquisitions; transports release on drop
    let running = Arc::new(AtomicBool::new(true));
    let r = Arc::clone(&running);
    ctrlc::set_handler(move || {
        log::info!("Received shutdown signal");
        r.store(false, Ordering::Relaxed);
    })
    .map_err(|e| Error::Other(format!("Error setting Ctrl-C handler: {}", e)))?;

    match flow {
        "matrix" => run_matrix(&config, &running),
        "ft" => run_ft(&config, &running),
        "gauge" => run_gauge(&config, &running),
        _ => {
            eprintln!("Usage: rig-io <matrix|ft|gauge> [--config <path>]");
            Err(Error::InvalidParameter(format!(
                "Unknown flow: {:?}",
                flow
            )))
        }
    }
}
