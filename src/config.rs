//! Configuration for the rig-io flows
//!
//! Loads configuration from a TOML file. Every hard-coded value from the
//! bench scripts (server address, COM ports, baud rates, sample rate,
//! record time, output directory) lives here instead.

use crate::error::Result;
use crate::matrix::FloatOrder;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Top-level application configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppConfig {
    pub network: NetworkConfig,
    pub ft: FtConfig,
    pub gauge: GaugeConfig,
    pub output: OutputConfig,
}

/// Matrix server connection (MatrixRx flow)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NetworkConfig {
    /// Matrix server hostname or IP
    pub host: String,
    /// Matrix server TCP port
    pub port: u16,
    /// Byte order of the float64 payload emitted by the server
    ///
    /// The header is always big-endian; the payload byte order is a
    /// protocol parameter agreed with the peer. `little` matches the
    /// observed server.
    pub float_order: FloatOrder,
}

/// Force/torque sensor configuration (FTLogger flow)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FtConfig {
    /// Sensor serial port path (e.g., "/dev/ttyUSB0" or "COM16")
    pub serial_port: String,
    /// Baud rate as configured on the sensor electronics
    pub baud: u32,
    /// Sample rate in Hz as set by the sensor DIP switches (100/500/1000)
    pub sample_rate_hz: u32,
    /// Record time in minutes
    pub duration_minutes: u32,
}

/// Mark-10 gauge configuration (GaugePing flow)
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GaugeConfig {
    /// Gauge serial port path
    pub serial_port: String,
    /// Baud rate (Mark-10 default 115200)
    pub baud: u32,
    /// Per-reply timeout in milliseconds
    pub timeout_ms: u64,
    /// Number of query/reply round trips to time
    pub samples: u32,
}

/// Output artefact configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Directory for persisted artefacts (.npy, .csv)
    pub dir: String,
    /// FTLogger CSV file name
    pub ft_csv: String,
}

impl AppConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let contents = fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to TOML file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Default configuration matching the bench rig as wired today
    pub fn bench_defaults() -> Self {
        Self {
            network: NetworkConfig {
                host: "localhost".to_string(),
                port: 8080,
                float_order: FloatOrder::Little,
            },
            ft: FtConfig {
                serial_port: "/dev/ttyUSB0".to_string(),
                baud: 12_000_000,
                sample_rate_hz: 100,
                duration_minutes: 1,
            },
            gauge: GaugeConfig {
                serial_port: "/dev/ttyUSB1".to_string(),
                baud: 115_200,
                timeout_ms: 1000,
                samples: 50,
            },
            output: OutputConfig {
                dir: ".".to_string(),
                ft_csv: "ft_log.csv".to_string(),
            },
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self::bench_defaults()
    }
}
