//! Error types for rig-io

use std::time::Duration;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// rig-io error types
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Serial port error
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to open a transport (socket connect, serial open)
    #[error("Failed to open {peer}: {source}")]
    TransportOpen {
        /// Peer description (e.g., "tcp 192.168.1.10:8080")
        peer: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// Stream ended before the expected byte count was satisfied
    #[error("Short read from {peer}: expected {expected} bytes, got {got}")]
    ShortRead {
        /// Peer description
        peer: &'static str,
        /// Bytes expected
        expected: usize,
        /// Bytes actually received
        got: usize,
    },

    /// Matrix header violates the length law `payload_bytes = rows * cols * 8`
    #[error("Header mismatch: payload {payload_bytes} bytes != {rows} x {cols} x 8")]
    HeaderMismatch {
        /// Advertised payload size in bytes
        payload_bytes: u32,
        /// Advertised row count
        rows: u32,
        /// Advertised column count
        cols: u32,
    },

    /// Advertised matrix payload exceeds the sanity cap
    #[error("Matrix payload too large: {payload_bytes} bytes (cap {max})")]
    PayloadTooLarge {
        /// Advertised payload size in bytes
        payload_bytes: u32,
        /// Accepted maximum in bytes
        max: u32,
    },

    /// Serial peer did not deliver within the deadline
    #[error("Serial timeout on {peer} after {timeout:?}")]
    SerialTimeout {
        /// Peer description
        peer: &'static str,
        /// Deadline that elapsed
        timeout: Duration,
    },

    /// Failed to write an output artefact
    #[error("Failed to persist {path}: {source}")]
    Persist {
        /// Destination path
        path: String,
        /// Underlying I/O error
        source: std::io::Error,
    },

    /// CSV write error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Configuration parse error
    #[error("Configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// Configuration serialization error
    #[error("Configuration error: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    /// Acquisition interrupted by the operator
    #[error("Interrupted by operator")]
    Interrupted,

    /// Invalid parameter
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Generic error with message
    #[error("{0}")]
    Other(String),
}
