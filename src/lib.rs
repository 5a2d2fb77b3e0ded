//! rig-io - Bench data-collection toolkit for motorised test rigs
//!
//! Three independent flows, each owning its transport for its lifetime:
//!
//! - [`matrix`]: download a 2-D float64 matrix from the bench TCP server
//!   and persist it as an `.npy` file
//! - [`ft`]: stream 28-byte force/torque frames from the serial sensor
//!   and persist a timestamped CSV
//! - [`gauge`]: benchmark the query/reply latency of a Mark-10 gauge
//!
//! All I/O is blocking and strictly sequential; nothing is shared between
//! flows.

pub mod config;
pub mod error;
pub mod ft;
pub mod gauge;
pub mod matrix;
pub mod transport;

// Re-export commonly used types
pub use config::AppConfig;
pub use error::{Error, Result};
