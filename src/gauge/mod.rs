//! GaugePing flow: round-trip latency benchmark against a Mark-10 gauge
//!
//! The gauge speaks a line protocol: the host transmits `?\r` and the
//! gauge replies with one ASCII line (a force reading such as `0.00 N`)
//! terminated by its native line ending. For the benchmark only the
//! arrival of the reply matters; [`GaugeBench::read_force`] additionally
//! parses the reading for spot checks during rig setup.

use crate::error::{Error, Result};
use crate::transport::{SerialTransport, Transport};
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Query bytes understood by the gauge
pub const QUERY: &[u8] = b"?\r";

/// Default gauge baud rate
pub const DEFAULT_BAUD: u32 = 115_200;

/// Default per-reply timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(1);

/// Summary of a timing run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimingSummary {
    /// Number of round trips timed
    pub count: usize,
    /// Mean latency in milliseconds
    pub mean_ms: f64,
    /// Fastest round trip in milliseconds
    pub min_ms: f64,
    /// Slowest round trip in milliseconds
    pub max_ms: f64,
    /// Population standard deviation in milliseconds
    pub stdev_ms: f64,
    /// Approximate upper bound on achievable polling frequency
    pub implied_rate_hz: f64,
}

impl fmt::Display for TimingSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Timing over {} samples:", self.count)?;
        writeln!(f, "  mean:    {:.2} ms", self.mean_ms)?;
        writeln!(f, "  min/max: {:.2}/{:.2} ms", self.min_ms, self.max_ms)?;
        writeln!(f, "  stdev:   {:.2} ms", self.stdev_ms)?;
        write!(f, "  implied rate: {:.1} Hz", self.implied_rate_hz)
    }
}

/// Mark-10 gauge latency benchmark
pub struct GaugeBench<T: Transport> {
    transport: T,
    timeout: Duration,
}

impl GaugeBench<SerialTransport> {
    /// Open the gauge serial port
    pub fn open(port: &str, baud: u32, timeout: Duration) -> Result<Self> {
        Ok(GaugeBench {
            transport: SerialTransport::open(port, baud)?,
            timeout,
        })
    }
}

impl<T: Transport> GaugeBench<T> {
    /// Wrap an already-open transport
    pub fn new(transport: T, timeout: Duration) -> Self {
        GaugeBench { transport, timeout }
    }

    /// Time `n_samples` query/reply round trips, in issue order
    ///
    /// Each sample is the elapsed wall time in milliseconds between
    /// writing `?\r` and receiving the full reply line. A timed-out reply
    /// terminates the run, as does the operator clearing `running`
    /// (checked between samples; one in-flight reply is bounded by the
    /// configured timeout).
    pub fn measure(&mut self, n_samples: u32, running: &AtomicBool) -> Result<Vec<f64>> {
        let mut timings = Vec::with_capacity(n_samples as usize);

        for _ in 0..n_samples {
            if !running.load(Ordering::Relaxed) {
                log::warn!(
                    "Timing run interrupted after {} of {} samples",
                    timings.len(),
                    n_samples
                );
                return Err(Error::Interrupted);
            }

            let start = Instant::now();
            self.transport.write(QUERY)?;
            self.transport.flush()?;
            self.read_line()?;
            timings.push(start.elapsed().as_secs_f64() * 1000.0);
        }

        log::info!("Timed {} gauge round trips", timings.len());
        Ok(timings)
    }

    /// One query/reply exchange, parsed as a force reading
    ///
    /// Strips the unit suffix (`N`, `lbF`, `lb`) from the reply. An empty
    /// reply line reads as 0.0, as the bench scripts treat it.
    pub fn read_force(&mut self) -> Result<f64> {
        self.transport.write(QUERY)?;
        self.transport.flush()?;
        let reply = self.read_line()?;
        parse_force(&reply)
    }

    /// Read one reply line, stripped of trailing whitespace
    fn read_line(&mut self) -> Result<String> {
        let deadline = Instant::now() + self.timeout;
        let mut line = Vec::new();
        let mut byte = [0u8; 1];

        loop {
            let n = self.transport.read(&mut byte)?;
            if n == 0 {
                if Instant::now() >= deadline {
                    return Err(Error::SerialTimeout {
                        peer: "mark-10 gauge",
                        timeout: self.timeout,
                    });
                }
                continue;
            }
            if byte[0] == b'\n' {
                break;
            }
            line.push(byte[0]);
        }

        Ok(String::from_utf8_lossy(&line).trim_end().to_string())
    }
}

/// Summarise a timing run
pub fn summarise(timings: &[f64]) -> Result<TimingSummary> {
    if timings.is_empty() {
        return Err(Error::InvalidParameter(
            "Cannot summarise an empty timing run".to_string(),
        ));
    }

    let count = timings.len();
    let mean_ms = timings.iter().sum::<f64>() / count as f64;
    let min_ms = timings.iter().copied().fold(f64::INFINITY, f64::min);
    let max_ms = timings.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let variance = timings.iter().map(|t| (t - mean_ms).powi(2)).sum::<f64>() / count as f64;

    Ok(TimingSummary {
        count,
        mean_ms,
        min_ms,
        max_ms,
        stdev_ms: variance.sqrt(),
        implied_rate_hz: 1000.0 / mean_ms,
    })
}

/// Parse a gauge reply into a force value
///
/// Replies look like `0.00 N`, `-1.25 lbF` or `12.5lb`. An empty reply
/// yields 0.0.
fn parse_force(reply: &str) -> Result<f64> {
    if reply.is_empty() {
        return Ok(0.0);
    }

    let stripped = reply
        .replace('N', "")
        .replace("lbF", "")
        .replace("lb", "");
    let trimmed = stripped.trim();

    trimmed.parse::<f64>().map_err(|_| {
        Error::InvalidParameter(format!("Unparseable gauge reply: {:?}", reply))
    })
}
