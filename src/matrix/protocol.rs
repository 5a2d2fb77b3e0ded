//! Matrix transfer wire protocol
//!
//! Wire layout, peer authoritative:
//!
//! ```text
//! ┌───────────────────┬───────────────┬───────────────┬──────────────────────┐
//! │ payload_bytes     │ rows          │ cols          │ Payload              │
//! │ 4 bytes BE u32    │ 4 bytes BE    │ 4 bytes BE    │ payload_bytes bytes  │
//! └───────────────────┴───────────────┴───────────────┴──────────────────────┘
//! ```
//!
//! The payload is `rows * cols` IEEE-754 float64 values, row-major. The
//! header is always big-endian; the byte order of the floats themselves is
//! a protocol parameter agreed with the peer ([`FloatOrder`], little-endian
//! for the observed server).

use crate::error::{Error, Result};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Header size on the wire
pub const HEADER_SIZE: usize = 12;

/// Sanity cap on the advertised payload (8192 x 1024 float64)
pub const MAX_PAYLOAD_BYTES: u32 = 64 * 1024 * 1024;

/// Byte order of the float64 payload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FloatOrder {
    /// Little-endian floats (observed server behaviour)
    #[default]
    Little,
    /// Big-endian floats
    Big,
}

/// Parsed matrix transfer header
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatrixHeader {
    /// Payload size in bytes
    pub payload_bytes: u32,
    /// Matrix row count
    pub rows: u32,
    /// Matrix column count
    pub cols: u32,
}

impl MatrixHeader {
    /// Parse and validate a 12-byte header
    ///
    /// Enforces the length law `payload_bytes = rows * cols * 8`; any
    /// counter-example is a fatal `HeaderMismatch` since the advertised
    /// payload cannot be trusted.
    pub fn parse(buf: &[u8; HEADER_SIZE]) -> Result<Self> {
        let payload_bytes = u32::from_be_bytes([buf[0], buf[1], buf[2], buf[3]]);
        let rows = u32::from_be_bytes([buf[4], buf[5], buf[6], buf[7]]);
        let cols = u32::from_be_bytes([buf[8], buf[9], buf[10], buf[11]]);

        if payload_bytes as u64 != rows as u64 * cols as u64 * 8 {
            return Err(Error::HeaderMismatch {
                payload_bytes,
                rows,
                cols,
            });
        }

        if payload_bytes > MAX_PAYLOAD_BYTES {
            return Err(Error::PayloadTooLarge {
                payload_bytes,
                max: MAX_PAYLOAD_BYTES,
            });
        }

        Ok(MatrixHeader {
            payload_bytes,
            rows,
            cols,
        })
    }
}

/// Decode a raw payload into a row-major `rows x cols` matrix
pub fn decode_payload(
    payload: &[u8],
    rows: u32,
    cols: u32,
    order: FloatOrder,
) -> Result<Array2<f64>> {
    let expected = rows as usize * cols as usize * 8;
    if payload.len() != expected {
        return Err(Error::ShortRead {
            peer: "matrix server",
            expected,
            got: payload.len(),
        });
    }

    let values: Vec<f64> = payload
        .chunks_exact(8)
        .map(|c| {
            let bytes = [c[0], c[1], c[2], c[3], c[4], c[5], c[6], c[7]];
            match order {
                FloatOrder::Little => f64::from_le_bytes(bytes),
                FloatOrder::Big => f64::from_be_bytes(bytes),
            }
        })
        .collect();

    Array2::from_shape_vec((rows as usize, cols as usize), values)
        .map_err(|e| Error::Other(format!("Matrix shape error: {}", e)))
}
