//! NPY v1.0 container writer
//!
//! File layout:
//!
//! ```text
//! ┌──────────────┬───────────┬──────────────────┬───────────────────────┐
//! │ \x93NUMPY    │ 1 0       │ header_len (LE)  │ header dict + padding │
//! │ magic 6 B    │ ver 2 B   │ u16 2 B          │ to a 64-byte boundary │
//! └──────────────┴───────────┴──────────────────┴───────────────────────┘
//! ```
//!
//! followed by the raw element bytes. The matrix is always persisted as
//! `<f8` (little-endian float64), C order, whatever byte order the peer
//! used on the wire.

use crate::error::{Error, Result};
use ndarray::Array2;
use std::fs;
use std::path::Path;

const MAGIC: &[u8; 6] = b"\x93NUMPY";
const VERSION: [u8; 2] = [1, 0];

/// Encode the container prelude (magic, version, padded header dict)
fn encode_prelude(rows: usize, cols: usize) -> Vec<u8> {
    let dict = format!(
        "{{'descr': '<f8', 'fortran_order': False, 'shape': ({}, {}), }}",
        rows, cols
    );

    // Total prelude length (magic + version + len field + dict + padding)
    // must be a multiple of 64; the dict is space-padded and ends in '\n'.
    let unpadded = MAGIC.len() + VERSION.len() + 2 + dict.len() + 1;
    let padding = (64 - unpadded % 64) % 64;
    let header_len = dict.len() + padding + 1;

    let mut out = Vec::with_capacity(MAGIC.len() + VERSION.len() + 2 + header_len);
    out.extend_from_slice(MAGIC);
    out.extend_from_slice(&VERSION);
    out.extend_from_slice(&(header_len as u16).to_le_bytes());
    out.extend_from_slice(dict.as_bytes());
    out.extend(std::iter::repeat_n(b' ', padding));
    out.push(b'\n');
    out
}

/// Write a matrix to `path` as an NPY file
pub fn write_npy(path: &Path, matrix: &Array2<f64>) -> Result<()> {
    let (rows, cols) = matrix.dim();

    let mut bytes = encode_prelude(rows, cols);
    bytes.reserve(rows * cols * 8);
    for v in matrix.iter() {
        bytes.extend_from_slice(&v.to_le_bytes());
    }

    fs::write(path, &bytes).map_err(|source| Error::Persist {
        path: path.display().to_string(),
        source,
    })?;

    log::info!(
        "Persisted {}x{} matrix to {} ({} bytes)",
        rows,
        cols,
        path.display(),
        rows * cols * 8
    );
    Ok(())
}
