//! MatrixRx flow: download a 2-D float64 matrix from the bench TCP server
//!
//! Session progression is strictly linear: connect, read the 12-byte
//! header, read exactly the advertised payload in chunks, persist, close.
//! Any error is terminal; the socket is closed unconditionally on drop and
//! no partial artefact is written.
//!
//! The stream carries a read timeout so the operator's shutdown flag is
//! polled even against a hung server; an interrupt releases the socket
//! and surfaces as an error.

use crate::error::{Error, Result};
use ndarray::Array2;
use std::io::Read;
use std::net::TcpStream;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

mod npy;
mod protocol;

pub use protocol::{FloatOrder, MatrixHeader, HEADER_SIZE};

/// Maximum bytes requested from the peer per read call
const CHUNK_SIZE: usize = 4096;

/// Read timeout on the stream, so shutdown flag checks stay responsive
const READ_TIMEOUT: Duration = Duration::from_millis(500);

/// One matrix download session
pub struct MatrixReceiver {
    stream: TcpStream,
    order: FloatOrder,
}

impl MatrixReceiver {
    /// Connect to the matrix server
    pub fn connect(host: &str, port: u16, order: FloatOrder) -> Result<Self> {
        let peer = format!("tcp {}:{}", host, port);
        let stream = TcpStream::connect((host, port)).map_err(|source| Error::TransportOpen {
            peer: peer.clone(),
            source,
        })?;

        if let Err(e) = stream.set_read_timeout(Some(READ_TIMEOUT)) {
            log::warn!("Failed to set read timeout: {}", e);
        }

        log::info!("Connected to matrix server at {}", peer);
        Ok(MatrixReceiver { stream, order })
    }

    /// Receive one matrix: header, then exactly the advertised payload
    pub fn receive(&mut self, running: &AtomicBool) -> Result<Array2<f64>> {
        receive_from(&mut self.stream, self.order, running)
    }

    /// Persist a matrix to `dir` as `received_matrix_<rows>x<cols>.npy`
    pub fn persist(matrix: &Array2<f64>, dir: &Path) -> Result<PathBuf> {
        let (rows, cols) = matrix.dim();
        let path = dir.join(format!("received_matrix_{}x{}.npy", rows, cols));
        npy::write_npy(&path, matrix)?;
        Ok(path)
    }
}

/// Receive one matrix from any byte stream
///
/// Split out from [`MatrixReceiver`] so the framing logic is testable
/// against in-memory readers. Timed-out reads poll `running`; a cleared
/// flag aborts with `Interrupted`.
pub fn receive_from<R: Read>(
    reader: &mut R,
    order: FloatOrder,
    running: &AtomicBool,
) -> Result<Array2<f64>> {
    let header = read_header(reader, running)?;
    log::debug!(
        "Matrix header: {} bytes, {}x{}",
        header.payload_bytes,
        header.rows,
        header.cols
    );

    let payload = read_payload(reader, header.payload_bytes as usize, running)?;
    protocol::decode_payload(&payload, header.rows, header.cols, order)
}

/// Read and validate the 12-byte big-endian header
fn read_header<R: Read>(reader: &mut R, running: &AtomicBool) -> Result<MatrixHeader> {
    let mut buf = [0u8; HEADER_SIZE];
    fill_from(reader, &mut buf, HEADER_SIZE, running)?;
    MatrixHeader::parse(&buf)
}

/// Read exactly `len` payload bytes, chunked, looping on partial reads
fn read_payload<R: Read>(reader: &mut R, len: usize, running: &AtomicBool) -> Result<Vec<u8>> {
    let mut payload = vec![0u8; len];
    fill_from(reader, &mut payload, len, running)?;
    Ok(payload)
}

/// Fill `buf` completely, requesting at most [`CHUNK_SIZE`] bytes per call
///
/// EOF before `expected` bytes is `ShortRead`. A timed-out read (the
/// stream's read timeout) checks the shutdown flag and retries.
fn fill_from<R: Read>(
    reader: &mut R,
    buf: &mut [u8],
    expected: usize,
    running: &AtomicBool,
) -> Result<()> {
    let mut filled = 0;

    while filled < buf.len() {
        let end = (filled + CHUNK_SIZE).min(buf.len());
        match reader.read(&mut buf[filled..end]) {
            Ok(0) => {
                return Err(Error::ShortRead {
                    peer: "matrix server",
                    expected,
                    got: filled,
                });
            }
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e)
                if e.kind() == std::io::ErrorKind::WouldBlock
                    || e.kind() == std::io::ErrorKind::TimedOut =>
            {
                if !running.load(Ordering::Relaxed) {
                    log::warn!(
                        "Matrix download interrupted after {} of {} bytes",
                        filled,
                        expected
                    );
                    return Err(Error::Interrupted);
                }
            }
            Err(e) => return Err(e.into()),
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    /// Reader that delivers at most 3 bytes per call, emulating a slow
    /// peer that fragments the payload
    struct TrickleReader {
        data: Vec<u8>,
        pos: usize,
    }

    impl Read for TrickleReader {
        fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
            let n = buf.len().min(3).min(self.data.len() - self.pos);
            buf[..n].copy_from_slice(&self.data[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    /// Reader that never delivers, as a hung server looks through a
    /// stream with a read timeout
    struct StalledReader;

    impl Read for StalledReader {
        fn read(&mut self, _buf: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::ErrorKind::WouldBlock.into())
        }
    }

    fn wire_bytes(rows: u32, cols: u32, values: &[f64]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&(values.len() as u32 * 8).to_be_bytes());
        bytes.extend_from_slice(&rows.to_be_bytes());
        bytes.extend_from_slice(&cols.to_be_bytes());
        for v in values {
            bytes.extend_from_slice(&v.to_le_bytes());
        }
        bytes
    }

    #[test]
    fn test_receive_identity() {
        let data = wire_bytes(2, 2, &[1.0, 0.0, 0.0, 1.0]);
        let running = AtomicBool::new(true);
        let matrix = receive_from(&mut Cursor::new(data), FloatOrder::Little, &running).unwrap();

        assert_eq!(matrix.dim(), (2, 2));
        assert_eq!(matrix[[0, 0]], 1.0);
        assert_eq!(matrix[[1, 1]], 1.0);
        assert_eq!(matrix[[0, 1]], 0.0);
    }

    #[test]
    fn test_receive_round_trip() {
        // M2: persisted flattening equals the values on the wire
        let values: Vec<f64> = (0..12).map(|i| i as f64 * 0.5 - 2.0).collect();
        let data = wire_bytes(3, 4, &values);
        let running = AtomicBool::new(true);
        let matrix = receive_from(&mut Cursor::new(data), FloatOrder::Little, &running).unwrap();

        let flattened: Vec<f64> = matrix.iter().copied().collect();
        assert_eq!(flattened, values);
    }

    #[test]
    fn test_receive_chunked_payload() {
        let values: Vec<f64> = (0..6).map(|i| i as f64).collect();
        let mut reader = TrickleReader {
            data: wire_bytes(2, 3, &values),
            pos: 0,
        };
        let running = AtomicBool::new(true);
        let matrix = receive_from(&mut reader, FloatOrder::Little, &running).unwrap();

        assert_eq!(matrix.dim(), (2, 3));
        assert_eq!(matrix[[1, 2]], 5.0);
    }

    #[test]
    fn test_receive_header_mismatch() {
        // Header claims 24 bytes for a 2x2 matrix (should be 32)
        let mut data = Vec::new();
        data.extend_from_slice(&24u32.to_be_bytes());
        data.extend_from_slice(&2u32.to_be_bytes());
        data.extend_from_slice(&2u32.to_be_bytes());
        data.extend_from_slice(&[0u8; 24]);

        let running = AtomicBool::new(true);
        let err =
            receive_from(&mut Cursor::new(data), FloatOrder::Little, &running).unwrap_err();
        assert!(matches!(err, Error::HeaderMismatch { .. }));
    }

    #[test]
    fn test_receive_short_payload() {
        let mut data = wire_bytes(2, 2, &[1.0, 2.0, 3.0, 4.0]);
        data.truncate(12 + 20); // header plus 20 of 32 payload bytes

        let running = AtomicBool::new(true);
        let err =
            receive_from(&mut Cursor::new(data), FloatOrder::Little, &running).unwrap_err();
        assert!(matches!(
            err,
            Error::ShortRead {
                expected: 32,
                got: 20,
                ..
            }
        ));
    }

    #[test]
    fn test_receive_interrupted_against_hung_server() {
        // Cleared shutdown flag must abort a stalled download
        let running = AtomicBool::new(false);
        let err =
            receive_from(&mut StalledReader, FloatOrder::Little, &running).unwrap_err();
        assert!(matches!(err, Error::Interrupted));
    }

    #[test]
    fn test_persist_names_file_by_shape() {
        let data = wire_bytes(2, 2, &[1.0, 0.0, 0.0, 1.0]);
        let running = AtomicBool::new(true);
        let matrix = receive_from(&mut Cursor::new(data), FloatOrder::Little, &running).unwrap();

        let dir = std::env::temp_dir();
        let path = MatrixReceiver::persist(&matrix, &dir).unwrap();
        assert!(path.ends_with("received_matrix_2x2.npy"));
        assert!(path.exists());
        std::fs::remove_file(&path).ok();
    }
}
