//! Transport layer for I/O abstraction
//!
//! Both serial flows (FTLogger, GaugePing) run over the [`Transport`]
//! trait so tests can substitute [`MockTransport`] for real hardware.
//! All I/O is blocking; a `read` that hits the poll timeout returns
//! `Ok(0)` and callers own the deadline policy on top of it.

use crate::error::{Error, Result};
use std::time::{Duration, Instant};

mod serial;
pub use serial::SerialTransport;

mod mock;
pub use mock::MockTransport;

/// Transport trait for device communication
pub trait Transport: Send {
    /// Read data into buffer, returns number of bytes read (0 on poll timeout)
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize>;

    /// Write data from buffer, returns number of bytes written
    fn write(&mut self, data: &[u8]) -> Result<usize>;

    /// Flush any pending writes (blocking until complete)
    fn flush(&mut self) -> Result<()>;

    /// Check if data is available to read
    fn available(&mut self) -> Result<usize> {
        Ok(0) // Default implementation
    }
}

/// Fill `buffer` completely or fail.
///
/// Loops over short reads until the buffer is full. If the deadline
/// elapses with the buffer only partially filled the stream alignment is
/// unknown, so the only safe outcome is an error: `SerialTimeout` when
/// nothing more arrived, which callers treat as fatal for the run.
pub fn read_exact_deadline<T: Transport + ?Sized>(
    transport: &mut T,
    buffer: &mut [u8],
    peer: &'static str,
    deadline: Duration,
) -> Result<()> {
    let start = Instant::now();
    let mut filled = 0;

    while filled < buffer.len() {
        let n = transport.read(&mut buffer[filled..])?;
        filled += n;

        if n == 0 && start.elapsed() >= deadline {
            return Err(Error::SerialTimeout {
                peer,
                timeout: deadline,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_exact_fills_across_short_reads() {
        let mut mock = MockTransport::new();
        mock.inject_read(&[1, 2, 3, 4, 5, 6]);

        let mut buf = [0u8; 6];
        read_exact_deadline(&mut mock, &mut buf, "test", Duration::from_millis(100)).unwrap();
        assert_eq!(buf, [1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_read_exact_times_out_mid_frame() {
        let mut mock = MockTransport::new();
        mock.inject_read(&[1, 2, 3]); // 3 of 6 bytes, then silence

        let mut buf = [0u8; 6];
        let err = read_exact_deadline(&mut mock, &mut buf, "test", Duration::from_millis(10))
            .unwrap_err();
        assert!(matches!(err, Error::SerialTimeout { peer: "test", .. }));
    }
}
