//! Mock transport for testing

use super::Transport;
use crate::error::Result;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// Mock transport for unit testing
///
/// Supports two styles of use:
/// - preloaded reads via [`inject_read`](Self::inject_read) (frame streams)
/// - scripted query/reply via [`queue_reply`](Self::queue_reply): each
///   write delivers the next queued reply into the read buffer, optionally
///   after a simulated delay (stub gauge behaviour)
#[derive(Clone)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

struct MockTransportInner {
    read_buffer: VecDeque<u8>,
    write_buffer: Vec<u8>,
    replies: VecDeque<Vec<u8>>,
    reply_delay: Duration,
    /// Reply pending delivery once its due time passes
    pending: Option<(Instant, Vec<u8>)>,
}

impl MockTransport {
    /// Create a new mock transport
    pub fn new() -> Self {
        MockTransport {
            inner: Arc::new(Mutex::new(MockTransportInner {
                read_buffer: VecDeque::new(),
                write_buffer: Vec::new(),
                replies: VecDeque::new(),
                reply_delay: Duration::ZERO,
                pending: None,
            })),
        }
    }

    /// Inject data to be read
    pub fn inject_read(&self, data: &[u8]) {
        let mut inner = self.inner.lock().unwrap();
        inner.read_buffer.extend(data);
    }

    /// Queue a reply to be delivered after the next write
    pub fn queue_reply(&self, data: &[u8]) {
        let mut inner = self.inner.lock().unwrap();
        inner.replies.push_back(data.to_vec());
    }

    /// Delay between a write and delivery of its queued reply
    pub fn set_reply_delay(&self, delay: Duration) {
        let mut inner = self.inner.lock().unwrap();
        inner.reply_delay = delay;
    }

    /// Get all written data
    pub fn get_written(&self) -> Vec<u8> {
        let inner = self.inner.lock().unwrap();
        inner.write_buffer.clone()
    }

    /// Clear written data
    pub fn clear_written(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.write_buffer.clear();
    }

    /// Clear read buffer
    pub fn clear_read(&self) {
        let mut inner = self.inner.lock().unwrap();
        inner.read_buffer.clear();
    }
}

impl Transport for MockTransport {
    fn read(&mut self, buffer: &mut [u8]) -> Result<usize> {
        let mut inner = self.inner.lock().unwrap();

        // Deliver a pending scripted reply once its due time has passed
        let due_now = matches!(inner.pending, Some((due, _)) if Instant::now() >= due);
        if due_now {
            let (_, reply) = inner.pending.take().unwrap();
            inner.read_buffer.extend(reply);
        }

        let available = inner.read_buffer.len().min(buffer.len());
        for item in buffer.iter_mut().take(available) {
            *item = inner.read_buffer.pop_front().unwrap();
        }

        Ok(available)
    }

    fn write(&mut self, data: &[u8]) -> Result<usize> {
        let mut inner = self.inner.lock().unwrap();
        inner.write_buffer.extend_from_slice(data);

        if let Some(reply) = inner.replies.pop_front() {
            let due = Instant::now() + inner.reply_delay;
            inner.pending = Some((due, reply));
        }

        Ok(data.len())
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }

    fn available(&mut self) -> Result<usize> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.read_buffer.len())
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}
