//! Bounded channels for backpressure between the walker and the workers.

use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

use crate::config::PipelineConfig;

/// Create a bounded channel pair with the configured buffer size.
///
/// When the buffer is full, the walker blocks, so a fast walk over a huge
/// tree never outruns the workers by more than `buffer_size` entries.
pub fn bounded_channel<T>(config: &PipelineConfig) -> (mpsc::Sender<T>, mpsc::Receiver<T>) {
    mpsc::channel(config.buffer_size)
}

/// Multi-consumer view of a single-consumer receiver.
///
/// Every worker holds a clone and pulls one item at a time. `next` returns
/// `None` once all senders are dropped and the buffer is drained, which is
/// the only end-of-stream signal workers get.
pub struct WorkQueue<T> {
    inner: Arc<Mutex<mpsc::Receiver<T>>>,
}

impl<T> WorkQueue<T> {
    pub fn new(receiver: mpsc::Receiver<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(receiver)),
        }
    }

    /// Take the next item, waiting if the queue is empty but still open.
    pub async fn next(&self) -> Option<T> {
        self.inner.lock().await.recv().await
    }
}

impl<T> Clone for WorkQueue<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}
