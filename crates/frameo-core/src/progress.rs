//! Progress notification handle passed into the pipeline.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

/// Observer notified once per completed file, whatever the outcome.
pub trait ProgressSink: Send + Sync {
    fn advance(&self, path: &Path);
}

/// Progress sink that discards notifications.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ProgressSink for NoProgress {
    fn advance(&self, _path: &Path) {}
}

/// Progress sink that only counts notifications.
#[derive(Debug, Default)]
pub struct CountingProgress {
    count: AtomicU64,
}

impl CountingProgress {
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }
}

impl ProgressSink for CountingProgress {
    fn advance(&self, _path: &Path) {
        self.count.fetch_add(1, Ordering::Relaxed);
    }
}
