//! Fixed-size worker pool draining the discovery queue.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::task::JoinSet;

use crate::progress::ProgressSink;
use crate::types::ProcessingStats;

use super::channel::WorkQueue;
use super::discovery::FileDescriptor;
use super::processor::ImageTransformer;

/// Runs N workers over a shared queue of discovered files.
pub struct WorkerPool {
    transformer: ImageTransformer,
    output_root: Arc<PathBuf>,
    workers: usize,
}

impl WorkerPool {
    pub fn new(transformer: ImageTransformer, output_root: PathBuf, workers: usize) -> Self {
        Self {
            transformer,
            output_root: Arc::new(output_root),
            workers: workers.max(1),
        }
    }

    /// Drain `queue` until it is closed and empty, then return merged stats.
    ///
    /// Per-file failures are logged and counted; they never stop a worker.
    pub async fn run(
        &self,
        queue: WorkQueue<FileDescriptor>,
        progress: Arc<dyn ProgressSink>,
    ) -> ProcessingStats {
        let mut set = JoinSet::new();
        for id in 0..self.workers {
            set.spawn(worker(
                id,
                queue.clone(),
                self.transformer.clone(),
                Arc::clone(&self.output_root),
                Arc::clone(&progress),
            ));
        }
        drop(queue);

        let mut stats = ProcessingStats::default();
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok(worker_stats) => stats.merge(worker_stats),
                Err(e) => tracing::error!(error = %e, "Worker task failed"),
            }
        }
        stats
    }
}

async fn worker(
    id: usize,
    queue: WorkQueue<FileDescriptor>,
    transformer: ImageTransformer,
    output_root: Arc<PathBuf>,
    progress: Arc<dyn ProgressSink>,
) -> ProcessingStats {
    let mut stats = ProcessingStats::default();

    while let Some(file) = queue.next().await {
        let parent = file.relative_path.parent().unwrap_or(Path::new(""));
        let dest_dir = output_root.join(parent);
        let src = file.path.clone();
        let transformer = transformer.clone();

        // Decode and encode are CPU-bound, keep them off the async workers
        let result =
            tokio::task::spawn_blocking(move || transformer.process(&src, &dest_dir)).await;

        match result {
            Ok(Ok(outcome)) => stats.record(&outcome),
            Ok(Err(e)) => {
                stats.failed += 1;
                tracing::error!(file = %file.path.display(), error = %e, "Failed to process file");
            }
            Err(e) => {
                stats.failed += 1;
                tracing::error!(file = %file.path.display(), error = %e, "Transform task panicked");
            }
        }
        progress.advance(&file.path);
    }

    tracing::trace!(worker = id, processed = stats.total(), "Worker finished");
    stats
}
