//! Result types shared between the pipeline, the pruner and the CLI.

use std::path::PathBuf;

/// What the transformer did with one source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A new output was written
    Written(PathBuf),
    /// The output already existed and skip-existing is on
    Skipped(PathBuf),
    /// Dry run: the output would have been written here
    Planned(PathBuf),
}

impl Outcome {
    /// Destination path of the output.
    pub fn destination(&self) -> &PathBuf {
        match self {
            Outcome::Written(p) | Outcome::Skipped(p) | Outcome::Planned(p) => p,
        }
    }
}

/// Per-worker tallies, merged after the pool drains.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessingStats {
    pub written: u64,
    pub skipped: u64,
    pub planned: u64,
    pub failed: u64,
}

impl ProcessingStats {
    pub fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Written(_) => self.written += 1,
            Outcome::Skipped(_) => self.skipped += 1,
            Outcome::Planned(_) => self.planned += 1,
        }
    }

    pub fn merge(&mut self, other: ProcessingStats) {
        self.written += other.written;
        self.skipped += other.skipped;
        self.planned += other.planned;
        self.failed += other.failed;
    }

    /// Files that reached a worker.
    pub fn total(&self) -> u64 {
        self.written + self.skipped + self.planned + self.failed
    }
}

/// Result of one prune pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Orphaned files removed (or, in dry run, that would be removed)
    pub removed_files: u64,
    /// Empty directories removed (or that would be removed)
    pub removed_dirs: u64,
}

/// End-of-run summary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub processing: ProcessingStats,
    /// `None` when pruning was not requested or aborted
    pub pruned: Option<PruneReport>,
    pub dry_run: bool,
}
