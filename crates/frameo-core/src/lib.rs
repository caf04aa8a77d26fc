//! Frameo Core - photo miniature pipeline for digital photo frames.
//!
//! Takes a tree of camera photos and produces a mirrored tree of small,
//! frame-sized images with FAT32-safe names and curated EXIF.
//!
//! # Architecture
//!
//! ```text
//! Walk (ignore rules) → bounded queue → N workers:
//!     Decode → Orient → Fit → Encode → Embed EXIF → Write → Set mtime
//! then optionally: Prune orphaned outputs
//! ```
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use frameo_core::{Miniatures, NoProgress, RunOptions};
//!
//! #[tokio::main]
//! async fn main() -> frameo_core::Result<()> {
//!     let options = RunOptions::new("./photos", "./frame");
//!     let summary = Miniatures::new(options)?.run(Arc::new(NoProgress)).await?;
//!     println!("Written: {}", summary.processing.written);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod error;
pub mod pipeline;
pub mod progress;
pub mod prune;
pub mod runner;
pub mod types;

// Re-exports for convenient access
pub use config::{Config, OutputFormat, Resolution};
pub use error::{ConfigError, MiniaturesError, PipelineError, PipelineResult, PruneError, Result};
pub use progress::{CountingProgress, NoProgress, ProgressSink};
pub use prune::Pruner;
pub use runner::{Miniatures, RunOptions};
pub use types::{Outcome, ProcessingStats, PruneReport, RunSummary};

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
