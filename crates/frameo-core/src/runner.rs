//! Run orchestration: discovery feeding the worker pool, then pruning.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::Config;
use crate::error::{ConfigError, MiniaturesError, Result};
use crate::pipeline::{
    bounded_channel, FileDiscovery, IgnoreMatcher, ImageTransformer, WorkQueue, WorkerPool,
};
use crate::progress::ProgressSink;
use crate::prune::Pruner;
use crate::types::{PruneReport, RunSummary};

/// Everything one invocation needs to know.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Source tree
    pub input: PathBuf,
    /// Destination tree
    pub output: PathBuf,
    /// Loaded config with CLI overrides already applied
    pub config: Config,
    /// Delete orphaned outputs after processing
    pub prune: bool,
    /// Delete orphaned outputs and do nothing else
    pub prune_only: bool,
    /// Log what would happen, touch nothing
    pub dry_run: bool,
    /// Explicit ignore file; the usual locations are searched when absent
    pub ignore_file: Option<PathBuf>,
}

impl RunOptions {
    pub fn new(input: impl Into<PathBuf>, output: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            config: Config::default(),
            prune: false,
            prune_only: false,
            dry_run: false,
            ignore_file: None,
        }
    }
}

/// Entry point of the library: one configured run over an input tree.
pub struct Miniatures {
    options: RunOptions,
    transformer: ImageTransformer,
    matcher: Arc<IgnoreMatcher>,
    output_in_input: Option<PathBuf>,
    input_in_output: Option<PathBuf>,
    workers: usize,
}

impl Miniatures {
    /// Validate options and prepare the run.
    ///
    /// Fails on invalid configuration or a missing input directory. An
    /// unreadable ignore file only costs its rules.
    pub fn new(mut options: RunOptions) -> Result<Self> {
        options.config.validate()?;
        if !options.input.is_dir() {
            return Err(ConfigError::ValidationError(format!(
                "input directory does not exist: {}",
                options.input.display()
            ))
            .into());
        }
        options.config.transform.dry_run = options.dry_run;

        let matcher = match IgnoreMatcher::load(options.ignore_file.as_deref(), &options.input) {
            Ok(matcher) => matcher,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load ignore file, ignoring nothing");
                IgnoreMatcher::empty()
            }
        };

        let input_in_output = nested_within(&options.output, &options.input);
        if input_in_output
            .as_deref()
            .is_some_and(|dir| dir.as_os_str().is_empty())
            && (options.prune || options.prune_only)
        {
            return Err(ConfigError::ValidationError(format!(
                "refusing to prune: input and output are the same directory ({})",
                options.input.display()
            ))
            .into());
        }
        if let Some(dir) = &input_in_output {
            tracing::debug!(dir = %dir.display(), "Input is inside output, excluding it from pruning");
        }

        let output_in_input = nested_within(&options.input, &options.output)
            .filter(|dir| !dir.as_os_str().is_empty());
        if let Some(dir) = &output_in_input {
            tracing::debug!(dir = %dir.display(), "Output is inside input, excluding it from discovery");
        }

        let workers = options.config.pipeline.effective_workers();
        let transformer = ImageTransformer::new(Arc::new(options.config.transform.clone()));

        tracing::debug!(
            version = crate::VERSION,
            input = %options.input.display(),
            output = %options.output.display(),
            workers,
            resolution = %options.config.transform.resolution,
            format = %options.config.transform.format,
            "Initialized"
        );

        Ok(Self {
            options,
            transformer,
            matcher: Arc::new(matcher),
            output_in_input,
            input_in_output,
            workers,
        })
    }

    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Process the input tree, then prune if requested.
    ///
    /// Per-file failures are counted in the summary; a failed prune is
    /// logged and leaves `pruned` empty.
    pub async fn run(&self, progress: Arc<dyn ProgressSink>) -> Result<RunSummary> {
        let mut summary = RunSummary {
            dry_run: self.options.dry_run,
            ..RunSummary::default()
        };

        if !self.options.prune_only {
            summary.processing = self.process(progress).await;
        }

        if self.options.prune || self.options.prune_only {
            match self.prune().await {
                Ok(report) => summary.pruned = Some(report),
                Err(e) => tracing::error!(error = %e, "Prune aborted"),
            }
        }

        Ok(summary)
    }

    /// Remove orphaned outputs without processing anything.
    pub async fn prune(&self) -> Result<PruneReport> {
        let mut pruner = Pruner::new(
            self.discovery(),
            self.options.output.clone(),
            self.options.config.transform.format,
            self.options.dry_run,
        );
        if let Some(dir) = &self.input_in_output {
            pruner = pruner.with_excluded_dir(dir);
        }
        let report = tokio::task::spawn_blocking(move || pruner.prune())
            .await
            .map_err(|e| MiniaturesError::Io(std::io::Error::other(e)))??;
        Ok(report)
    }

    async fn process(&self, progress: Arc<dyn ProgressSink>) -> crate::types::ProcessingStats {
        let (tx, rx) = bounded_channel(&self.options.config.pipeline);

        let discovery = self.discovery();
        let walker = tokio::task::spawn_blocking(move || discovery.stream(tx));

        let pool = WorkerPool::new(
            self.transformer.clone(),
            self.options.output.clone(),
            self.workers,
        );
        let stats = pool.run(WorkQueue::new(rx), progress).await;

        match walker.await {
            Ok(found) => tracing::debug!(found, "Discovery joined"),
            Err(e) => tracing::error!(error = %e, "Discovery task failed"),
        }
        stats
    }

    fn discovery(&self) -> FileDiscovery {
        let discovery = FileDiscovery::new(&self.options.input, Arc::clone(&self.matcher));
        match &self.output_in_input {
            Some(dir) => discovery.with_excluded_dir(dir),
            None => discovery,
        }
    }
}

/// `inner` relative to `outer` when it lies inside it or is the same
/// directory (empty path). Paths that do not exist yet resolve through their
/// parent.
fn nested_within(outer: &Path, inner: &Path) -> Option<PathBuf> {
    let outer = resolve(outer)?;
    let inner = resolve(inner)?;
    inner.strip_prefix(&outer).ok().map(Path::to_path_buf)
}

fn resolve(path: &Path) -> Option<PathBuf> {
    std::fs::canonicalize(path).ok().or_else(|| {
        let parent = path.parent().filter(|p| !p.as_os_str().is_empty())?;
        let name = path.file_name()?;
        std::fs::canonicalize(parent).ok().map(|p| p.join(name))
    })
}
