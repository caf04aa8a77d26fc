//! The default command: process the input tree and optionally prune.

mod progress;
mod summary;

use anyhow::Context;
use clap::Args;
use frameo_core::{Config, Miniatures, NoProgress, OutputFormat, ProgressSink, Resolution, RunOptions};
use std::path::PathBuf;
use std::sync::Arc;

use progress::SpinnerProgress;
use summary::print_summary;

/// Arguments for a processing run.
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Source directory
    #[arg(short, long, default_value = ".")]
    pub input: PathBuf,

    /// Destination directory
    #[arg(short, long, default_value = "./output")]
    pub output: PathBuf,

    /// Frame resolution as <width>x<height> [config default: 1280x800]
    #[arg(short, long)]
    pub resolution: Option<Resolution>,

    /// Output format: webp, jpg or jpeg [config default: webp]
    #[arg(short, long)]
    pub format: Option<OutputFormat>,

    /// Encoder quality, 0-100 [config default: 80]
    #[arg(short, long, value_parser = clap::value_parser!(u8).range(0..=100))]
    pub quality: Option<u8>,

    /// Number of parallel workers, 0 for one per CPU [config default: 0]
    #[arg(short = 'j', long)]
    pub workers: Option<usize>,

    /// Delete outputs whose source is gone or ignored after processing
    #[arg(long)]
    pub prune: bool,

    /// Only delete orphaned outputs, process nothing
    #[arg(long)]
    pub prune_only: bool,

    /// Show what would be written and deleted without touching anything
    #[arg(long)]
    pub dry_run: bool,

    /// Leave outputs that already exist untouched
    #[arg(long)]
    pub skip_existing: bool,

    /// Ignore file to use instead of the default locations
    #[arg(long)]
    pub ignore_file: Option<String>,
}

impl RunArgs {
    /// Layer CLI flags over the loaded config.
    pub fn apply(&self, config: &mut Config) {
        if let Some(resolution) = self.resolution {
            config.transform.resolution = resolution;
        }
        if let Some(format) = self.format {
            config.transform.format = format;
        }
        if let Some(quality) = self.quality {
            config.transform.quality = quality;
        }
        if let Some(workers) = self.workers {
            config.pipeline.workers = workers;
        }
        if self.skip_existing {
            config.transform.skip_existing = true;
        }
    }

    /// Build library run options from the flags and config.
    pub fn into_options(self, mut config: Config) -> RunOptions {
        self.apply(&mut config);
        let ignore_file = self
            .ignore_file
            .as_deref()
            .map(|raw| PathBuf::from(shellexpand::tilde(raw).into_owned()));

        RunOptions {
            input: self.input,
            output: self.output,
            config,
            prune: self.prune,
            prune_only: self.prune_only,
            dry_run: self.dry_run,
            ignore_file,
        }
    }
}

/// Execute a processing run.
pub async fn execute(args: RunArgs, config: Config) -> anyhow::Result<()> {
    let options = args.into_options(config);
    let prune_only = options.prune_only;
    let app = Miniatures::new(options).context("Cannot start run")?;

    let opts = app.options();
    tracing::info!(
        input = %opts.input.display(),
        output = %opts.output.display(),
        resolution = %opts.config.transform.resolution,
        format = %opts.config.transform.format,
        quality = opts.config.transform.quality,
        workers = app.workers(),
        dry_run = opts.dry_run,
        "Starting"
    );

    let start = std::time::Instant::now();
    let spinner = (!prune_only).then(SpinnerProgress::new);
    let sink: Arc<dyn ProgressSink> = match &spinner {
        Some(spinner) => Arc::new(spinner.clone()),
        None => Arc::new(NoProgress),
    };

    let summary = app.run(sink).await?;

    if let Some(spinner) = spinner {
        spinner.finish();
    }
    print_summary(&summary, start.elapsed());
    Ok(())
}
