//! frameo-miniatures - Resize and sync photo trees for Frameo digital frames.
//!
//! Walks an input tree of camera photos and mirrors it into an output tree of
//! frame-sized WebP or JPEG miniatures, keeping capture time and location.
//!
//! # Usage
//!
//! ```bash
//! # Process ./photos into ./frame at the default 1280x800
//! frameo-miniatures -i ./photos -o ./frame
//!
//! # Incremental sync that also removes outputs of deleted photos
//! frameo-miniatures -i ./photos -o ./frame --skip-existing --prune
//!
//! # View configuration
//! frameo-miniatures config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// frameo-miniatures - Resize, compress and sync photos for digital photo frames.
#[derive(Parser, Debug)]
#[command(name = "frameo-miniatures")]
#[command(author, version, about, long_about = None)]
#[command(args_conflicts_with_subcommands = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(flatten)]
    run: cli::run::RunArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands. Without one, the input tree is processed.
#[derive(Subcommand, Debug)]
enum Commands {
    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match frameo_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `frameo-miniatures config path`."
            );
            frameo_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("frameo-miniatures v{}", frameo_core::VERSION);

    match cli.command {
        Some(Commands::Config(args)) => cli::config::execute(args).await,
        None => cli::run::execute(cli.run, config).await,
    }
}
