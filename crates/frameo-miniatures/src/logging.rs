//! Logging initialization.
//!
//! Installs a `tracing` subscriber writing to stderr, human-readable or JSON.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber.
///
/// `level` is an `EnvFilter` directive (`info`, `trace`, `frameo_core=debug`)
/// used when `RUST_LOG` is unset.
pub fn init(level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if json_format {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr)
                    .with_ansi(true),
            )
            .init();
    }
}

/// Initialize logging from the `[logging]` config section, with CLI overrides.
pub fn init_from_config(
    config: &frameo_core::Config,
    verbose_override: bool,
    json_logs_override: bool,
) {
    let json_format = json_logs_override || config.logging.format == "json";
    init(&level_directive(config, verbose_override), json_format);
}

/// `-v` raises the level to at least debug; a configured `trace` is kept.
fn level_directive(config: &frameo_core::Config, verbose: bool) -> String {
    let level = config.logging.level.trim();
    if verbose && !level.eq_ignore_ascii_case("trace") {
        return "debug".to_string();
    }
    if level.is_empty() {
        return "info".to_string();
    }
    level.to_string()
}
