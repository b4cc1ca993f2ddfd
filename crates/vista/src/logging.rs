//! Logging initialization.
//!
//! Logs always go to stderr; stdout carries reports.

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Install the global subscriber.
///
/// `RUST_LOG` wins over `level` when set.
pub fn init(level: &str, json_format: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

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

/// Initialize from the `[logging]` section, with CLI flag overrides.
pub fn init_from_config(config: &vista_core::Config, verbose: bool, json_logs: bool) {
    init(
        &effective_level(&config.logging.level, verbose),
        json_logs || config.logging.format == "json",
    );
}

/// `--verbose` raises anything quieter than debug to debug.
fn effective_level(configured: &str, verbose: bool) -> String {
    let configured = configured.to_lowercase();
    if verbose && !matches!(configured.as_str(), "debug" | "trace") {
        "debug".to_string()
    } else {
        configured
    }
}
