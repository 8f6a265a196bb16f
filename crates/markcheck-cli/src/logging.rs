//! Tracing subscriber set-up.

use tracing_subscriber::EnvFilter;

use crate::commands::LogFormat;
use crate::config::CliConfig;

/// Install the global subscriber; `RUST_LOG` overrides the verbosity flags.
///
/// Logs go to stderr so stdout carries only the run summary.
pub fn init_logging(config: &CliConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.verbosity.filter()));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);

    // A second init (tests) keeps the first subscriber.
    let _ = match config.log_format {
        LogFormat::Text => builder
            .with_ansi(config.color.should_color())
            .try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
