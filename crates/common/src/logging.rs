//! Tracing subscriber setup.
//!
//! The filter honors `RUST_LOG` when set, falling back to the configured
//! level string, so `RUST_LOG=mimic_playback=trace mimic play` works
//! without editing the config file. JSON output is for log shippers; the
//! plain format stays terse because capture and playback log on hot
//! paths.

use crate::config::LoggingConfig;

/// Install the global tracing subscriber. A second call is a no-op.
pub fn init_logging(config: &LoggingConfig) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    let builder = fmt::Subscriber::builder().with_env_filter(filter);
    let installed = if config.json {
        tracing::subscriber::set_global_default(builder.json().finish())
    } else {
        tracing::subscriber::set_global_default(
            builder
                .with_target(true)
                .with_file(false)
                .with_line_number(false)
                .finish(),
        )
    };
    installed.ok();
}

/// Subscriber with the default configuration, for tests and one-off
/// scripts.
pub fn init_default_logging() {
    init_logging(&LoggingConfig::default());
}
