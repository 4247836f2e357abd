//! Logging initialization for the command line front end

use crate::config::LoggingSettings;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Build the level filter
///
/// Precedence:
/// 1. `verbose` -> debug
/// 2. RUST_LOG environment variable
/// 3. Configured `logging.level`
pub fn build_filter(settings: &LoggingSettings) -> EnvFilter {
    if settings.verbose {
        EnvFilter::new("debug")
    } else if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::new(&settings.level)
    }
}

/// Install the global subscriber, writing to stderr
///
/// Does nothing if a subscriber is already installed.
pub fn init_logging(settings: &LoggingSettings) {
    let registry = tracing_subscriber::registry().with(build_filter(settings));

    let result = if settings.format == "json" {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    if result.is_err() {
        tracing::debug!("Global subscriber already installed");
    }
}
