use tracing_subscriber::EnvFilter;

use crate::config::LoggingConfig;

/// Installs the global fmt subscriber.
///
/// `RUST_LOG` takes precedence over the configured level. Calling this twice
/// keeps the first subscriber.
pub fn init(config: &LoggingConfig) {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.level.to_lowercase())),
        )
        .with_ansi(config.ansi)
        .try_init()
        .ok();
}
