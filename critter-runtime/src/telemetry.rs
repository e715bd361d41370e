//! Tracing subscriber setup.

use anyhow::anyhow;
use tracing_subscriber::EnvFilter;

use critter_core::config::GeneralConfig;

/// Build the log filter. `RUST_LOG` wins over the configured level.
#[must_use]
pub fn env_filter(log_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level))
}

/// Install the global fmt subscriber.
///
/// # Errors
/// Fails if a global subscriber is already installed.
pub fn init_tracing(general: &GeneralConfig) -> anyhow::Result<()> {
    let filter = env_filter(&general.log_level);
    let builder = tracing_subscriber::fmt().with_env_filter(filter).with_target(false);
    let installed = if general.json_logs {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| anyhow!("failed to install tracing subscriber: {e}"))
}
