//! # Logging Setup
//!
//! Builds the `Dispatch` a run logs to. `RUST_LOG` wins over the configured
//! `log_level`.

use tracing::Dispatch;
use tracing_subscriber::EnvFilter;

use crate::config::ConfigError;

/// Build a dispatch writing human-readable or JSON lines to stderr.
pub fn build_dispatch(log_level: &str, json: bool) -> Result<Dispatch, ConfigError> {
    let filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(log_level).map_err(|e| ConfigError::LogLevel {
            level: log_level.to_string(),
            reason: e.to_string(),
        })?,
    };

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr);

    Ok(if json {
        Dispatch::new(builder.json().finish())
    } else {
        Dispatch::new(builder.finish())
    })
}
