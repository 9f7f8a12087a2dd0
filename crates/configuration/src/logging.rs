//! Tracing initialisation for the binary.
//!
//! Diagnostics go to stderr so they never interleave with the report on
//! stdout. The level comes from `RUST_LOG` when it is set and from
//! [`LoggingSettings::level`] otherwise.

use crate::error::ConfigError;
use crate::settings::LoggingSettings;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Installs the global subscriber.
///
/// When a log directory is configured, a daily rolling file layer is added and
/// the returned guard must be held until shutdown so buffered lines get flushed.
pub fn init_tracing(settings: &LoggingSettings) -> Result<Option<WorkerGuard>, ConfigError> {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(&settings.level)
            .map_err(|e| ConfigError::LoggingError(format!("invalid level '{}': {e}", settings.level)))?,
    };

    let (file_layer, guard) = match &settings.directory {
        Some(directory) => {
            let appender = tracing_appender::rolling::daily(directory, &settings.file_prefix);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_writer(writer).with_ansi(false);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(true))
        .with(file_layer)
        .try_init()
        .map_err(|e| ConfigError::LoggingError(e.to_string()))?;

    tracing::debug!(level = %settings.level, directory = ?settings.directory, "Logging initialized");
    Ok(guard)
}
