use std::path::Path;

// Declare the modules that make up this crate.
pub mod error;
pub mod logging;
pub mod settings;

// Re-export the core types to provide a clean public API.
pub use error::ConfigError;
pub use logging::init_tracing;
pub use settings::{
    Config, EmaPolicy, LoggingSettings, MalformedBarPolicy, MetricsSettings, ProviderSettings,
};

/// Prefix of the environment variables that override file settings,
/// e.g. `SUMMIT__PROVIDER__TIMEOUT_SECS=10`.
pub const ENV_PREFIX: &str = "SUMMIT";

/// Loads the application configuration.
///
/// Reads `config.toml` from the working directory when it exists (or the given
/// `path`, which then must exist), layers `SUMMIT__*` environment variables on
/// top, deserializes the result into our strongly-typed `Config` struct and
/// validates it.
pub fn load_config(path: Option<&Path>) -> Result<Config, ConfigError> {
    let file = match path {
        Some(path) => config::File::from(path).required(true),
        None => config::File::with_name("config.toml").required(false),
    };

    let builder = config::Config::builder()
        .add_source(file)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("__")
                .separator("__")
                .list_separator(",")
                .with_list_parse_key("metrics.ema_periods")
                .try_parsing(true),
        )
        .build()?;

    // Attempt to deserialize the entire configuration into our `Config` struct
    let config = builder.try_deserialize::<Config>()?;
    config.validate()?;

    tracing::debug!(?config, "Configuration loaded");
    Ok(config)
}
