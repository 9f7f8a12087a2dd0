use crate::error::ConfigError;
use serde::Deserialize;
use std::path::PathBuf;

/// The root configuration structure for the entire application.
///
/// Every section falls back to its defaults, so an absent `config.toml` is a
/// valid configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub metrics: MetricsSettings,
    pub provider: ProviderSettings,
    pub logging: LoggingSettings,
}

impl Config {
    /// Rejects values that would make the metrics engine or the provider unusable.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.metrics.validate()?;
        self.provider.validate()?;
        Ok(())
    }
}

/// What to do when a requested EMA period has fewer bars than its span.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum EmaPolicy {
    /// Fail the whole symbol with an insufficient-history error.
    #[default]
    RequireAll,
    /// Report the periods that are defined and omit the rest.
    AllowPartial,
}

/// What to do with a bar that breaks the `low <= open, close <= high` invariant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum MalformedBarPolicy {
    /// Fail the symbol.
    #[default]
    Reject,
    /// Take highs and closes at face value. Bars are still read in date
    /// order, so CMP and the EMAs describe the same latest bar. Prices that push
    /// a result outside the decimal range fail the symbol.
    Tolerate,
}

/// Parameters handed to the metrics engine.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct MetricsSettings {
    /// EMA spans, in bars. An empty list produces a drawdown-only report.
    pub ema_periods: Vec<usize>,
    pub ema_policy: EmaPolicy,
    pub malformed_bars: MalformedBarPolicy,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            ema_periods: vec![20, 50, 100],
            ema_policy: EmaPolicy::default(),
            malformed_bars: MalformedBarPolicy::default(),
        }
    }
}

impl MetricsSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ema_periods.contains(&0) {
            return Err(ConfigError::ValidationError(
                "metrics.ema_periods must only contain positive periods".to_string(),
            ));
        }
        Ok(())
    }
}

/// Connection details for the market-data provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ProviderSettings {
    /// Scheme and host of the chart API, without a trailing slash.
    pub base_url: String,
    /// Appended to every symbol before lookup (".NS" for the National Stock Exchange).
    pub exchange_suffix: String,
    /// History window requested from the provider.
    pub range: String,
    pub timeout_secs: u64,
    pub user_agent: String,
    /// Upper bound on histories downloaded at the same time.
    pub max_concurrent_fetches: usize,
}

impl Default for ProviderSettings {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            exchange_suffix: ".NS".to_string(),
            range: "max".to_string(),
            timeout_secs: 30,
            user_agent: concat!("summit/", env!("CARGO_PKG_VERSION")).to_string(),
            max_concurrent_fetches: 4,
        }
    }
}

impl ProviderSettings {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "provider.base_url must not be empty".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ConfigError::ValidationError(
                "provider.timeout_secs must be greater than zero".to_string(),
            ));
        }
        if self.max_concurrent_fetches == 0 {
            return Err(ConfigError::ValidationError(
                "provider.max_concurrent_fetches must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

/// Where diagnostics go. `RUST_LOG`, when set, overrides `level`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    pub level: String,
    /// When set, logs are also written to a daily rolling file in this directory.
    pub directory: Option<PathBuf>,
    pub file_prefix: String,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            directory: None,
            file_prefix: "summit.log".to_string(),
        }
    }
}
