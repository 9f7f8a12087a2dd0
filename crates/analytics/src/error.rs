use chrono::NaiveDate;
use core_types::CoreError;
use serde::Serialize;
use thiserror::Error;

/// Every way a single symbol's metrics can fail.
///
/// Failures are values: they are returned inside a
/// [`crate::MetricsResult::Failure`] and never abort a batch.
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MetricsError {
    #[error("Invalid symbol '{raw}': identifier is empty after trimming")]
    InvalidSymbol { raw: String },

    #[error("No price history is available")]
    NoData,

    #[error("Market-data provider failed: {message}")]
    ProviderError { message: String },

    #[error("Not enough history for the {period}-period EMA: only {available} bars available")]
    InsufficientHistory { period: usize, available: usize },

    #[error("Malformed bar #{index} ({date}): {reason}")]
    MalformedBar {
        index: usize,
        date: NaiveDate,
        reason: String,
    },

    /// Only reachable with tolerated malformed data: a price so far from the
    /// others that the result leaves `Decimal`'s range.
    #[error("The {metric} calculation overflowed the decimal range")]
    NumericOverflow { metric: String },

    #[error("Invalid metrics settings: {message}")]
    InvalidSettings { message: String },
}

/// The discriminant of a [`MetricsError`], for matching without the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidSymbol,
    NoData,
    ProviderError,
    InsufficientHistory,
    MalformedBar,
    NumericOverflow,
    InvalidSettings,
}

impl MetricsError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            MetricsError::InvalidSymbol { .. } => ErrorKind::InvalidSymbol,
            MetricsError::NoData => ErrorKind::NoData,
            MetricsError::ProviderError { .. } => ErrorKind::ProviderError,
            MetricsError::InsufficientHistory { .. } => ErrorKind::InsufficientHistory,
            MetricsError::MalformedBar { .. } => ErrorKind::MalformedBar,
            MetricsError::NumericOverflow { .. } => ErrorKind::NumericOverflow,
            MetricsError::InvalidSettings { .. } => ErrorKind::InvalidSettings,
        }
    }

    pub(crate) fn overflow(metric: &str) -> Self {
        MetricsError::NumericOverflow {
            metric: metric.to_string(),
        }
    }

    /// Shorthand used by providers to wrap their transport or decoding failures.
    pub fn provider(message: impl Into<String>) -> Self {
        MetricsError::ProviderError {
            message: message.into(),
        }
    }
}

impl From<CoreError> for MetricsError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::InvalidSymbol(raw) => MetricsError::InvalidSymbol { raw },
            CoreError::MalformedBar {
                index,
                date,
                reason,
            } => MetricsError::MalformedBar {
                index,
                date,
                reason,
            },
        }
    }
}
