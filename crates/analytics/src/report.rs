use crate::error::{ErrorKind, MetricsError};
use chrono::NaiveDate;
use core_types::Symbol;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

/// Everything derived for one symbol from a single snapshot of its history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SymbolMetrics {
    pub symbol: Symbol,
    pub current_price: Decimal,
    pub all_time_high: Decimal,
    pub drawdown_pct: Decimal,
    pub as_of: NaiveDate,
    pub ath_date: NaiveDate,
    /// Number of bars the metrics were computed from.
    pub bars: usize,
    /// EMA value keyed by period.
    pub emas: BTreeMap<usize, Decimal>,
}

/// The terminal outcome for one requested symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum MetricsResult {
    Success(SymbolMetrics),
    Failure {
        /// The identifier as the caller supplied it, normalized when possible.
        symbol: String,
        reason: MetricsError,
    },
}

impl MetricsResult {
    pub fn failure(symbol: impl Into<String>, reason: MetricsError) -> Self {
        MetricsResult::Failure {
            symbol: symbol.into(),
            reason,
        }
    }

    pub fn symbol(&self) -> &str {
        match self {
            MetricsResult::Success(metrics) => metrics.symbol.as_str(),
            MetricsResult::Failure { symbol, .. } => symbol,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, MetricsResult::Success(_))
    }

    pub fn metrics(&self) -> Option<&SymbolMetrics> {
        match self {
            MetricsResult::Success(metrics) => Some(metrics),
            MetricsResult::Failure { .. } => None,
        }
    }

    pub fn error_kind(&self) -> Option<ErrorKind> {
        match self {
            MetricsResult::Success(_) => None,
            MetricsResult::Failure { reason, .. } => Some(reason.kind()),
        }
    }
}
