use crate::error::CoreError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A single daily OHLCV observation.
///
/// Prices are quoted in the instrument's native currency. The bar carries no
/// symbol of its own; it always lives inside a [`crate::Series`] that belongs to
/// exactly one symbol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bar {
    pub date: NaiveDate,
    pub open: Decimal,
    pub high: Decimal,
    pub low: Decimal,
    pub close: Decimal,
    pub volume: u64,
}

impl Bar {
    /// Checks the price invariants of the bar: every price is positive and
    /// `low <= open, close <= high`.
    ///
    /// `index` is the bar's position in its series and is only used to make the
    /// error message actionable.
    pub fn validate(&self, index: usize) -> Result<(), CoreError> {
        let malformed = |reason: String| CoreError::MalformedBar {
            index,
            date: self.date,
            reason,
        };

        for (name, price) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ] {
            if price <= Decimal::ZERO {
                return Err(malformed(format!("{name} price {price} is not positive")));
            }
        }

        if self.low > self.high {
            return Err(malformed(format!(
                "low {} is above high {}",
                self.low, self.high
            )));
        }
        if self.open < self.low || self.open > self.high {
            return Err(malformed(format!(
                "open {} is outside the range [{}, {}]",
                self.open, self.low, self.high
            )));
        }
        if self.close < self.low || self.close > self.high {
            return Err(malformed(format!(
                "close {} is outside the range [{}, {}]",
                self.close, self.low, self.high
            )));
        }

        Ok(())
    }
}
