use crate::bar::Bar;
use crate::error::CoreError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// The daily price history of one symbol, ordered by ascending date.
///
/// A `Series` may be empty. Consumers only ever borrow it; nothing in the
/// workspace mutates a series after it has been fetched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Series {
    pub bars: Vec<Bar>,
}

impl Series {
    pub fn new(bars: Vec<Bar>) -> Self {
        Self { bars }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// The closing prices in date order.
    ///
    /// Bars sharing a date keep their series order, so the final close always
    /// belongs to the bar returned by [`Series::last`].
    pub fn closes(&self) -> Vec<Decimal> {
        if self.bars.windows(2).all(|pair| pair[0].date <= pair[1].date) {
            return self.bars.iter().map(|bar| bar.close).collect();
        }
        let mut bars: Vec<&Bar> = self.bars.iter().collect();
        bars.sort_by_key(|bar| bar.date);
        bars.into_iter().map(|bar| bar.close).collect()
    }

    /// The most recent bar, i.e. the one with the greatest date.
    ///
    /// For a correctly ordered series this is simply the last element, but the
    /// lookup does not rely on ordering so tolerated, unordered input still
    /// yields the latest observation.
    pub fn last(&self) -> Option<&Bar> {
        self.bars
            .iter()
            .enumerate()
            .max_by_key(|(i, bar)| (bar.date, *i))
            .map(|(_, bar)| bar)
    }

    /// Validates every bar and checks that dates are strictly ascending.
    pub fn validate(&self) -> Result<(), CoreError> {
        for (index, bar) in self.bars.iter().enumerate() {
            bar.validate(index)?;
        }

        for (index, pair) in self.bars.windows(2).enumerate() {
            if pair[1].date <= pair[0].date {
                return Err(CoreError::MalformedBar {
                    index: index + 1,
                    date: pair[1].date,
                    reason: format!(
                        "date is not after the previous bar's date {}",
                        pair[0].date
                    ),
                });
            }
        }

        Ok(())
    }
}

impl From<Vec<Bar>> for Series {
    fn from(bars: Vec<Bar>) -> Self {
        Self::new(bars)
    }
}
