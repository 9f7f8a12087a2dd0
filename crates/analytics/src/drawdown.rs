use crate::error::MetricsError;
use chrono::NaiveDate;
use core_types::Series;
use rust_decimal::Decimal;
use serde::Serialize;

/// Current price, all-time high and how far the former sits below the latter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DrawdownSummary {
    /// Close of the latest bar.
    pub current_price: Decimal,
    /// Highest `high` across the whole series.
    pub all_time_high: Decimal,
    /// `(current_price - all_time_high) / all_time_high * 100`, unrounded.
    pub drawdown_pct: Decimal,
    /// Date of the latest bar.
    pub as_of: NaiveDate,
    /// First date on which the all-time high was printed.
    pub ath_date: NaiveDate,
}

/// Derives CMP, ATH and the drawdown percentage from a price history.
///
/// An empty series fails with [`MetricsError::NoData`]. An all-time high of
/// exactly zero can only come from degenerate data; the drawdown is then
/// reported as zero instead of dividing by zero. A percentage outside
/// `Decimal`'s range fails with [`MetricsError::NumericOverflow`].
pub fn compute_drawdown(series: &Series) -> Result<DrawdownSummary, MetricsError> {
    let latest = series.last().ok_or(MetricsError::NoData)?;

    // `series.last()` succeeded, so there is at least one bar to seed the fold.
    let first = &series.bars[0];
    let (all_time_high, ath_date) = series
        .bars
        .iter()
        .skip(1)
        .fold((first.high, first.date), |(high, date), bar| {
            if bar.high > high || (bar.high == high && bar.date < date) {
                (bar.high, bar.date)
            } else {
                (high, date)
            }
        });

    let current_price = latest.close;
    let drawdown_pct = if all_time_high > Decimal::ZERO {
        current_price
            .checked_sub(all_time_high)
            .and_then(|diff| diff.checked_div(all_time_high))
            .and_then(|ratio| ratio.checked_mul(Decimal::ONE_HUNDRED))
            .ok_or_else(|| MetricsError::overflow("drawdown"))?
    } else {
        Decimal::ZERO
    };

    tracing::trace!(%current_price, %all_time_high, %drawdown_pct, "Drawdown computed");

    Ok(DrawdownSummary {
        current_price,
        all_time_high,
        drawdown_pct,
        as_of: latest.date,
        ath_date,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use core_types::Bar;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn bar(day: u32, high: Decimal, close: Decimal) -> Bar {
        Bar {
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
            open: close,
            high,
            low: close.min(high),
            close,
            volume: 1_000,
        }
    }

    #[test]
    fn worked_example_from_four_bars() {
        let series = Series::new(vec![
            bar(1, dec!(100), dec!(95)),
            bar(2, dec!(120), dec!(110)),
            bar(3, dec!(90), dec!(85)),
            bar(4, dec!(80), dec!(80)),
        ]);

        let summary = compute_drawdown(&series).unwrap();
        assert_eq!(summary.all_time_high, dec!(120));
        assert_eq!(summary.current_price, dec!(80));
        assert_eq!(summary.drawdown_pct.round_dp(2), dec!(-33.33));
        assert_eq!(summary.ath_date, NaiveDate::from_ymd_opt(2024, 1, 2).unwrap());
        assert_eq!(summary.as_of, NaiveDate::from_ymd_opt(2024, 1, 4).unwrap());
    }

    #[test]
    fn empty_series_is_no_data() {
        assert_eq!(compute_drawdown(&Series::empty()), Err(MetricsError::NoData));
    }

    #[test]
    fn zero_all_time_high_saturates_to_zero() {
        let series = Series::new(vec![bar(1, dec!(0), dec!(0)), bar(2, dec!(0), dec!(0))]);
        let summary = compute_drawdown(&series).unwrap();
        assert_eq!(summary.all_time_high, Decimal::ZERO);
        assert_eq!(summary.drawdown_pct, Decimal::ZERO);
    }

    #[test]
    fn fresh_high_on_the_last_bar_is_zero_drawdown() {
        let series = Series::new(vec![bar(1, dec!(50), dec!(45)), bar(2, dec!(60), dec!(60))]);
        assert_eq!(compute_drawdown(&series).unwrap().drawdown_pct, Decimal::ZERO);
    }

    #[test]
    fn ath_date_is_the_first_time_the_high_was_printed() {
        let series = Series::new(vec![
            bar(1, dec!(70), dec!(60)),
            bar(2, dec!(70), dec!(65)),
            bar(3, dec!(68), dec!(66)),
        ]);
        let summary = compute_drawdown(&series).unwrap();
        assert_eq!(summary.ath_date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    fn price() -> impl Strategy<Value = Decimal> {
        (1i64..1_000_000).prop_map(|cents| Decimal::new(cents, 2))
    }

    proptest! {
        #[test]
        fn no_bar_exceeds_the_all_time_high(highs in prop::collection::vec(price(), 1..200)) {
            let bars: Vec<Bar> = highs
                .iter()
                .enumerate()
                .map(|(i, high)| Bar {
                    date: NaiveDate::from_ymd_opt(2000, 1, 1).unwrap() + chrono::Days::new(i as u64),
                    open: *high,
                    high: *high,
                    low: *high,
                    close: *high,
                    volume: 0,
                })
                .collect();
            let series = Series::new(bars);

            let summary = compute_drawdown(&series).unwrap();
            prop_assert!(series.bars.iter().all(|b| b.high <= summary.all_time_high));
            prop_assert!(series.bars.iter().any(|b| b.high == summary.all_time_high));
            prop_assert!(summary.drawdown_pct <= Decimal::ZERO);
        }

        #[test]
        fn closing_at_the_top_means_zero_drawdown(
            earlier in prop::collection::vec(price(), 0..100),
            top in price(),
        ) {
            let start = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
            let mut bars: Vec<Bar> = earlier
                .iter()
                .enumerate()
                .map(|(i, p)| {
                    let high = (*p).min(top);
                    Bar {
                        date: start + chrono::Days::new(i as u64),
                        open: high,
                        high,
                        low: high,
                        close: high,
                        volume: 0,
                    }
                })
                .collect();
            bars.push(Bar {
                date: start + chrono::Days::new(earlier.len() as u64),
                open: top,
                high: top,
                low: top,
                close: top,
                volume: 0,
            });

            let summary = compute_drawdown(&Series::new(bars)).unwrap();
            prop_assert_eq!(summary.drawdown_pct, Decimal::ZERO);
        }
    }
}
