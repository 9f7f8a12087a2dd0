use crate::drawdown::compute_drawdown;
use crate::ema::compute_stock_emas;
use crate::error::MetricsError;
use crate::report::{MetricsResult, SymbolMetrics};
use configuration::{EmaPolicy, MalformedBarPolicy, MetricsSettings};
use core_types::{Series, Symbol};
use rayon::prelude::*;

/// A stateless calculator that turns price histories into [`MetricsResult`]s.
///
/// The engine only holds its (validated) settings, so one instance can be
/// shared freely across threads and tasks.
#[derive(Debug, Clone)]
pub struct MetricsEngine {
    /// Sorted and de-duplicated.
    periods: Vec<usize>,
    ema_policy: EmaPolicy,
    malformed_bars: MalformedBarPolicy,
}

impl MetricsEngine {
    /// Builds an engine from its settings.
    ///
    /// A zero period is rejected; repeated periods are collapsed. An empty
    /// period list is allowed and yields drawdown-only results.
    pub fn new(settings: &MetricsSettings) -> Result<Self, MetricsError> {
        if settings.ema_periods.contains(&0) {
            return Err(MetricsError::InvalidSettings {
                message: "EMA periods must be positive".to_string(),
            });
        }

        let mut periods = settings.ema_periods.clone();
        periods.sort_unstable();
        periods.dedup();

        Ok(Self {
            periods,
            ema_policy: settings.ema_policy,
            malformed_bars: settings.malformed_bars,
        })
    }

    pub fn periods(&self) -> &[usize] {
        &self.periods
    }

    /// Runs the full pipeline for one symbol and never panics on bad data:
    /// every problem comes back as a `Failure`.
    pub fn compute_symbol(&self, symbol: &Symbol, series: &Series) -> MetricsResult {
        match self.compute(symbol, series) {
            Ok(metrics) => MetricsResult::Success(metrics),
            Err(reason) => {
                tracing::debug!(%symbol, error = %reason, "Metrics computation failed");
                MetricsResult::failure(symbol.as_str(), reason)
            }
        }
    }

    /// Computes every request independently, returning one result per request
    /// in request order. A failing symbol never stops the others.
    pub fn compute_batch(&self, requests: &[(Symbol, Series)]) -> Vec<MetricsResult> {
        tracing::debug!(symbols = requests.len(), "Computing metrics batch");

        // Indexed parallel iterators collect in input order.
        requests
            .par_iter()
            .map(|(symbol, series)| self.compute_symbol(symbol, series))
            .collect()
    }

    fn compute(&self, symbol: &Symbol, series: &Series) -> Result<SymbolMetrics, MetricsError> {
        if series.is_empty() {
            return Err(MetricsError::NoData);
        }

        match self.malformed_bars {
            MalformedBarPolicy::Reject => series.validate()?,
            MalformedBarPolicy::Tolerate => {
                if let Err(err) = series.validate() {
                    tracing::debug!(%symbol, error = %err, "Tolerating malformed series");
                }
            }
        }

        // CMP is computed once here and shared with the EMA record below.
        let drawdown = compute_drawdown(series)?;
        let emas = compute_stock_emas(series, &self.periods)?;

        if self.ema_policy == EmaPolicy::RequireAll {
            // Periods are sorted, so the last missing one is the longest.
            if let Some(&period) = self.periods.iter().rev().find(|p| !emas.contains_key(p)) {
                return Err(MetricsError::InsufficientHistory {
                    period,
                    available: series.len(),
                });
            }
        }

        Ok(SymbolMetrics {
            symbol: symbol.clone(),
            current_price: drawdown.current_price,
            all_time_high: drawdown.all_time_high,
            drawdown_pct: drawdown.drawdown_pct,
            as_of: drawdown.as_of,
            ath_date: drawdown.ath_date,
            bars: series.len(),
            emas,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use chrono::NaiveDate;
    use core_types::Bar;
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    fn settings(periods: &[usize]) -> MetricsSettings {
        MetricsSettings {
            ema_periods: periods.to_vec(),
            ..MetricsSettings::default()
        }
    }

    fn rising_series(len: usize) -> Series {
        let start = NaiveDate::from_ymd_opt(2020, 1, 1).unwrap();
        Series::new(
            (0..len)
                .map(|i| {
                    let close = Decimal::from(100 + i as i64);
                    Bar {
                        date: start + chrono::Days::new(i as u64),
                        open: close,
                        high: close + dec!(1),
                        low: close - dec!(1),
                        close,
                        volume: 5_000,
                    }
                })
                .collect(),
        )
    }

    fn symbol(raw: &str) -> Symbol {
        Symbol::parse(raw).unwrap()
    }

    #[test]
    fn new_rejects_zero_and_normalizes_periods() {
        assert!(matches!(
            MetricsEngine::new(&settings(&[20, 0])),
            Err(MetricsError::InvalidSettings { .. })
        ));

        let engine = MetricsEngine::new(&settings(&[100, 20, 50, 20])).unwrap();
        assert_eq!(engine.periods(), &[20, 50, 100]);
    }

    #[test]
    fn success_shares_cmp_with_the_ema_record() {
        let engine = MetricsEngine::new(&MetricsSettings::default()).unwrap();
        let series = rising_series(120);

        let result = engine.compute_symbol(&symbol("TCS"), &series);
        let metrics = result.metrics().expect("expected success");

        assert_eq!(metrics.symbol.as_str(), "TCS");
        assert_eq!(metrics.current_price, dec!(219));
        assert_eq!(metrics.all_time_high, dec!(220));
        assert_eq!(metrics.bars, 120);
        assert_eq!(metrics.emas.keys().copied().collect::<Vec<_>>(), vec![20, 50, 100]);
        assert!(metrics.emas.values().all(|ema| *ema < metrics.current_price));
    }

    #[test]
    fn require_all_fails_on_the_longest_missing_period() {
        let engine = MetricsEngine::new(&MetricsSettings::default()).unwrap();
        let result = engine.compute_symbol(&symbol("NEWIPO"), &rising_series(30));

        assert_eq!(
            result,
            MetricsResult::failure(
                "NEWIPO",
                MetricsError::InsufficientHistory {
                    period: 100,
                    available: 30
                }
            )
        );
    }

    #[test]
    fn allow_partial_keeps_the_defined_periods() {
        let engine = MetricsEngine::new(&MetricsSettings {
            ema_policy: EmaPolicy::AllowPartial,
            ..MetricsSettings::default()
        })
        .unwrap();

        let result = engine.compute_symbol(&symbol("NEWIPO"), &rising_series(60));
        let metrics = result.metrics().expect("partial results are a success");
        assert_eq!(metrics.emas.keys().copied().collect::<Vec<_>>(), vec![20, 50]);
    }

    #[test]
    fn empty_period_set_is_drawdown_only() {
        let engine = MetricsEngine::new(&settings(&[])).unwrap();
        let result = engine.compute_symbol(&symbol("X"), &rising_series(1));
        assert!(result.is_success());
        assert!(result.metrics().unwrap().emas.is_empty());
    }

    #[test]
    fn empty_series_is_no_data_before_anything_else() {
        let engine = MetricsEngine::new(&MetricsSettings::default()).unwrap();
        let result = engine.compute_symbol(&symbol("GHOST"), &Series::empty());
        assert_eq!(result.error_kind(), Some(ErrorKind::NoData));
    }

    #[test]
    fn malformed_bars_follow_the_configured_policy() {
        let mut series = rising_series(120);
        // Close printed above the day's high.
        series.bars[10].close = series.bars[10].high + dec!(5);

        let strict = MetricsEngine::new(&MetricsSettings::default()).unwrap();
        let result = strict.compute_symbol(&symbol("BAD"), &series);
        match result {
            MetricsResult::Failure {
                reason: MetricsError::MalformedBar { index, .. },
                ..
            } => assert_eq!(index, 10),
            other => panic!("expected a malformed-bar failure, got {other:?}"),
        }

        let lenient = MetricsEngine::new(&MetricsSettings {
            malformed_bars: MalformedBarPolicy::Tolerate,
            ..MetricsSettings::default()
        })
        .unwrap();
        assert!(lenient.compute_symbol(&symbol("BAD"), &series).is_success());
    }

    fn tolerant_engine(periods: &[usize]) -> MetricsEngine {
        MetricsEngine::new(&MetricsSettings {
            ema_periods: periods.to_vec(),
            malformed_bars: MalformedBarPolicy::Tolerate,
            ..MetricsSettings::default()
        })
        .unwrap()
    }

    #[test]
    fn tolerated_extreme_prices_fail_instead_of_panicking() {
        // A near-zero high against a huge close sends the percentage past Decimal::MAX.
        let mut series = rising_series(1);
        series.bars[0].high = dec!(0.0000000001);
        series.bars[0].close = dec!(100000000000000000000);

        let result = tolerant_engine(&[]).compute_symbol(&symbol("WILD"), &series);
        assert_eq!(
            result,
            MetricsResult::failure(
                "WILD",
                MetricsError::NumericOverflow {
                    metric: "drawdown".to_string()
                }
            )
        );

        let mut series = rising_series(2);
        series.bars[0].close = Decimal::MIN;
        series.bars[1].high = Decimal::MAX;
        series.bars[1].close = Decimal::MAX;
        let result = tolerant_engine(&[2]).compute_symbol(&symbol("WILD"), &series);
        assert_eq!(result.error_kind(), Some(ErrorKind::NumericOverflow));
    }

    #[test]
    fn overflow_in_one_symbol_leaves_the_batch_intact() {
        let mut wild = rising_series(1);
        wild.bars[0].high = dec!(0.0000000001);
        wild.bars[0].close = dec!(100000000000000000000);
        let requests = vec![
            (symbol("A"), rising_series(30)),
            (symbol("WILD"), wild),
            (symbol("C"), rising_series(30)),
        ];

        let results = tolerant_engine(&[20]).compute_batch(&requests);

        assert!(results[0].is_success());
        assert_eq!(results[1].error_kind(), Some(ErrorKind::NumericOverflow));
        assert!(results[2].is_success());
    }

    #[test]
    fn tolerated_unordered_bars_average_in_date_order() {
        let ordered = rising_series(25);
        let mut shuffled = ordered.clone();
        shuffled.bars.reverse();

        let engine = tolerant_engine(&[20]);
        let from_ordered = engine.compute_symbol(&symbol("X"), &ordered);
        let from_shuffled = engine.compute_symbol(&symbol("X"), &shuffled);

        let (a, b) = (from_ordered.metrics().unwrap(), from_shuffled.metrics().unwrap());
        assert_eq!(a.current_price, b.current_price);
        assert_eq!(a.emas, b.emas);
    }

    #[test]
    fn batch_keeps_order_and_isolates_failures() {
        let engine = MetricsEngine::new(&MetricsSettings::default()).unwrap();
        let requests = vec![
            (symbol("A"), rising_series(150)),
            (symbol("B"), Series::empty()),
            (symbol("C"), rising_series(100)),
        ];

        let results = engine.compute_batch(&requests);

        assert_eq!(results.len(), 3);
        assert_eq!(
            results.iter().map(MetricsResult::symbol).collect::<Vec<_>>(),
            vec!["A", "B", "C"]
        );
        assert!(results[0].is_success());
        assert_eq!(results[1].error_kind(), Some(ErrorKind::NoData));
        assert!(results[2].is_success());
    }

    #[test]
    fn batch_matches_sequential_computation() {
        let engine = MetricsEngine::new(&MetricsSettings::default()).unwrap();
        let requests: Vec<(Symbol, Series)> = (0..32)
            .map(|i| (symbol(&format!("S{i}")), rising_series(90 + i)))
            .collect();

        let sequential: Vec<MetricsResult> = requests
            .iter()
            .map(|(s, series)| engine.compute_symbol(s, series))
            .collect();
        assert_eq!(engine.compute_batch(&requests), sequential);
    }
}
