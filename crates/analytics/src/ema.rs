use crate::error::MetricsError;
use core_types::Series;
use rust_decimal::Decimal;
use std::collections::BTreeMap;

/// The EMA of `closes` evaluated at the last observation.
///
/// The average is seeded with the first close and runs over the entire
/// history with `alpha = 2 / (period + 1)`, so it is the cumulative EMA rather
/// than one restricted to the last `period` closes.
///
/// Returns `None` when `period` is zero or when fewer than `period` closes are
/// available: an average over a shorter warm-up would understate the
/// smoothing horizon. It is also `None` if the recurrence leaves `Decimal`'s
/// range, which [`compute_stock_emas`] reports as an error instead.
pub fn compute_ema(closes: &[Decimal], period: usize) -> Option<Decimal> {
    if !has_warmed_up(closes, period) {
        return None;
    }
    recurrence(closes, period)
}

/// Runs [`compute_ema`] once per period over the closes of `series`.
///
/// Periods without enough history are left out of the returned map. A period
/// whose average overflows fails with [`MetricsError::NumericOverflow`].
pub fn compute_stock_emas(
    series: &Series,
    periods: &[usize],
) -> Result<BTreeMap<usize, Decimal>, MetricsError> {
    let closes = series.closes();
    let mut emas = BTreeMap::new();
    for &period in periods {
        if !has_warmed_up(&closes, period) {
            continue;
        }
        let ema = recurrence(&closes, period)
            .ok_or_else(|| MetricsError::overflow(&format!("{period}-period EMA")))?;
        emas.insert(period, ema);
    }
    Ok(emas)
}

fn has_warmed_up(closes: &[Decimal], period: usize) -> bool {
    period != 0 && closes.len() >= period
}

/// `None` on an empty slice or on overflow.
fn recurrence(closes: &[Decimal], period: usize) -> Option<Decimal> {
    let alpha = Decimal::TWO.checked_div(Decimal::from(period).checked_add(Decimal::ONE)?)?;
    let (first, rest) = closes.split_first()?;

    // ema + alpha * (close - ema) == alpha * close + (1 - alpha) * ema
    rest.iter().try_fold(*first, |ema, close| {
        close
            .checked_sub(ema)
            .and_then(|delta| alpha.checked_mul(delta))
            .and_then(|step| ema.checked_add(step))
    })
}
