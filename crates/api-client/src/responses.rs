use crate::error::ApiError;
use chrono::{NaiveDate, TimeZone, Utc};
use core_types::{Bar, Series};
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::Deserialize;
use std::collections::BTreeMap;

// The chart endpoint wraps everything in `{"chart": {"result": [...], "error": ...}}`.

#[derive(Debug, Deserialize)]
pub struct ChartEnvelope {
    pub chart: Chart,
}

#[derive(Debug, Deserialize)]
pub struct Chart {
    pub result: Option<Vec<ChartResult>>,
    pub error: Option<ChartError>,
}

/// The error object returned instead of a result, e.g. for delisted symbols.
#[derive(Debug, Clone, Deserialize)]
pub struct ChartError {
    pub code: String,
    #[serde(default)]
    pub description: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ChartResult {
    pub meta: ChartMeta,
    /// Bar start times in epoch seconds. Absent when the symbol has no history.
    #[serde(default)]
    pub timestamp: Vec<i64>,
    pub indicators: Indicators,
}

#[derive(Debug, Deserialize)]
pub struct ChartMeta {
    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    /// Exchange offset from UTC in seconds; used to recover the local trading date.
    #[serde(default)]
    pub gmtoffset: i64,
}

#[derive(Debug, Deserialize)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<Quote>,
}

/// Column-oriented OHLCV values. Non-trading placeholders come through as `null`.
#[derive(Debug, Default, Deserialize)]
pub struct Quote {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<u64>>,
}

/// Decodes a chart response body into a date-ordered series.
///
/// Rows with any missing price are skipped. When two rows fall on the same
/// local date (the provider sometimes appends a live bar for today), the later
/// row wins.
pub fn parse_chart(body: &str) -> Result<Series, ApiError> {
    let envelope: ChartEnvelope =
        serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))?;

    if let Some(error) = envelope.chart.error {
        let description = error.description.unwrap_or_else(|| error.code.clone());
        return Err(if error.code.eq_ignore_ascii_case("Not Found") {
            ApiError::NotFound(description)
        } else {
            ApiError::ApiError(format!("{}: {}", error.code, description))
        });
    }

    let result = match envelope.chart.result.and_then(|r| r.into_iter().next()) {
        Some(result) => result,
        None => return Ok(Series::empty()),
    };

    let quote = result.indicators.quote.into_iter().next().unwrap_or_default();
    let offset = result.meta.gmtoffset;

    let mut by_date: BTreeMap<NaiveDate, Bar> = BTreeMap::new();
    for (i, &ts) in result.timestamp.iter().enumerate() {
        let column = |values: &[Option<f64>]| values.get(i).copied().flatten();
        let (Some(open), Some(high), Some(low), Some(close)) = (
            column(&quote.open[..]),
            column(&quote.high[..]),
            column(&quote.low[..]),
            column(&quote.close[..]),
        ) else {
            continue;
        };

        let date = ts
            .checked_add(offset)
            .and_then(|local| Utc.timestamp_opt(local, 0).single())
            .ok_or_else(|| ApiError::InvalidData(format!("Invalid timestamp: {ts}")))?
            .date_naive();

        by_date.insert(
            date,
            Bar {
                date,
                open: to_decimal("open", open)?,
                high: to_decimal("high", high)?,
                low: to_decimal("low", low)?,
                close: to_decimal("close", close)?,
                volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
            },
        );
    }

    Ok(Series::new(by_date.into_values().collect()))
}

fn to_decimal(field: &str, value: f64) -> Result<Decimal, ApiError> {
    Decimal::from_f64(value)
        .ok_or_else(|| ApiError::InvalidData(format!("Non-finite {field} price: {value}")))
}
