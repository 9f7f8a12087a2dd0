use crate::responses::parse_chart;
use analytics::{MetricsError, SeriesProvider};
use async_trait::async_trait;
use configuration::ProviderSettings;
use core_types::{Series, Symbol};
use reqwest::{StatusCode, Url};
use std::time::Duration;

pub mod error;
pub mod responses;

// --- Public API ---
pub use error::ApiError;
pub use responses::ChartError;

/// A `SeriesProvider` backed by the Yahoo Finance chart API.
///
/// One request per symbol returns the full daily history. The client does not
/// retry; a failed request surfaces as a per-symbol failure.
#[derive(Clone)]
pub struct YahooClient {
    client: reqwest::Client,
    base_url: Url,
    exchange_suffix: String,
    range: String,
}

impl YahooClient {
    pub fn new(settings: &ProviderSettings) -> Result<Self, ApiError> {
        let base_url = Url::parse(&settings.base_url)
            .map_err(|e| ApiError::InvalidConfig(format!("base_url '{}': {e}", settings.base_url)))?;
        if base_url.cannot_be_a_base() {
            return Err(ApiError::InvalidConfig(format!(
                "base_url '{}' cannot be used as a base URL",
                settings.base_url
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .user_agent(settings.user_agent.clone())
            .build()?;

        Ok(Self {
            client,
            base_url,
            exchange_suffix: settings.exchange_suffix.clone(),
            range: settings.range.clone(),
        })
    }

    /// The provider-side ticker: the symbol plus the exchange suffix, unless the
    /// caller already typed the suffix.
    pub fn ticker(&self, symbol: &Symbol) -> String {
        let raw = symbol.as_str();
        let suffix = &self.exchange_suffix;
        let already_suffixed = raw.len() >= suffix.len()
            && raw.is_char_boundary(raw.len() - suffix.len())
            && raw[raw.len() - suffix.len()..].eq_ignore_ascii_case(suffix);
        if suffix.is_empty() || already_suffixed {
            raw.to_string()
        } else {
            format!("{raw}{suffix}")
        }
    }

    /// Builds `{base}/v8/finance/chart/{ticker}?range=..&interval=1d`, percent-encoding the ticker.
    pub fn chart_url(&self, symbol: &Symbol) -> Url {
        let ticker = self.ticker(symbol);
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["v8", "finance", "chart", ticker.as_str()]);
        }
        url.query_pairs_mut()
            .append_pair("range", &self.range)
            .append_pair("interval", "1d");
        url
    }

    /// Downloads and decodes the daily history of one symbol.
    pub async fn fetch_series(&self, symbol: &Symbol) -> Result<Series, ApiError> {
        let url = self.chart_url(symbol);
        tracing::debug!(%symbol, %url, "Requesting chart");

        let response = self.client.get(url).send().await?;
        let status = response.status();
        let text = response.text().await?;

        decode_chart(status, &text, &self.ticker(symbol))
    }
}

/// Turns a chart response into a series, or into the error its status implies.
fn decode_chart(status: StatusCode, body: &str, ticker: &str) -> Result<Series, ApiError> {
    if status.is_success() || status == StatusCode::NOT_FOUND {
        // A 404 still carries a chart error body naming the reason.
        return match parse_chart(body) {
            Err(ApiError::Deserialization(_)) if status == StatusCode::NOT_FOUND => {
                Err(ApiError::NotFound(ticker.to_string()))
            }
            other => other,
        };
    }

    let snippet: String = body.chars().take(200).collect();
    Err(ApiError::ApiError(format!("HTTP {status}: {snippet}")))
}

/// An empty history is "no data" rather than a success with nothing in it.
fn into_history(fetched: Result<Series, ApiError>) -> Result<Series, MetricsError> {
    let series = fetched?;
    if series.is_empty() {
        return Err(MetricsError::NoData);
    }
    Ok(series)
}

#[async_trait]
impl SeriesProvider for YahooClient {
    async fn fetch_history(&self, symbol: &Symbol) -> Result<Series, MetricsError> {
        into_history(self.fetch_series(symbol).await)
    }
}
