use crate::engine::MetricsEngine;
use crate::provider::SeriesProvider;
use crate::report::MetricsResult;
use core_types::Symbol;
use futures::stream::{self, StreamExt};

impl MetricsEngine {
    /// Fetches and computes metrics for raw, user-supplied identifiers.
    ///
    /// Each identifier is normalized first; blank ones fail with
    /// `InvalidSymbol` without reaching the provider. Up to
    /// `max_concurrent_fetches` histories are in flight at once. Results come
    /// back in input order regardless of which download finishes first, and a
    /// slow or failing symbol never cancels the others.
    pub async fn compute_for_symbols<P, S>(
        &self,
        provider: &P,
        raw_symbols: &[S],
        max_concurrent_fetches: usize,
    ) -> Vec<MetricsResult>
    where
        P: SeriesProvider + ?Sized,
        S: AsRef<str>,
    {
        tracing::debug!(
            symbols = raw_symbols.len(),
            max_concurrent_fetches,
            "Fetching histories"
        );

        // Finished fetches free their slot straight away, so one stalled request
        // never holds back the rest; the index restores input order afterwards.
        let mut indexed: Vec<(usize, MetricsResult)> = stream::iter(
            raw_symbols.iter().enumerate().map(|(index, raw)| async move {
                (index, self.fetch_and_compute(provider, raw.as_ref()).await)
            }),
        )
        .buffer_unordered(max_concurrent_fetches.max(1))
        .collect()
        .await;

        indexed.sort_unstable_by_key(|(index, _)| *index);
        indexed.into_iter().map(|(_, result)| result).collect()
    }

    async fn fetch_and_compute<P>(&self, provider: &P, raw: &str) -> MetricsResult
    where
        P: SeriesProvider + ?Sized,
    {
        let symbol = match Symbol::parse(raw) {
            Ok(symbol) => symbol,
            Err(err) => return MetricsResult::failure(raw, err.into()),
        };

        match provider.fetch_history(&symbol).await {
            Ok(series) => {
                tracing::debug!(%symbol, bars = series.len(), "History received");
                self.compute_symbol(&symbol, &series)
            }
            Err(reason) => {
                tracing::debug!(%symbol, error = %reason, "History unavailable");
                MetricsResult::failure(symbol.as_str(), reason)
            }
        }
    }
}
