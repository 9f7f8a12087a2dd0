use crate::error::MetricsError;
use async_trait::async_trait;
use core_types::{Series, Symbol};
use std::sync::Arc;

/// The narrow interface through which the engine obtains price histories.
///
/// Implementations return the full available daily history, sorted by
/// ascending date without duplicate dates. They fail with
/// [`MetricsError::NoData`] for unknown symbols or empty histories and with
/// [`MetricsError::ProviderError`] for anything that goes wrong at the
/// transport or decoding level. Retries, timeouts and rate limiting are the
/// implementation's business; the engine calls each symbol exactly once.
#[async_trait]
pub trait SeriesProvider: Send + Sync {
    async fn fetch_history(&self, symbol: &Symbol) -> Result<Series, MetricsError>;
}

#[async_trait]
impl<P: SeriesProvider + ?Sized> SeriesProvider for Arc<P> {
    async fn fetch_history(&self, symbol: &Symbol) -> Result<Series, MetricsError> {
        (**self).fetch_history(symbol).await
    }
}
