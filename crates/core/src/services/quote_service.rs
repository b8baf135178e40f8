use chrono::NaiveDate;
use futures::future::join_all;
use tracing::debug;

use crate::errors::CoreError;
use crate::models::quote::RawQuote;
use crate::providers::registry::QuoteProviderRegistry;

/// Fetches raw daily price histories from API providers.
///
/// This is the only I/O-bound step of a backtest run and is deliberately
/// decoupled from the simulation engine: the engine consumes whatever
/// series are in hand and never fetches. Retries for transient provider
/// failures belong here (via the fallback chain), never in the engine.
pub struct QuoteService {
    registry: QuoteProviderRegistry,
}

impl QuoteService {
    pub fn new(registry: QuoteProviderRegistry) -> Self {
        Self { registry }
    }

    /// Check if at least one quote provider is available.
    pub fn has_provider(&self) -> bool {
        !self.registry.is_empty()
    }

    /// Get the names of all registered providers, in fallback order.
    pub fn provider_names(&self) -> Vec<String> {
        self.registry
            .providers()
            .iter()
            .map(|p| p.name().to_string())
            .collect()
    }

    /// Fetch one symbol's raw daily history with automatic fallback.
    ///
    /// Tries providers in registration order. If the primary fails (API
    /// down, rate limited, unknown symbol), the next provider gets a chance.
    pub async fn fetch_history(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<RawQuote>, CoreError> {
        let providers = self.registry.providers();
        if providers.is_empty() {
            return Err(CoreError::NoProvider);
        }

        let mut last_error = None;
        for provider in providers {
            match provider.fetch_daily_history(symbol, from, to).await {
                Ok(history) => return Ok(history),
                Err(e) => {
                    debug!("{} failed for {symbol}: {e}", provider.name());
                    last_error = Some(e);
                    // Try next provider
                }
            }
        }

        Err(last_error.unwrap_or(CoreError::NoProvider))
    }

    /// Fetch every symbol's history concurrently (fan-out, join-all).
    ///
    /// Symbols are independent, so all fetches run at once and the call
    /// waits for every one to settle. Each symbol gets its own outcome;
    /// one failure never aborts the sibling fetches.
    pub async fn fetch_all(
        &self,
        symbols: &[String],
        from: NaiveDate,
        to: NaiveDate,
    ) -> Vec<(String, Result<Vec<RawQuote>, CoreError>)> {
        let fetches = symbols.iter().map(|symbol| async move {
            let result = self.fetch_history(symbol, from, to).await;
            (symbol.clone(), result)
        });
        join_all(fetches).await
    }
}
