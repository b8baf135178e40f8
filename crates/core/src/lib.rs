pub mod errors;
pub mod models;
pub mod providers;
pub mod services;

use std::collections::HashMap;

use tracing::warn;

use errors::CoreError;
use models::{
    quote::RawQuote, request::BacktestRequest, result::BacktestReport, series::PriceSeries,
    settings::Settings,
};
use providers::registry::QuoteProviderRegistry;
use services::{backtest_service::BacktestService, quote_service::QuoteService};

/// Main entry point for the DCA Powerhouse core library.
///
/// Wires the quote-provider stack to the backtest engine. Holds no
/// per-run state: every backtest is a pure function of its request and
/// the fetched data, so callers may cache results keyed by request.
#[must_use]
pub struct DcaPowerhouse {
    settings: Settings,
    quote_service: QuoteService,
    backtest_service: BacktestService,
}

impl std::fmt::Debug for DcaPowerhouse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DcaPowerhouse")
            .field("providers", &self.quote_service.provider_names())
            .field("api_keys", &self.settings.api_keys.len())
            .finish()
    }
}

impl DcaPowerhouse {
    /// Create an instance with the default provider stack and no API keys.
    pub fn new() -> Self {
        Self::with_api_keys(HashMap::new())
    }

    /// Create an instance with provider API keys (e.g., "alphavantage").
    pub fn with_api_keys(api_keys: HashMap<String, String>) -> Self {
        let settings = Settings { api_keys };
        Self::build(settings)
    }

    /// Create an instance around a custom provider registry.
    /// Useful for tests and for callers that bring their own data source.
    pub fn with_registry(registry: QuoteProviderRegistry) -> Self {
        Self {
            settings: Settings::default(),
            quote_service: QuoteService::new(registry),
            backtest_service: BacktestService::new(),
        }
    }

    // ── Backtesting ─────────────────────────────────────────────────

    /// Run a full backtest: fetch each symbol's history concurrently,
    /// normalize, simulate, and aggregate.
    ///
    /// Per-symbol fetch failures and empty histories are reported in the
    /// returned report's `skipped` list; they never abort the run. The run
    /// only fails when the request is invalid or no symbol at all yields
    /// usable data.
    pub async fn run_backtest(
        &self,
        request: &BacktestRequest,
    ) -> Result<BacktestReport, CoreError> {
        request.validate()?;
        let symbols = request.normalized_symbols();

        let fetched = self
            .quote_service
            .fetch_all(&symbols, request.start_date, request.end_date)
            .await;

        let mut fetch_skipped = Vec::new();
        let mut series_by_symbol = Vec::new();
        for (symbol, outcome) in fetched {
            match outcome {
                Ok(raw) => series_by_symbol.push((symbol, PriceSeries::normalize(raw))),
                Err(e) => {
                    warn!("failed to fetch data for {symbol}: {e}");
                    fetch_skipped.push(symbol);
                }
            }
        }

        let mut report = self.backtest_service.run(series_by_symbol, request)?;
        fetch_skipped.extend(report.skipped);
        report.skipped = fetch_skipped;
        Ok(report)
    }

    /// Run a backtest over pre-fetched raw data, one entry per symbol.
    ///
    /// Pure computation, no I/O. This is the entry point for callers that
    /// fetch price histories themselves (or replay cached ones).
    pub fn run_backtest_with_data(
        &self,
        raw_by_symbol: Vec<(String, Vec<RawQuote>)>,
        request: &BacktestRequest,
    ) -> Result<BacktestReport, CoreError> {
        request.validate()?;

        let series_by_symbol = raw_by_symbol
            .into_iter()
            .map(|(symbol, raw)| (symbol, PriceSeries::normalize(raw)))
            .collect();

        self.backtest_service.run(series_by_symbol, request)
    }

    // ── Settings ────────────────────────────────────────────────────

    /// Set an API key for a provider (e.g., "alphavantage").
    /// Rebuilds the provider registry so the new key takes effect immediately.
    pub fn set_api_key(&mut self, provider: String, key: String) {
        self.settings.api_keys.insert(provider, key);

        // Rebuild registry with updated API keys
        let registry = QuoteProviderRegistry::new_with_defaults(&self.settings.api_keys);
        self.quote_service = QuoteService::new(registry);
    }

    /// Remove an API key for a provider.
    /// Rebuilds the provider registry so the removal takes effect immediately.
    pub fn remove_api_key(&mut self, provider: &str) -> bool {
        let removed = self.settings.api_keys.remove(provider).is_some();
        if removed {
            let registry = QuoteProviderRegistry::new_with_defaults(&self.settings.api_keys);
            self.quote_service = QuoteService::new(registry);
        }
        removed
    }

    /// Get current settings.
    #[must_use]
    pub fn get_settings(&self) -> &Settings {
        &self.settings
    }

    // ── Provider Availability ───────────────────────────────────────

    /// Check if at least one quote provider is available.
    #[must_use]
    pub fn is_provider_available(&self) -> bool {
        self.quote_service.has_provider()
    }

    /// Get the names of registered providers, in fallback order.
    #[must_use]
    pub fn get_provider_names(&self) -> Vec<String> {
        self.quote_service.provider_names()
    }

    // ── Internal ────────────────────────────────────────────────────

    fn build(settings: Settings) -> Self {
        let registry = QuoteProviderRegistry::new_with_defaults(&settings.api_keys);
        Self {
            settings,
            quote_service: QuoteService::new(registry),
            backtest_service: BacktestService::new(),
        }
    }
}

impl Default for DcaPowerhouse {
    fn default() -> Self {
        Self::new()
    }
}
