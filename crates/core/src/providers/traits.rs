use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::CoreError;
use crate::models::quote::RawQuote;

/// Trait abstraction for historical-quote providers.
///
/// Each API provider (Yahoo Finance, Alpha Vantage) implements this trait.
/// If an API stops working or changes, we replace only that one
/// implementation; the rest of the codebase is untouched.
#[cfg_attr(target_arch = "wasm32", async_trait(?Send))]
#[cfg_attr(not(target_arch = "wasm32"), async_trait)]
pub trait QuoteProvider: Send + Sync {
    /// Human-readable name of this provider (for logs/errors).
    fn name(&self) -> &str;

    /// Fetch the daily adjusted-close history for a symbol over a date
    /// range (both ends inclusive).
    ///
    /// Returns raw quotes exactly as the API reported them: possibly
    /// unsorted, possibly with missing prices. Normalization is the
    /// caller's job, not the provider's.
    async fn fetch_daily_history(
        &self,
        symbol: &str,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<RawQuote>, CoreError>;
}
