use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single raw quote as delivered by a provider: one trading day's
/// adjusted closing price, possibly missing.
///
/// This is the wire shape at the provider boundary. Providers return it
/// untouched; `PriceSeries::normalize` is responsible for dropping entries
/// without a usable price. Some integrations spell the price field
/// `adjClose`, others `price`. Both deserialize into `adj_close`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawQuote {
    pub date: NaiveDate,

    #[serde(rename = "adjClose", alias = "price")]
    pub adj_close: Option<f64>,
}

impl RawQuote {
    pub fn new(date: NaiveDate, adj_close: Option<f64>) -> Self {
        Self { date, adj_close }
    }
}
