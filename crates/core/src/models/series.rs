use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::quote::RawQuote;

/// One trading day's adjusted closing price for one symbol.
/// `price` is always finite and positive; entries that aren't never
/// survive normalization. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub price: f64,
}

/// An ordered price history for one symbol.
///
/// Invariant: strictly ascending by date, no duplicate dates. The only way
/// to build one is `PriceSeries::normalize`, which sorts raw provider data,
/// drops unusable prices, and de-duplicates dates. An empty series is a
/// valid degenerate value ("no data for this symbol") and must be checked
/// with `is_empty()` before simulation; it never panics downstream.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceSeries(Vec<PricePoint>);

impl PriceSeries {
    /// Turn a raw, possibly-unsorted, possibly-sparse quote history into a
    /// canonical series.
    ///
    /// - Entries with a missing, non-finite, or non-positive price are dropped.
    /// - Entries are sorted ascending by date.
    /// - Duplicate dates keep the last entry seen for that date.
    /// - Calendar gaps (weekends, holidays, provider outages) are NOT filled;
    ///   downstream logic must never assume daily-contiguous dates.
    pub fn normalize(raw: Vec<RawQuote>) -> Self {
        let mut points: Vec<PricePoint> = raw
            .into_iter()
            .filter_map(|quote| {
                let price = quote.adj_close?;
                if !price.is_finite() || price <= 0.0 {
                    return None;
                }
                Some(PricePoint {
                    date: quote.date,
                    price,
                })
            })
            .collect();

        points.sort_by_key(|p| p.date);

        // Keep the last entry for a duplicated date. The sort is stable, so
        // reversing makes the chronologically-last entry the first of its
        // run, which dedup_by_key retains.
        points.reverse();
        points.dedup_by_key(|p| p.date);
        points.reverse();

        Self(points)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.0.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.0.last()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PricePoint> {
        self.0.iter()
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.0
    }
}

impl<'a> IntoIterator for &'a PriceSeries {
    type Item = &'a PricePoint;
    type IntoIter = std::slice::Iter<'a, PricePoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}
