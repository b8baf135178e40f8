use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::models::result::ChartRow;

/// Merges per-strategy value columns into chart-ready rows.
///
/// Each simulation returns its own ordered series; this explicit merge
/// step unions them by date so no shared map is mutated during
/// simulation. Rows are sparse: a date absent from one symbol's series
/// simply omits that symbol's column.
pub struct ChartService;

impl ChartService {
    pub fn new() -> Self {
        Self
    }

    /// Union the columns into per-date rows, sorted ascending by date.
    ///
    /// Values are rounded to cents, which is what the chart and CSV
    /// surfaces display.
    pub fn merge(&self, columns: Vec<(String, Vec<(NaiveDate, f64)>)>) -> Vec<ChartRow> {
        let mut rows: BTreeMap<NaiveDate, BTreeMap<String, f64>> = BTreeMap::new();

        for (label, column) in columns {
            for (date, value) in column {
                rows.entry(date)
                    .or_default()
                    .insert(label.clone(), round_cents(value));
            }
        }

        rows.into_iter()
            .map(|(date, values)| ChartRow { date, values })
            .collect()
    }
}

impl Default for ChartService {
    fn default() -> Self {
        Self::new()
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
