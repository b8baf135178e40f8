use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// Performance summary for one (symbol, strategy) pair.
///
/// Created fresh each run; never mutated after construction; not persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyResult {
    /// Symbol name, suffixed with " (Lump Sum)" for the comparison strategy.
    pub label: String,

    pub total_invested: f64,

    /// Share count times the last available price.
    pub final_value: f64,

    pub total_return_pct: f64,

    /// Annualized growth rate over the span of the series.
    pub cagr_pct: f64,

    pub purchase_count: u32,

    /// Largest peak-to-trough decline in portfolio value, as a percentage.
    pub max_drawdown_pct: f64,

    pub is_lump_sum: bool,
}

impl StrategyResult {
    /// "DCA" or "Lump Sum", as shown in the stats table and CSV export.
    pub fn strategy_name(&self) -> &'static str {
        if self.is_lump_sum {
            "Lump Sum"
        } else {
            "DCA"
        }
    }
}

/// One chart row: the union of portfolio values across strategies on a date.
///
/// Columns are sparse. A date absent from one symbol's series simply has no
/// entry for that symbol's label. Serializes flat, so a row renders as
/// `{"date":"2024-01-02","SPY":1012.50,"SPY (Lump Sum)":1031.22}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRow {
    pub date: NaiveDate,

    #[serde(flatten)]
    pub values: BTreeMap<String, f64>,
}

impl ChartRow {
    /// Portfolio value for a strategy label on this date, if present.
    pub fn value(&self, label: &str) -> Option<f64> {
        self.values.get(label).copied()
    }
}

/// Everything one backtest run produces: chart-ready rows, per-strategy
/// stats, and the symbols that had to be excluded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    /// Sparse per-date rows, sorted ascending by date.
    pub chart_data: Vec<ChartRow>,

    /// One entry per (symbol, strategy) pair, in request order.
    pub stats: Vec<StrategyResult>,

    /// Symbols excluded from the run (fetch failure or empty series).
    /// Surfaced to the caller as per-symbol warnings.
    #[serde(default)]
    pub skipped: Vec<String>,
}

impl BacktestReport {
    /// The strategy with the highest total return. DCA and Lump-Sum entries
    /// are both eligible. `None` only for an empty stats list.
    pub fn best_performer(&self) -> Option<&StrategyResult> {
        self.stats.iter().max_by(|a, b| {
            a.total_return_pct
                .partial_cmp(&b.total_return_pct)
                .unwrap_or(std::cmp::Ordering::Equal)
        })
    }

    /// Export the stats table as a CSV string.
    /// Columns: Symbol, Type, Total Invested, Final Value, Total Return %,
    /// CAGR %, Purchases, Max Drawdown %
    pub fn to_csv(&self) -> String {
        let mut csv = String::from(
            "Symbol,Type,Total Invested,Final Value,Total Return %,CAGR %,Purchases,Max Drawdown %\n",
        );
        for s in &self.stats {
            // Escape CSV: quote labels containing commas or quotes
            let label = if s.label.contains(',') || s.label.contains('"') {
                format!("\"{}\"", s.label.replace('"', "\"\""))
            } else {
                s.label.clone()
            };
            csv.push_str(&format!(
                "{},{},{:.2},{:.2},{:.2},{:.2},{},{:.2}\n",
                label,
                s.strategy_name(),
                s.total_invested,
                s.final_value,
                s.total_return_pct,
                s.cagr_pct,
                s.purchase_count,
                s.max_drawdown_pct,
            ));
        }
        csv
    }

    /// Export the full report as pretty-printed JSON.
    pub fn to_json(&self) -> Result<String, CoreError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CoreError::Serialization(format!("Failed to serialize report: {e}")))
    }
}
