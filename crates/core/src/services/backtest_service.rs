use chrono::NaiveDate;
use tracing::warn;

use crate::errors::CoreError;
use crate::models::request::BacktestRequest;
use crate::models::result::{BacktestReport, StrategyResult};
use crate::models::series::PriceSeries;
use crate::services::chart_service::ChartService;

const DAYS_PER_YEAR: f64 = 365.25;

/// A strategy's portfolio value on each trading day of its series, in
/// ascending date order. Becomes one chart column after the merge step.
pub type ValueColumn = Vec<(NaiveDate, f64)>;

/// Replays historical daily prices to simulate DCA and lump-sum
/// strategies and derive comparative statistics.
///
/// Pure business logic. No I/O, no shared state across symbols; each run
/// is a deterministic function of its inputs, so repeated runs with
/// identical inputs are idempotent and safely cacheable by the caller.
pub struct BacktestService {
    chart_service: ChartService,
}

impl BacktestService {
    pub fn new() -> Self {
        Self {
            chart_service: ChartService::new(),
        }
    }

    /// Run the full backtest over pre-normalized series.
    ///
    /// Each symbol is processed independently: DCA first, then (if
    /// requested) the fairness-matched lump-sum pass, which needs the DCA
    /// total to exist. Symbols with empty series are skipped and recorded,
    /// never aborting the others. Only the all-symbols-empty case fails.
    pub fn run(
        &self,
        series_by_symbol: Vec<(String, PriceSeries)>,
        request: &BacktestRequest,
    ) -> Result<BacktestReport, CoreError> {
        let mut stats = Vec::new();
        let mut columns = Vec::new();
        let mut skipped = Vec::new();

        for (symbol, series) in &series_by_symbol {
            if series.is_empty() {
                warn!("no usable price data for {symbol}, excluding from results");
                skipped.push(symbol.clone());
                continue;
            }

            let (dca, dca_column) = self.simulate_dca(symbol, series, request)?;
            let matched_invested = dca.total_invested;
            columns.push((dca.label.clone(), dca_column));
            stats.push(dca);

            if request.compare_lump_sum {
                let (lump, lump_column) =
                    self.simulate_lump_sum(symbol, series, matched_invested)?;
                columns.push((lump.label.clone(), lump_column));
                stats.push(lump);
            }
        }

        if stats.is_empty() {
            return Err(CoreError::NoValidData);
        }

        let chart_data = self.chart_service.merge(columns);

        Ok(BacktestReport {
            chart_data,
            stats,
            skipped,
        })
    }

    /// Simulate periodic fixed-amount purchases of one symbol.
    ///
    /// Single pass in ascending date order. A purchase fires on the first
    /// price point dated on or after the scheduled date (never strictly
    /// before, and never retroactively for a scheduled date that fell on a
    /// non-trading day); the schedule then advances one cadence step from
    /// the scheduled date, not from the purchase date.
    ///
    /// Note: a data gap spanning several scheduled dates makes a single
    /// later price point absorb one purchase at that later price while the
    /// schedule catches up one step per point. This mirrors the observed
    /// production behavior; treat multi-week provider outages as a data
    /// quality problem, not something the engine papers over.
    pub fn simulate_dca(
        &self,
        symbol: &str,
        series: &PriceSeries,
        request: &BacktestRequest,
    ) -> Result<(StrategyResult, ValueColumn), CoreError> {
        let (first, last) = match (series.first(), series.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(CoreError::EmptySeries(symbol.to_string())),
        };

        let mut next_purchase_date = request.start_date;
        let mut total_invested = 0.0;
        let mut total_shares = 0.0;
        let mut purchase_count: u32 = 0;
        let mut peak_value = 0.0;
        let mut max_drawdown = 0.0;
        let mut column = Vec::with_capacity(series.len());

        for point in series {
            if point.date >= next_purchase_date {
                total_invested += request.contribution_amount;
                total_shares += request.contribution_amount / point.price;
                purchase_count += 1;
                next_purchase_date = request.frequency.advance(next_purchase_date);
            }

            let current_value = total_shares * point.price;
            if current_value > peak_value {
                peak_value = current_value;
            }
            if peak_value > 0.0 {
                let drawdown = (peak_value - current_value) / peak_value;
                if drawdown > max_drawdown {
                    max_drawdown = drawdown;
                }
            }

            column.push((point.date, current_value));
        }

        let result = finalize_result(
            symbol.to_string(),
            total_invested,
            total_shares * last.price,
            first.date,
            last.date,
            purchase_count,
            max_drawdown,
            false,
        );

        Ok((result, column))
    }

    /// Simulate the fairness-matched lump-sum comparison for one symbol.
    ///
    /// Deploys exactly the capital the DCA strategy ultimately invested
    /// (`matched_invested`) as a single purchase at the series' first
    /// price, then tracks its value across the same series. Must run after
    /// the DCA pass for the symbol; the matched amount is the entire point
    /// of the comparison.
    pub fn simulate_lump_sum(
        &self,
        symbol: &str,
        series: &PriceSeries,
        matched_invested: f64,
    ) -> Result<(StrategyResult, ValueColumn), CoreError> {
        let (first, last) = match (series.first(), series.last()) {
            (Some(first), Some(last)) => (first, last),
            _ => return Err(CoreError::EmptySeries(symbol.to_string())),
        };

        let shares = matched_invested / first.price;
        let mut peak_value = 0.0;
        let mut max_drawdown = 0.0;
        let mut column = Vec::with_capacity(series.len());

        for point in series {
            let value = shares * point.price;
            if value > peak_value {
                peak_value = value;
            }
            if peak_value > 0.0 {
                let drawdown = (peak_value - value) / peak_value;
                if drawdown > max_drawdown {
                    max_drawdown = drawdown;
                }
            }
            column.push((point.date, value));
        }

        let result = finalize_result(
            format!("{symbol} (Lump Sum)"),
            matched_invested,
            shares * last.price,
            first.date,
            last.date,
            1,
            max_drawdown,
            true,
        );

        Ok((result, column))
    }
}

impl Default for BacktestService {
    fn default() -> Self {
        Self::new()
    }
}

/// Derive the summary statistics for one finished strategy pass.
///
/// Degenerate runs (nothing invested because the series had no points on
/// or after the start date, or a zero-length date span) report zero
/// returns instead of letting NaN or infinity leak into the UI or CSV.
#[allow(clippy::too_many_arguments)]
fn finalize_result(
    label: String,
    total_invested: f64,
    final_value: f64,
    first_date: NaiveDate,
    last_date: NaiveDate,
    purchase_count: u32,
    max_drawdown_fraction: f64,
    is_lump_sum: bool,
) -> StrategyResult {
    let years = (last_date - first_date).num_days() as f64 / DAYS_PER_YEAR;

    let (total_return_pct, cagr_pct) = if total_invested > 0.0 {
        let total_return_pct = (final_value - total_invested) / total_invested * 100.0;
        let cagr_pct = if years > 0.0 {
            ((final_value / total_invested).powf(1.0 / years) - 1.0) * 100.0
        } else {
            0.0
        };
        (total_return_pct, cagr_pct)
    } else {
        (0.0, 0.0)
    };

    StrategyResult {
        label,
        total_invested,
        final_value,
        total_return_pct,
        cagr_pct,
        purchase_count,
        max_drawdown_pct: max_drawdown_fraction * 100.0,
        is_lump_sum,
    }
}
