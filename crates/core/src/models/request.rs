use chrono::{Days, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

/// How often the DCA strategy contributes.
///
/// Weekly cadences advance by a fixed day count; monthly and quarterly use
/// calendar-month arithmetic, so e.g. Jan 31 + 1 month clamps to the last
/// day of February rather than spilling into March.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Frequency {
    Weekly,
    BiWeekly,
    Monthly,
    Quarterly,
}

impl Frequency {
    /// Advance a scheduled purchase date by one cadence step.
    ///
    /// Saturates to `NaiveDate::MAX` on calendar overflow, which disables
    /// any further purchases instead of panicking.
    pub fn advance(&self, date: NaiveDate) -> NaiveDate {
        match self {
            Frequency::Weekly => date.checked_add_days(Days::new(7)),
            Frequency::BiWeekly => date.checked_add_days(Days::new(14)),
            Frequency::Monthly => date.checked_add_months(Months::new(1)),
            Frequency::Quarterly => date.checked_add_months(Months::new(3)),
        }
        .unwrap_or(NaiveDate::MAX)
    }
}

impl std::fmt::Display for Frequency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Frequency::Weekly => write!(f, "weekly"),
            Frequency::BiWeekly => write!(f, "bi-weekly"),
            Frequency::Monthly => write!(f, "monthly"),
            Frequency::Quarterly => write!(f, "quarterly"),
        }
    }
}

/// Parameters for one backtest run. Immutable for the duration of the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestRequest {
    /// Ticker symbols to simulate, each processed independently.
    pub symbols: Vec<String>,

    /// Fixed amount contributed at each DCA purchase.
    pub contribution_amount: f64,

    pub frequency: Frequency,

    /// First scheduled purchase date.
    pub start_date: NaiveDate,

    pub end_date: NaiveDate,

    /// Also run the fairness-matched lump-sum strategy per symbol.
    pub compare_lump_sum: bool,
}

impl BacktestRequest {
    pub fn new(
        symbols: Vec<String>,
        contribution_amount: f64,
        frequency: Frequency,
        start_date: NaiveDate,
        end_date: NaiveDate,
        compare_lump_sum: bool,
    ) -> Self {
        Self {
            symbols,
            contribution_amount,
            frequency,
            start_date,
            end_date,
            compare_lump_sum,
        }
    }

    /// Validate the request before running.
    ///
    /// Rules:
    /// - At least one non-blank symbol
    /// - Contribution amount must be positive and finite
    /// - Start date must not be after end date
    pub fn validate(&self) -> Result<(), CoreError> {
        if self.normalized_symbols().is_empty() {
            return Err(CoreError::ValidationError(
                "At least one ticker symbol is required".into(),
            ));
        }
        if !self.contribution_amount.is_finite() || self.contribution_amount <= 0.0 {
            return Err(CoreError::ValidationError(format!(
                "Contribution amount must be a positive number, got {}",
                self.contribution_amount
            )));
        }
        if self.start_date > self.end_date {
            return Err(CoreError::ValidationError(format!(
                "Start date ({}) must not be after end date ({})",
                self.start_date, self.end_date
            )));
        }
        Ok(())
    }

    /// Symbols trimmed, uppercased, and de-duplicated preserving first
    /// occurrence order. Blank entries are dropped.
    pub fn normalized_symbols(&self) -> Vec<String> {
        let mut seen = std::collections::HashSet::new();
        self.symbols
            .iter()
            .map(|s| s.trim().to_uppercase())
            .filter(|s| !s.is_empty() && seen.insert(s.clone()))
            .collect()
    }
}
