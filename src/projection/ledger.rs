//! Monthly ledger and projection result structures

use serde::{Deserialize, Serialize};

/// One month of the capital ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyProjectionRecord {
    /// Projection month (1-indexed)
    pub month: u32,

    pub capital_before: f64,
    pub contribution: f64,
    pub growth: f64,
    pub dividends: f64,
    pub capital_after: f64,

    /// Capital after this month deflated by cumulative inflation
    pub real_value: f64,

    pub cumulative_contributions: f64,
}

/// Complete projection result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionResult {
    /// Nominal capital at the end of the horizon
    pub future_value: f64,

    /// Future value deflated by cumulative inflation
    pub real_future_value: f64,

    pub total_contributions: f64,

    /// Market growth plus reinvested dividends
    pub total_growth: f64,

    /// All dividends earned, reinvested or paid out
    pub total_dividends: f64,

    /// Annualized nominal return on invested capital, percent
    pub effective_annual_return: f64,

    /// Annualized real return on invested capital, percent
    pub real_annual_return: f64,

    /// Months projected
    pub periods: u32,

    /// Monthly ledger (empty when the run was not detailed)
    pub ledger: Vec<MonthlyProjectionRecord>,
}

impl ProjectionResult {
    /// Capital actually put in: starting value plus contributions
    pub fn invested_capital(&self, present_value: f64) -> f64 {
        present_value + self.total_contributions
    }

    /// Get summary statistics
    pub fn summary(&self, present_value: f64) -> ProjectionSummary {
        let invested = self.invested_capital(present_value);
        let gain_multiple = if invested > 0.0 { self.future_value / invested } else { 0.0 };
        let contribution_share = if self.future_value > 0.0 {
            (invested / self.future_value * 100.0).min(100.0)
        } else {
            0.0
        };

        ProjectionSummary {
            months: self.periods,
            final_capital: self.future_value,
            final_real_value: self.real_future_value,
            invested_capital: invested,
            gain_multiple,
            contribution_share,
        }
    }
}

/// Summary statistics for a projection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectionSummary {
    pub months: u32,
    pub final_capital: f64,
    pub final_real_value: f64,
    pub invested_capital: f64,
    /// Final capital / invested capital
    pub gain_multiple: f64,
    /// Share of final capital that came from the investor, percent
    pub contribution_share: f64,
}
