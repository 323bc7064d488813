//! Running capital state during a projection

use super::ledger::MonthlyProjectionRecord;
use super::params::ProjectionParameters;

/// State of the capital account at a point in time during projection
#[derive(Debug, Clone)]
pub struct ProjectionState {
    /// Current projection month (0 before the first month)
    pub month: u32,

    pub capital: f64,

    /// Contribution paid this month (grows from month 2 onward)
    pub contribution: f64,

    pub cumulative_contributions: f64,
    pub total_growth: f64,
    pub total_dividends: f64,

    monthly_return: f64,
    monthly_inflation: f64,
    monthly_dividend_yield: f64,
    monthly_contribution_growth: f64,
    reinvest_dividends: bool,
}

impl ProjectionState {
    /// Initialize state at projection start
    pub fn from_params(params: &ProjectionParameters) -> Self {
        Self {
            month: 0,
            capital: params.present_value,
            contribution: params.monthly_contribution,
            cumulative_contributions: 0.0,
            total_growth: 0.0,
            total_dividends: 0.0,
            monthly_return: params.monthly_return(),
            monthly_inflation: params.monthly_inflation(),
            monthly_dividend_yield: params.monthly_dividend_yield(),
            monthly_contribution_growth: params.monthly_contribution_growth(),
            reinvest_dividends: params.reinvest_dividends,
        }
    }

    /// Advance one month and return its ledger line
    ///
    /// Growth and dividends accrue on the capital held at the start of the
    /// month; the contribution lands at month end (ordinary annuity).
    pub fn advance_month(&mut self) -> MonthlyProjectionRecord {
        self.month += 1;

        if self.month > 1 && self.monthly_contribution_growth != 0.0 {
            self.contribution *= 1.0 + self.monthly_contribution_growth;
        }

        let capital_before = self.capital;
        let dividends = capital_before * self.monthly_dividend_yield;
        let growth = capital_before * self.monthly_return;

        self.capital += self.contribution + growth;
        self.total_growth += growth;
        if self.reinvest_dividends {
            self.capital += dividends;
            self.total_growth += dividends;
        }
        self.total_dividends += dividends;
        self.cumulative_contributions += self.contribution;

        MonthlyProjectionRecord {
            month: self.month,
            capital_before,
            contribution: self.contribution,
            growth,
            dividends,
            capital_after: self.capital,
            real_value: self.real_value(),
            cumulative_contributions: self.cumulative_contributions,
        }
    }

    /// Current capital deflated by inflation accumulated so far
    pub fn real_value(&self) -> f64 {
        self.capital / self.deflator()
    }

    /// Cumulative inflation factor `(1 + monthly_inflation)^month`
    pub fn deflator(&self) -> f64 {
        if self.monthly_inflation == 0.0 {
            1.0
        } else {
            (1.0 + self.monthly_inflation).powi(self.month as i32)
        }
    }
}
