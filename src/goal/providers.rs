//! Goal inputs and the provider seams the analyzer pulls them through

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::market::MarketContext;

/// A savings goal as supplied by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Goal {
    pub goal_id: String,
    /// Target amount (None = projection only, no success measure)
    ///
    /// The solvers treat it as nominal; Monte Carlo success compares it with
    /// each trial's real future value.
    #[serde(default)]
    pub target_amount: Option<f64>,
    #[serde(default)]
    pub target_date: Option<NaiveDate>,
    pub monthly_contribution: f64,
    /// Expected annual return, percent
    pub expected_return_rate: f64,
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "USD".to_string()
}

impl Goal {
    /// Whole months from `as_of` to the target date, at least 1
    ///
    /// A target day earlier in the month than `as_of` does not count the
    /// final partial month. Returns `None` when the goal has no target date.
    pub fn horizon_months(&self, as_of: NaiveDate) -> Option<u32> {
        let target = self.target_date?;
        let mut months = (target.year() - as_of.year()) * 12 + target.month() as i32 - as_of.month() as i32;
        if target.day() < as_of.day() {
            months -= 1;
        }
        Some(months.max(1) as u32)
    }
}

/// Source of the goal's current capital
pub trait CapitalProvider {
    fn current_capital(&self, goal: &Goal) -> Result<f64>;
}

/// Source of observed performance, volatility and regime
pub trait MarketContextProvider {
    fn market_context(&self, goal: &Goal) -> Result<MarketContext>;
}

/// Capital known up front
#[derive(Debug, Clone, Copy)]
pub struct FixedCapital(pub f64);

impl CapitalProvider for FixedCapital {
    fn current_capital(&self, _goal: &Goal) -> Result<f64> {
        if self.0.is_finite() {
            Ok(self.0)
        } else {
            Err(EngineError::unavailable("capital", format!("non-finite capital {}", self.0)))
        }
    }
}

/// Market context known up front (neutral by default)
#[derive(Debug, Clone, Default)]
pub struct StaticMarket(pub MarketContext);

impl MarketContextProvider for StaticMarket {
    fn market_context(&self, _goal: &Goal) -> Result<MarketContext> {
        Ok(self.0.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(target_date: Option<NaiveDate>) -> Goal {
        Goal {
            goal_id: "house".to_string(),
            target_amount: Some(100_000.0),
            target_date,
            monthly_contribution: 500.0,
            expected_return_rate: 7.0,
            currency: "USD".to_string(),
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_horizon_months() {
        let as_of = date(2024, 3, 15);
        assert_eq!(goal(Some(date(2029, 3, 15))).horizon_months(as_of), Some(60));
        assert_eq!(goal(Some(date(2029, 3, 14))).horizon_months(as_of), Some(59));
        assert_eq!(goal(Some(date(2024, 4, 1))).horizon_months(as_of), Some(1));
        assert_eq!(goal(Some(date(2020, 1, 1))).horizon_months(as_of), Some(1));
        assert_eq!(goal(None).horizon_months(as_of), None);
    }

    #[test]
    fn test_goal_json_defaults() {
        let json = r#"{ "goal_id": "g1", "monthly_contribution": 250, "expected_return_rate": 6.5 }"#;
        let goal: Goal = serde_json::from_str(json).unwrap();
        assert_eq!(goal.currency, "USD");
        assert_eq!(goal.target_amount, None);
        assert_eq!(goal.target_date, None);
    }

    #[test]
    fn test_fixed_capital_rejects_nan() {
        let g = goal(None);
        assert_eq!(FixedCapital(10.0).current_capital(&g), Ok(10.0));
        assert!(FixedCapital(f64::NAN).current_capital(&g).is_err());
    }
}
