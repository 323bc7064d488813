//! Projection input parameters

use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, EngineError, Result};

/// Inputs for one projection run. All rates are annual percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionParameters {
    /// Capital at the start of the projection
    pub present_value: f64,

    /// Contribution added at the end of month 1
    pub monthly_contribution: f64,

    /// Expected annual return, percent
    pub annual_return_rate: f64,

    /// Annual inflation, percent (None = no inflation adjustment)
    #[serde(default)]
    pub inflation_rate: Option<f64>,

    /// Projection horizon in months
    pub periods: u32,

    /// Annual growth of the contribution amount, percent
    #[serde(default)]
    pub contribution_growth_rate: Option<f64>,

    /// Annual dividend yield, percent
    #[serde(default)]
    pub dividend_yield: Option<f64>,

    /// Whether dividends are added back to capital
    #[serde(default)]
    pub reinvest_dividends: bool,
}

impl ProjectionParameters {
    pub fn new(present_value: f64, monthly_contribution: f64, annual_return_rate: f64, periods: u32) -> Self {
        Self {
            present_value,
            monthly_contribution,
            annual_return_rate,
            inflation_rate: None,
            periods,
            contribution_growth_rate: None,
            dividend_yield: None,
            reinvest_dividends: false,
        }
    }

    pub fn with_inflation(mut self, inflation_rate: f64) -> Self {
        self.inflation_rate = Some(inflation_rate);
        self
    }

    pub fn with_contribution_growth(mut self, contribution_growth_rate: f64) -> Self {
        self.contribution_growth_rate = Some(contribution_growth_rate);
        self
    }

    pub fn with_dividends(mut self, dividend_yield: f64, reinvest: bool) -> Self {
        self.dividend_yield = Some(dividend_yield);
        self.reinvest_dividends = reinvest;
        self
    }

    pub fn monthly_return(&self) -> f64 {
        monthly_rate(self.annual_return_rate)
    }

    pub fn monthly_inflation(&self) -> f64 {
        self.inflation_rate.map(monthly_rate).unwrap_or(0.0)
    }

    pub fn monthly_dividend_yield(&self) -> f64 {
        self.dividend_yield.map(monthly_rate).unwrap_or(0.0)
    }

    pub fn monthly_contribution_growth(&self) -> f64 {
        self.contribution_growth_rate.map(monthly_rate).unwrap_or(0.0)
    }

    /// Reject parameters the calculator cannot project
    pub fn validate(&self) -> Result<()> {
        if self.periods == 0 {
            return Err(EngineError::invalid("periods", "must be a positive number of months"));
        }

        ensure_finite("present_value", self.present_value)?;
        ensure_finite("monthly_contribution", self.monthly_contribution)?;
        ensure_finite("annual_return_rate", self.annual_return_rate)?;

        if self.present_value < 0.0 {
            return Err(EngineError::invalid("present_value", "must not be negative"));
        }
        if self.monthly_contribution < 0.0 {
            return Err(EngineError::invalid("monthly_contribution", "must not be negative"));
        }
        ensure_above_total_loss("annual_return_rate", self.annual_return_rate)?;

        if let Some(rate) = self.inflation_rate {
            ensure_finite("inflation_rate", rate)?;
            ensure_above_total_loss("inflation_rate", rate)?;
        }
        if let Some(rate) = self.contribution_growth_rate {
            ensure_finite("contribution_growth_rate", rate)?;
            ensure_above_total_loss("contribution_growth_rate", rate)?;
        }
        if let Some(rate) = self.dividend_yield {
            ensure_finite("dividend_yield", rate)?;
            if rate < 0.0 {
                return Err(EngineError::invalid("dividend_yield", "must not be negative"));
            }
        }

        Ok(())
    }
}

/// Annual percentage to monthly decimal rate
pub fn monthly_rate(annual_percent: f64) -> f64 {
    annual_percent / 100.0 / 12.0
}

fn ensure_above_total_loss(name: &'static str, rate: f64) -> Result<()> {
    if rate <= -100.0 {
        return Err(EngineError::invalid(name, format!("{}% is at or below -100%", rate)));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_monthly_rates() {
        let params = ProjectionParameters::new(0.0, 0.0, 12.0, 12)
            .with_inflation(6.0)
            .with_dividends(2.4, true);

        assert!((params.monthly_return() - 0.01).abs() < 1e-12);
        assert!((params.monthly_inflation() - 0.005).abs() < 1e-12);
        assert!((params.monthly_dividend_yield() - 0.002).abs() < 1e-12);
        assert_eq!(params.monthly_contribution_growth(), 0.0);
    }

    #[test]
    fn test_zero_periods_rejected() {
        let params = ProjectionParameters::new(1000.0, 100.0, 5.0, 0);
        assert!(matches!(
            params.validate(),
            Err(EngineError::InvalidParameter { name: "periods", .. })
        ));
    }

    #[test]
    fn test_non_numeric_rate_rejected() {
        let params = ProjectionParameters::new(1000.0, 100.0, f64::NAN, 12);
        assert!(params.validate().is_err());

        let params = ProjectionParameters::new(1000.0, 100.0, 5.0, 12).with_inflation(f64::INFINITY);
        assert!(params.validate().is_err());
    }

    #[test]
    fn test_negative_amounts_rejected() {
        assert!(ProjectionParameters::new(-1.0, 100.0, 5.0, 12).validate().is_err());
        assert!(ProjectionParameters::new(1.0, -100.0, 5.0, 12).validate().is_err());
        assert!(ProjectionParameters::new(1.0, 100.0, -100.0, 12).validate().is_err());
    }

    #[test]
    fn test_optional_fields_default_when_deserialized() {
        let json = r#"{"present_value":1000,"monthly_contribution":50,"annual_return_rate":7,"periods":24}"#;
        let params: ProjectionParameters = serde_json::from_str(json).unwrap();
        assert_eq!(params.inflation_rate, None);
        assert!(!params.reinvest_dividends);
        assert!(params.validate().is_ok());
    }
}
