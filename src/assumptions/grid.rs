//! Sensitivity grid: which parameters are perturbed, by how much, and how
//! the resulting impact is classified

use serde::{Deserialize, Serialize};

use crate::projection::SensitivityParameter;

/// Which terminal value the impact percentage is measured on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ImpactBasis {
    /// Nominal future value
    #[default]
    Nominal,
    /// Inflation-adjusted future value
    Real,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitivityGrid {
    /// Percentage-point shifts to the annual return rate
    pub return_rate_variations: Vec<f64>,
    /// Percentage-point shifts to the inflation rate
    pub inflation_variations: Vec<f64>,
    /// Percent changes to the monthly contribution
    pub contribution_variations: Vec<f64>,
    /// Percentage-point shifts to the contribution growth rate
    pub contribution_growth_variations: Vec<f64>,

    pub impact_basis: ImpactBasis,

    /// |impact| at or above this is MEDIUM
    pub medium_impact_threshold: f64,
    /// |impact| at or above this is HIGH
    pub high_impact_threshold: f64,

    /// Average impact at or above this rates Moderate
    pub moderate_rating_threshold: f64,
    /// Average impact above this rates High
    pub high_rating_threshold: f64,
}

impl SensitivityGrid {
    pub fn variations_for(&self, parameter: SensitivityParameter) -> &[f64] {
        match parameter {
            SensitivityParameter::AnnualReturnRate => &self.return_rate_variations,
            SensitivityParameter::InflationRate => &self.inflation_variations,
            SensitivityParameter::MonthlyContribution => &self.contribution_variations,
            SensitivityParameter::ContributionGrowthRate => &self.contribution_growth_variations,
        }
    }
}

impl Default for SensitivityGrid {
    fn default() -> Self {
        Self {
            return_rate_variations: vec![-5.0, -3.0, -2.0, -1.0, 1.0, 2.0, 3.0, 5.0],
            inflation_variations: vec![-40.0, -20.0, -10.0, 10.0, 20.0, 40.0, 60.0],
            contribution_variations: vec![-50.0, -30.0, -20.0, -10.0, 10.0, 20.0, 30.0, 50.0],
            contribution_growth_variations: vec![-15.0, -10.0, -5.0, 5.0, 10.0, 15.0, 20.0],
            impact_basis: ImpactBasis::Nominal,
            medium_impact_threshold: 10.0,
            high_impact_threshold: 25.0,
            moderate_rating_threshold: 10.0,
            high_rating_threshold: 20.0,
        }
    }
}
