//! One-at-a-time parameter perturbation used by sensitivity analysis

use serde::{Deserialize, Serialize};

use super::params::ProjectionParameters;

/// Parameter a sensitivity sweep can vary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SensitivityParameter {
    /// Shifted by percentage points
    AnnualReturnRate,
    /// Shifted by percentage points, floored at zero
    InflationRate,
    /// Scaled by a percent change, floored at zero
    MonthlyContribution,
    /// Shifted by percentage points
    ContributionGrowthRate,
}

impl SensitivityParameter {
    pub const ALL: [SensitivityParameter; 4] = [
        SensitivityParameter::AnnualReturnRate,
        SensitivityParameter::InflationRate,
        SensitivityParameter::MonthlyContribution,
        SensitivityParameter::ContributionGrowthRate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Self::AnnualReturnRate => "annual_return_rate",
            Self::InflationRate => "inflation_rate",
            Self::MonthlyContribution => "monthly_contribution",
            Self::ContributionGrowthRate => "contribution_growth_rate",
        }
    }

    /// Current value of this parameter (absent optional rates read as zero)
    pub fn current(&self, params: &ProjectionParameters) -> f64 {
        match self {
            Self::AnnualReturnRate => params.annual_return_rate,
            Self::InflationRate => params.inflation_rate.unwrap_or(0.0),
            Self::MonthlyContribution => params.monthly_contribution,
            Self::ContributionGrowthRate => params.contribution_growth_rate.unwrap_or(0.0),
        }
    }

    /// Copy of `params` with this parameter moved by `variation`
    pub fn perturb(&self, params: &ProjectionParameters, variation: f64) -> ProjectionParameters {
        let mut perturbed = params.clone();
        let current = self.current(params);
        match self {
            Self::AnnualReturnRate => perturbed.annual_return_rate = current + variation,
            Self::InflationRate => perturbed.inflation_rate = Some((current + variation).max(0.0)),
            Self::MonthlyContribution => {
                perturbed.monthly_contribution = (current * (1.0 + variation / 100.0)).max(0.0)
            }
            Self::ContributionGrowthRate => perturbed.contribution_growth_rate = Some(current + variation),
        }
        perturbed
    }
}

impl std::fmt::Display for SensitivityParameter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl std::str::FromStr for SensitivityParameter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "annual_return_rate" | "annualReturnRate" => Ok(Self::AnnualReturnRate),
            "inflation_rate" | "inflationRate" => Ok(Self::InflationRate),
            "monthly_contribution" | "monthlyContribution" => Ok(Self::MonthlyContribution),
            "contribution_growth_rate" | "contributionGrowthRate" => Ok(Self::ContributionGrowthRate),
            other => Err(format!("Unknown sensitivity parameter: {}", other)),
        }
    }
}

/// Result of recomputing the projection at one perturbed point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityPoint {
    pub parameter: SensitivityParameter,
    pub variation: f64,
    pub original_value: f64,
    pub new_value: f64,
    pub future_value: f64,
    pub real_future_value: f64,
    /// Change versus the base case, percent
    pub impact_percent: f64,
}
