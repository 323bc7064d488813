//! Library of adverse macro scenarios

use serde::{Deserialize, Serialize};

use crate::projection::ProjectionParameters;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
}

impl std::str::FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "MILD" => Ok(Severity::Mild),
            "MODERATE" => Ok(Severity::Moderate),
            "SEVERE" => Ok(Severity::Severe),
            other => Err(format!("Unknown severity: {}", other)),
        }
    }
}

/// Absolute values replacing the base parameters. `None` keeps the base value.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterOverrides {
    #[serde(default)]
    pub annual_return_rate: Option<f64>,
    #[serde(default)]
    pub inflation_rate: Option<f64>,
    #[serde(default)]
    pub monthly_contribution: Option<f64>,
    #[serde(default)]
    pub contribution_growth_rate: Option<f64>,
}

impl ParameterOverrides {
    pub fn apply(&self, base: &ProjectionParameters) -> ProjectionParameters {
        let mut params = base.clone();
        if let Some(rate) = self.annual_return_rate {
            params.annual_return_rate = rate;
        }
        if let Some(rate) = self.inflation_rate {
            params.inflation_rate = Some(rate);
        }
        if let Some(amount) = self.monthly_contribution {
            params.monthly_contribution = amount;
        }
        if let Some(rate) = self.contribution_growth_rate {
            params.contribution_growth_rate = Some(rate);
        }
        params
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StressTestScenario {
    pub name: String,
    pub description: String,
    pub overrides: ParameterOverrides,
    /// Assumed probability of the scenario, percent
    pub probability: f64,
    pub severity: Severity,
}

impl StressTestScenario {
    fn rates(
        name: &str,
        description: &str,
        annual_return_rate: f64,
        inflation_rate: f64,
        probability: f64,
        severity: Severity,
    ) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            overrides: ParameterOverrides {
                annual_return_rate: Some(annual_return_rate),
                inflation_rate: Some(inflation_rate),
                ..Default::default()
            },
            probability,
            severity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StressLibrary {
    pub scenarios: Vec<StressTestScenario>,
}

impl StressLibrary {
    /// Four standard macro shocks: crisis, recession, inflation spike, stagnation
    pub fn standard() -> Self {
        Self {
            scenarios: vec![
                StressTestScenario::rates(
                    "financial_crisis",
                    "Systemic market crash with a currency shock",
                    -15.0,
                    180.0,
                    5.0,
                    Severity::Severe,
                ),
                StressTestScenario::rates(
                    "moderate_recession",
                    "Two-year contraction with weak asset returns",
                    2.0,
                    140.0,
                    20.0,
                    Severity::Moderate,
                ),
                StressTestScenario::rates(
                    "high_inflation",
                    "Inflation spike outpacing nominal returns",
                    6.0,
                    250.0,
                    10.0,
                    Severity::Severe,
                ),
                StressTestScenario::rates(
                    "stagnation",
                    "Flat markets with persistent inflation",
                    1.0,
                    100.0,
                    25.0,
                    Severity::Mild,
                ),
            ],
        }
    }

    pub fn len(&self) -> usize {
        self.scenarios.len()
    }

    pub fn is_empty(&self) -> bool {
        self.scenarios.is_empty()
    }
}

impl Default for StressLibrary {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_library() {
        let library = StressLibrary::standard();
        assert_eq!(library.len(), 4);

        let crisis = &library.scenarios[0];
        assert_eq!(crisis.severity, Severity::Severe);
        assert_eq!(crisis.overrides.annual_return_rate, Some(-15.0));
        assert_eq!(crisis.overrides.inflation_rate, Some(180.0));
    }

    #[test]
    fn test_overrides_keep_unset_fields() {
        let base = ProjectionParameters::new(10_000.0, 500.0, 8.0, 24).with_contribution_growth(4.0);
        let overrides = ParameterOverrides {
            annual_return_rate: Some(-2.0),
            ..Default::default()
        };

        let params = overrides.apply(&base);
        assert_eq!(params.annual_return_rate, -2.0);
        assert_eq!(params.monthly_contribution, 500.0);
        assert_eq!(params.contribution_growth_rate, Some(4.0));
        assert_eq!(params.inflation_rate, None);
    }

    #[test]
    fn test_severity_parse() {
        assert_eq!("severe".parse::<Severity>(), Ok(Severity::Severe));
        assert!("catastrophic".parse::<Severity>().is_err());
    }
}
