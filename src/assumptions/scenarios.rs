//! Scenario shifts and Monte Carlo sampling settings

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Parameter shifts and confidence labels for the named scenarios
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioShifts {
    pub optimistic_return_shift: f64,
    pub optimistic_contribution_growth_shift: f64,
    pub optimistic_confidence: f64,

    pub realistic_confidence: f64,

    pub pessimistic_return_shift: f64,
    pub pessimistic_inflation_shift: f64,
    pub pessimistic_confidence: f64,

    pub monte_carlo_confidence: f64,
}

impl Default for ScenarioShifts {
    fn default() -> Self {
        Self {
            optimistic_return_shift: 3.0,
            optimistic_contribution_growth_shift: 2.0,
            optimistic_confidence: 25.0,
            realistic_confidence: 70.0,
            pessimistic_return_shift: -4.0,
            pessimistic_inflation_shift: 20.0,
            pessimistic_confidence: 90.0,
            monte_carlo_confidence: 80.0,
        }
    }
}

/// Monte Carlo trial count and per-parameter dispersion
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MonteCarloSettings {
    pub iterations: u32,
    pub min_iterations: u32,
    pub max_iterations: u32,

    /// Standard deviation of the annual return, percentage points
    pub return_std_dev: f64,
    /// Standard deviation of inflation, percentage points
    pub inflation_std_dev: f64,
    /// Standard deviation of the contribution as a fraction of its base value
    pub contribution_std_dev_fraction: f64,
    /// Standard deviation of contribution growth, percentage points
    pub contribution_growth_std_dev: f64,

    /// Seed for reproducible runs (None = seeded from entropy)
    pub seed: Option<u64>,
}

impl MonteCarloSettings {
    /// Iterations must lie in `min_iterations..=max_iterations` and never be zero
    pub fn validate_iterations(&self, iterations: u32) -> Result<()> {
        if iterations == 0 {
            return Err(EngineError::invalid("iterations", "at least one trial is required"));
        }
        if iterations < self.min_iterations || iterations > self.max_iterations {
            return Err(EngineError::invalid(
                "iterations",
                format!(
                    "{} is outside the allowed range {}..={}",
                    iterations, self.min_iterations, self.max_iterations
                ),
            ));
        }
        Ok(())
    }

    /// Same settings with every dispersion set to zero
    pub fn deterministic(&self) -> Self {
        Self {
            return_std_dev: 0.0,
            inflation_std_dev: 0.0,
            contribution_std_dev_fraction: 0.0,
            contribution_growth_std_dev: 0.0,
            ..self.clone()
        }
    }
}

impl Default for MonteCarloSettings {
    fn default() -> Self {
        Self {
            iterations: 1000,
            min_iterations: 100,
            max_iterations: 50_000,
            return_std_dev: 8.0,
            inflation_std_dev: 30.0,
            contribution_std_dev_fraction: 0.10,
            contribution_growth_std_dev: 10.0,
            seed: None,
        }
    }
}
