//! Engine configuration: solver caps, adjuster rules, scenario shifts,
//! sensitivity grid, stress library and Monte Carlo settings

mod solver;
mod adjuster;
mod grid;
mod scenarios;
mod stress;
pub mod loader;

pub use solver::SolverLimits;
pub use adjuster::{AdjusterRules, AdjustmentRule};
pub use grid::{ImpactBasis, SensitivityGrid};
pub use scenarios::{MonteCarloSettings, ScenarioShifts};
pub use stress::{ParameterOverrides, Severity, StressLibrary, StressTestScenario};

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Container for all engine configuration
///
/// Immutable once built; every analyzer takes the section it needs by value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub solver: SolverLimits,
    pub adjuster: AdjusterRules,
    pub scenarios: ScenarioShifts,
    pub sensitivity: SensitivityGrid,
    pub stress: StressLibrary,
    pub monte_carlo: MonteCarloSettings,

    /// Horizon used for goals without a target date, months
    pub default_horizon_months: u32,

    /// Capital assumed when the capital provider fails
    pub fallback_capital: f64,
}

impl EngineConfig {
    /// Load configuration overrides from a JSON file
    pub fn from_json_path(path: &Path) -> anyhow::Result<Self> {
        loader::load_engine_config(path)
    }

    /// Replace the stress library with one loaded from CSV
    pub fn with_stress_csv(mut self, path: &Path) -> anyhow::Result<Self> {
        self.stress = loader::load_stress_library(path)?;
        Ok(self)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            solver: SolverLimits::default(),
            adjuster: AdjusterRules::default(),
            scenarios: ScenarioShifts::default(),
            sensitivity: SensitivityGrid::default(),
            stress: StressLibrary::standard(),
            monte_carlo: MonteCarloSettings::default(),
            default_horizon_months: 120,
            fallback_capital: 0.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_keeps_defaults() {
        let json = r#"{
            "solver": { "max_months": 360 },
            "monte_carlo": { "iterations": 5000, "seed": 7 }
        }"#;
        let config: EngineConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.solver.max_months, 360);
        assert_eq!(config.solver.irr_max_iterations, 1000);
        assert_eq!(config.monte_carlo.iterations, 5000);
        assert_eq!(config.monte_carlo.seed, Some(7));
        assert_eq!(config.monte_carlo.return_std_dev, 8.0);
        assert_eq!(config.stress.len(), 4);
        assert_eq!(config.adjuster.order.len(), 3);
    }

    #[test]
    fn test_stress_library_serializes_as_list() {
        let config = EngineConfig::default();
        let value = serde_json::to_value(&config).unwrap();
        assert!(value["stress"].is_array());
        assert_eq!(value["stress"][0]["severity"], "SEVERE");
    }
}
