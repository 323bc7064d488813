//! Stress tester: run the base projection under each adverse scenario in
//! the library

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::assumptions::{StressLibrary, StressTestScenario};
use crate::error::{Outcome, Result};
use crate::projection::{CompoundingCalculator, ProjectionParameters, ProjectionResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressOutcome {
    pub scenario: StressTestScenario,
    pub result: Outcome<ProjectionResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StressReport {
    pub outcomes: Vec<StressOutcome>,
}

impl StressReport {
    fn completed(&self) -> impl Iterator<Item = (&StressTestScenario, &ProjectionResult)> {
        self.outcomes
            .iter()
            .filter_map(|o| o.result.completed().map(|r| (&o.scenario, r)))
    }

    /// Completed scenario with the highest real future value
    pub fn best_case(&self) -> Option<(&StressTestScenario, &ProjectionResult)> {
        self.completed()
            .max_by(|a, b| a.1.real_future_value.total_cmp(&b.1.real_future_value))
    }

    /// Completed scenario with the lowest real future value
    pub fn worst_case(&self) -> Option<(&StressTestScenario, &ProjectionResult)> {
        self.completed()
            .min_by(|a, b| a.1.real_future_value.total_cmp(&b.1.real_future_value))
    }

    /// Real future value weighted by scenario probability over completed scenarios
    pub fn probability_weighted_real_value(&self) -> Option<f64> {
        let (weighted, total) = self
            .completed()
            .fold((0.0, 0.0), |(sum, weight), (scenario, result)| {
                (sum + scenario.probability * result.real_future_value, weight + scenario.probability)
            });
        if total > 0.0 {
            Some(weighted / total)
        } else {
            None
        }
    }

    pub fn failed_count(&self) -> usize {
        self.outcomes.iter().filter(|o| o.result.is_failed()).count()
    }
}

#[derive(Debug, Clone)]
pub struct StressTester {
    calculator: CompoundingCalculator,
    library: StressLibrary,
}

impl StressTester {
    pub fn new(calculator: CompoundingCalculator, library: StressLibrary) -> Self {
        Self { calculator, library }
    }

    pub fn library(&self) -> &StressLibrary {
        &self.library
    }

    /// Run every scenario; a failing scenario is labeled and the rest still run.
    /// Invalid base parameters fail the whole call.
    pub fn run(&self, base: &ProjectionParameters) -> Result<StressReport> {
        base.validate()?;

        let outcomes: Vec<StressOutcome> = self
            .library
            .scenarios
            .iter()
            .map(|scenario| {
                let params = scenario.overrides.apply(base);
                let result = Outcome::from(self.calculator.calculate_future_value(&params));
                if let Outcome::Failed { reason } = &result {
                    warn!("stress scenario '{}' failed: {}", scenario.name, reason);
                }
                StressOutcome { scenario: scenario.clone(), result }
            })
            .collect();

        let report = StressReport { outcomes };
        info!(
            "stress test: {} scenarios, {} failed",
            report.outcomes.len(),
            report.failed_count()
        );
        Ok(report)
    }
}
