//! Scenario generator for named projections
//!
//! Derives the optimistic, realistic and pessimistic parameter sets from one
//! base case, and reruns the median Monte Carlo trial with a full ledger as
//! the aggregate scenario.

use log::info;
use serde::{Deserialize, Serialize};

use crate::assumptions::ScenarioShifts;
use crate::error::Result;
use crate::projection::{CompoundingCalculator, ProjectionParameters, ProjectionResult};
use crate::risk::{MonteCarloResult, MonteCarloSimulator, RandomSource};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScenarioKind {
    Optimistic,
    Realistic,
    Pessimistic,
    MonteCarlo,
}

impl ScenarioKind {
    pub const DETERMINISTIC: [ScenarioKind; 3] =
        [ScenarioKind::Optimistic, ScenarioKind::Realistic, ScenarioKind::Pessimistic];

    /// Name the scenario row is stored under
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioKind::Optimistic => "optimistic",
            ScenarioKind::Realistic => "realistic",
            ScenarioKind::Pessimistic => "pessimistic",
            ScenarioKind::MonteCarlo => "monte_carlo",
        }
    }
}

impl std::fmt::Display for ScenarioKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One named projection with its confidence label
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioProjection {
    pub kind: ScenarioKind,
    /// 0-100
    pub confidence: f64,
    pub parameters: ProjectionParameters,
    pub result: ProjectionResult,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSet {
    pub scenarios: Vec<ScenarioProjection>,
    pub monte_carlo: MonteCarloResult,
}

impl ScenarioSet {
    pub fn get(&self, kind: ScenarioKind) -> Option<&ScenarioProjection> {
        self.scenarios.iter().find(|s| s.kind == kind)
    }
}

#[derive(Debug, Clone)]
pub struct ScenarioGenerator {
    calculator: CompoundingCalculator,
    shifts: ScenarioShifts,
    simulator: MonteCarloSimulator,
}

impl ScenarioGenerator {
    pub fn new(calculator: CompoundingCalculator, shifts: ScenarioShifts, simulator: MonteCarloSimulator) -> Self {
        Self { calculator, shifts, simulator }
    }

    /// Parameters and confidence for a deterministic scenario
    ///
    /// Returns `None` for `MonteCarlo`, whose parameters come from the simulation.
    pub fn scenario_parameters(
        &self,
        kind: ScenarioKind,
        base: &ProjectionParameters,
    ) -> Option<(ProjectionParameters, f64)> {
        let s = &self.shifts;
        let mut params = base.clone();

        let confidence = match kind {
            ScenarioKind::Optimistic => {
                params.annual_return_rate += s.optimistic_return_shift;
                params.contribution_growth_rate =
                    Some(base.contribution_growth_rate.unwrap_or(0.0) + s.optimistic_contribution_growth_shift);
                s.optimistic_confidence
            }
            ScenarioKind::Realistic => s.realistic_confidence,
            ScenarioKind::Pessimistic => {
                params.annual_return_rate += s.pessimistic_return_shift;
                params.inflation_rate = Some(base.inflation_rate.unwrap_or(0.0) + s.pessimistic_inflation_shift);
                s.pessimistic_confidence
            }
            ScenarioKind::MonteCarlo => return None,
        };

        Some((params, confidence))
    }

    /// Run one deterministic scenario with the full ledger
    pub fn run(&self, kind: ScenarioKind, base: &ProjectionParameters) -> Option<Result<ScenarioProjection>> {
        let (parameters, confidence) = self.scenario_parameters(kind, base)?;
        Some(
            self.calculator
                .calculate_future_value(&parameters)
                .map(|result| ScenarioProjection { kind, confidence, parameters, result }),
        )
    }

    /// Produce all four scenarios; the simulation uses the given random source
    pub fn generate(
        &self,
        base: &ProjectionParameters,
        target: Option<f64>,
        rng: &mut dyn RandomSource,
    ) -> Result<ScenarioSet> {
        let mut scenarios = ScenarioKind::DETERMINISTIC
            .iter()
            .filter_map(|&kind| self.run(kind, base))
            .collect::<Result<Vec<_>>>()?;

        let run = self.simulator.simulate(base, target, rng)?;
        let median = self.calculator.calculate_future_value(&run.median_parameters)?;
        scenarios.push(ScenarioProjection {
            kind: ScenarioKind::MonteCarlo,
            confidence: self.shifts.monte_carlo_confidence,
            parameters: run.median_parameters,
            result: median,
        });

        for scenario in &scenarios {
            info!(
                "scenario {}: FV {:.2}, real {:.2} (confidence {:.0})",
                scenario.kind, scenario.result.future_value, scenario.result.real_future_value, scenario.confidence
            );
        }

        Ok(ScenarioSet { scenarios, monte_carlo: run.result })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::{MonteCarloSettings, SolverLimits};
    use crate::risk::SeededRandom;

    fn generator(settings: MonteCarloSettings) -> ScenarioGenerator {
        let calculator = CompoundingCalculator::new(SolverLimits::default());
        ScenarioGenerator::new(
            calculator,
            ScenarioShifts::default(),
            MonteCarloSimulator::new(calculator, settings),
        )
    }

    fn base() -> ProjectionParameters {
        ProjectionParameters::new(25_000.0, 1_000.0, 10.0, 60)
            .with_inflation(120.0)
            .with_contribution_growth(25.0)
            .with_dividends(3.0, true)
    }

    #[test]
    fn test_parameter_shifts() {
        let gen = generator(MonteCarloSettings::default());

        let (optimistic, confidence) = gen.scenario_parameters(ScenarioKind::Optimistic, &base()).unwrap();
        assert_eq!(optimistic.annual_return_rate, 13.0);
        assert_eq!(optimistic.contribution_growth_rate, Some(27.0));
        assert_eq!(confidence, 25.0);

        let (pessimistic, confidence) = gen.scenario_parameters(ScenarioKind::Pessimistic, &base()).unwrap();
        assert_eq!(pessimistic.annual_return_rate, 6.0);
        assert_eq!(pessimistic.inflation_rate, Some(140.0));
        assert_eq!(confidence, 90.0);

        let (realistic, confidence) = gen.scenario_parameters(ScenarioKind::Realistic, &base()).unwrap();
        assert_eq!(realistic, base());
        assert_eq!(confidence, 70.0);

        assert!(gen.scenario_parameters(ScenarioKind::MonteCarlo, &base()).is_none());
    }

    #[test]
    fn test_scenarios_are_ordered() {
        let set = generator(MonteCarloSettings::default())
            .generate(&base(), None, &mut SeededRandom::new(42))
            .unwrap();

        assert_eq!(set.scenarios.len(), 4);
        let fv = |kind| set.get(kind).unwrap().result.real_future_value;
        assert!(fv(ScenarioKind::Optimistic) > fv(ScenarioKind::Realistic));
        assert!(fv(ScenarioKind::Realistic) > fv(ScenarioKind::Pessimistic));

        let aggregate = set.get(ScenarioKind::MonteCarlo).unwrap();
        assert_eq!(aggregate.confidence, 80.0);
        assert_eq!(aggregate.result.ledger.len(), 60);
        assert_eq!(aggregate.result.real_future_value, set.monte_carlo.percentiles.p50);
    }

    #[test]
    fn test_deterministic_aggregate_matches_realistic() {
        let set = generator(MonteCarloSettings::default().deterministic())
            .generate(&base(), None, &mut SeededRandom::new(1))
            .unwrap();

        let realistic = set.get(ScenarioKind::Realistic).unwrap().result.future_value;
        let aggregate = set.get(ScenarioKind::MonteCarlo).unwrap().result.future_value;
        assert!((realistic - aggregate).abs() < 1e-6, "{} vs {}", realistic, aggregate);
    }

    #[test]
    fn test_invalid_base_fails() {
        let params = ProjectionParameters::new(1_000.0, 100.0, 5.0, 0);
        assert!(generator(MonteCarloSettings::default())
            .generate(&params, None, &mut SeededRandom::new(1))
            .is_err());
    }
}
