//! Full goal analysis: providers, rate adjustment, scenarios, sensitivity,
//! stress, Monte Carlo and the persistence sink, in that order

use anyhow::Context;
use chrono::NaiveDate;
use log::{info, warn};
use serde::Serialize;

use crate::assumptions::EngineConfig;
use crate::error::Outcome;
use crate::market::{CorrelationEstimator, DynamicAdjustment, DynamicRateAdjuster, MarketContext};
use crate::projection::{CompoundingCalculator, ProjectionParameters, TimeToGoal};
use crate::risk::{MonteCarloSimulator, RandomSource, SensitivityAnalysis, SensitivityAnalyzer, StressReport, StressTester};
use crate::scenario::{ScenarioGenerator, ScenarioKind, ScenarioSet};
use super::providers::{CapitalProvider, Goal, MarketContextProvider};
use super::sink::{AnalysisKey, ProjectionSink};

const SENSITIVITY_ROW: &str = "sensitivity";

/// Everything produced for one goal on one analysis date
#[derive(Debug, Clone, Serialize)]
pub struct GoalAnalysis {
    pub goal_id: String,
    pub analysis_date: NaiveDate,
    pub current_capital: f64,
    /// True when the capital provider failed and the configured fallback was used
    pub capital_fallback: bool,
    pub adjustment: DynamicAdjustment,
    pub parameters: ProjectionParameters,
    pub scenarios: ScenarioSet,
    pub sensitivity: SensitivityAnalysis,
    pub stress: StressReport,
    /// Nominal monthly contribution that reaches the target (None = no target)
    pub required_contribution: Option<Outcome<f64>>,
    pub time_to_goal: Option<Outcome<TimeToGoal>>,
    pub correlation_notes: Vec<String>,
}

pub struct GoalAnalyzer<C, M> {
    config: EngineConfig,
    capital: C,
    market: M,
    calculator: CompoundingCalculator,
    adjuster: DynamicRateAdjuster,
    scenarios: ScenarioGenerator,
    sensitivity: SensitivityAnalyzer,
    stress: StressTester,
    correlations: CorrelationEstimator,
}

impl<C: CapitalProvider, M: MarketContextProvider> GoalAnalyzer<C, M> {
    pub fn new(config: EngineConfig, capital: C, market: M) -> Self {
        let calculator = CompoundingCalculator::new(config.solver);
        let simulator = MonteCarloSimulator::new(calculator, config.monte_carlo.clone());

        Self {
            capital,
            market,
            calculator,
            adjuster: DynamicRateAdjuster::new(config.adjuster.clone()),
            scenarios: ScenarioGenerator::new(calculator, config.scenarios.clone(), simulator),
            sensitivity: SensitivityAnalyzer::new(calculator, config.sensitivity.clone()),
            stress: StressTester::new(calculator, config.stress.clone()),
            correlations: CorrelationEstimator::default_table(),
            config,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn analyze(
        &self,
        goal: &Goal,
        as_of: NaiveDate,
        rng: &mut dyn RandomSource,
        sink: &mut dyn ProjectionSink,
    ) -> anyhow::Result<GoalAnalysis> {
        let (current_capital, capital_fallback) = self.resolve_capital(goal);
        let context = self.resolve_market(goal);

        let adjustment = self
            .adjuster
            .adjust(goal.expected_return_rate, &context)
            .with_context(|| format!("Rate adjustment failed for goal {}", goal.goal_id))?;

        let periods = goal
            .horizon_months(as_of)
            .unwrap_or(self.config.default_horizon_months);
        let parameters = ProjectionParameters::new(
            current_capital,
            goal.monthly_contribution,
            adjustment.adjusted_rate,
            periods,
        )
        .with_inflation(self.config.solver.assumed_inflation_rate);

        info!(
            "analyzing goal {}: capital {:.2}, rate {:.2}% -> {:.2}%, {} months",
            goal.goal_id, current_capital, adjustment.original_rate, adjustment.adjusted_rate, periods
        );

        let scenarios = self
            .scenarios
            .generate(&parameters, goal.target_amount, rng)
            .with_context(|| format!("Scenario generation failed for goal {}", goal.goal_id))?;
        let sensitivity = self
            .sensitivity
            .analyze(&parameters)
            .with_context(|| format!("Sensitivity analysis failed for goal {}", goal.goal_id))?;
        let stress = self
            .stress
            .run(&parameters)
            .with_context(|| format!("Stress test failed for goal {}", goal.goal_id))?;

        let required_contribution = goal.target_amount.map(|target| {
            Outcome::from(self.calculator.calculate_required_contribution(
                current_capital,
                target,
                parameters.annual_return_rate,
                periods,
                false,
            ))
        });
        let time_to_goal = goal.target_amount.map(|target| {
            Outcome::from(self.calculator.calculate_time_to_goal(
                current_capital,
                target,
                goal.monthly_contribution,
                parameters.annual_return_rate,
                false,
            ))
        });

        let analysis = GoalAnalysis {
            goal_id: goal.goal_id.clone(),
            analysis_date: as_of,
            current_capital,
            capital_fallback,
            adjustment,
            parameters,
            scenarios,
            sensitivity,
            stress,
            required_contribution,
            time_to_goal,
            correlation_notes: self.correlations.narrative(),
        };

        self.persist(&analysis, sink)?;
        Ok(analysis)
    }

    fn resolve_capital(&self, goal: &Goal) -> (f64, bool) {
        match self.capital.current_capital(goal) {
            Ok(capital) if capital.is_finite() && capital >= 0.0 => (capital, false),
            Ok(capital) => {
                warn!(
                    "capital {} for goal {} is unusable; using fallback {}",
                    capital, goal.goal_id, self.config.fallback_capital
                );
                (self.config.fallback_capital, true)
            }
            Err(e) => {
                warn!("{}; using fallback capital {} for goal {}", e, self.config.fallback_capital, goal.goal_id);
                (self.config.fallback_capital, true)
            }
        }
    }

    fn resolve_market(&self, goal: &Goal) -> MarketContext {
        self.market.market_context(goal).unwrap_or_else(|e| {
            warn!("{}; using neutral market context for goal {}", e, goal.goal_id);
            MarketContext::neutral()
        })
    }

    fn persist(&self, analysis: &GoalAnalysis, sink: &mut dyn ProjectionSink) -> anyhow::Result<()> {
        let key = |name: &str| AnalysisKey::new(&analysis.goal_id, name, analysis.analysis_date);

        for scenario in &analysis.scenarios.scenarios {
            sink.store_projection(&key(scenario.kind.name()), &scenario.result)
                .with_context(|| format!("Failed to store {} scenario", scenario.kind))?;
        }
        sink.store_sensitivity(&key(SENSITIVITY_ROW), &analysis.sensitivity)
            .context("Failed to store sensitivity analysis")?;
        sink.store_monte_carlo(&key(ScenarioKind::MonteCarlo.name()), &analysis.scenarios.monte_carlo)
            .context("Failed to store Monte Carlo result")?;
        Ok(())
    }
}
