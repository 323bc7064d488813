//! Monte Carlo simulation of the goal's real future value
//!
//! Each trial draws an independent parameter set around the base case
//! (Box-Muller normals from the injected source) and runs the compounding
//! calculator. Draws are taken sequentially up front so results depend only
//! on the seed; the projections themselves run in parallel with rayon.
//!
//! ## Metrics
//! - Percentile ladder by nearest rank
//! - Success probability against the target and expected shortfall
//! - Sample standard deviation, coefficient of variation
//! - Value at Risk (95%) and Expected Shortfall (95%)

use log::{debug, info};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::assumptions::MonteCarloSettings;
use crate::error::{ensure_finite, Result};
use crate::projection::{CompoundingCalculator, ProjectionParameters};
use super::random::RandomSource;

/// Sampled rates are kept above this so every trial validates
const SAMPLED_RATE_FLOOR: f64 = -99.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PercentileLadder {
    pub p5: f64,
    pub p10: f64,
    pub p25: f64,
    pub p50: f64,
    pub p75: f64,
    pub p90: f64,
    pub p95: f64,
}

impl PercentileLadder {
    fn from_sorted(sorted: &[f64]) -> Self {
        Self {
            p5: nearest_rank(sorted, 5.0),
            p10: nearest_rank(sorted, 10.0),
            p25: nearest_rank(sorted, 25.0),
            p50: nearest_rank(sorted, 50.0),
            p75: nearest_rank(sorted, 75.0),
            p90: nearest_rank(sorted, 90.0),
            p95: nearest_rank(sorted, 95.0),
        }
    }

    pub fn as_array(&self) -> [f64; 7] {
        [self.p5, self.p10, self.p25, self.p50, self.p75, self.p90, self.p95]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VolatilityMetrics {
    /// Sample standard deviation of real outcomes
    pub std_dev: f64,
    /// std_dev / mean
    pub coefficient_of_variation: f64,
    /// 5th-percentile outcome
    pub var_95: f64,
    /// Mean of the worst 5% of outcomes
    pub expected_shortfall_95: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonteCarloResult {
    pub iterations: u32,
    pub percentiles: PercentileLadder,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    /// Target the trials were measured against (None = no target set)
    pub target: Option<f64>,
    /// Percent of trials whose real (inflation-adjusted) future value meets
    /// or exceeds the target. Not comparable with the nominal solvers.
    pub success_probability: Option<f64>,
    /// Mean of `target - real future value` over failing trials only (0 if none fail)
    pub expected_shortfall: Option<f64>,
    pub volatility: VolatilityMetrics,
}

/// Aggregate result plus the parameter set of the median trial
#[derive(Debug, Clone)]
pub struct MonteCarloRun {
    pub result: MonteCarloResult,
    pub median_parameters: ProjectionParameters,
}

#[derive(Debug, Clone)]
pub struct MonteCarloSimulator {
    calculator: CompoundingCalculator,
    settings: MonteCarloSettings,
}

impl MonteCarloSimulator {
    pub fn new(calculator: CompoundingCalculator, settings: MonteCarloSettings) -> Self {
        Self { calculator, settings }
    }

    pub fn settings(&self) -> &MonteCarloSettings {
        &self.settings
    }

    /// Simulate with the configured iteration count
    pub fn simulate(
        &self,
        base: &ProjectionParameters,
        target: Option<f64>,
        rng: &mut dyn RandomSource,
    ) -> Result<MonteCarloRun> {
        self.simulate_iterations(base, target, self.settings.iterations, rng)
    }

    pub fn simulate_iterations(
        &self,
        base: &ProjectionParameters,
        target: Option<f64>,
        iterations: u32,
        rng: &mut dyn RandomSource,
    ) -> Result<MonteCarloRun> {
        self.settings.validate_iterations(iterations)?;
        base.validate()?;
        if let Some(t) = target {
            ensure_finite("target", t)?;
        }

        let samples: Vec<ProjectionParameters> = (0..iterations).map(|_| self.sample(base, rng)).collect();

        let outcomes: Vec<f64> = samples
            .par_iter()
            .map(|params| self.calculator.project(params, false).map(|r| r.real_future_value))
            .collect::<Result<Vec<f64>>>()?;

        let mut order: Vec<usize> = (0..outcomes.len()).collect();
        order.sort_by(|&a, &b| outcomes[a].total_cmp(&outcomes[b]));
        let sorted: Vec<f64> = order.iter().map(|&i| outcomes[i]).collect();

        let median_index = order[rank_index(sorted.len(), 50.0)];
        let result = aggregate(&sorted, target);

        info!(
            "monte carlo: {} trials, p10={:.2} p50={:.2} p90={:.2}",
            iterations, result.percentiles.p10, result.percentiles.p50, result.percentiles.p90
        );
        if let Some(probability) = result.success_probability {
            debug!("monte carlo success probability {:.1}%", probability);
        }

        Ok(MonteCarloRun {
            result,
            median_parameters: samples[median_index].clone(),
        })
    }

    /// Draw one trial's parameters around `base`
    fn sample(&self, base: &ProjectionParameters, rng: &mut dyn RandomSource) -> ProjectionParameters {
        let s = &self.settings;
        let mut params = base.clone();

        params.annual_return_rate = rng
            .next_normal(base.annual_return_rate, s.return_std_dev)
            .max(SAMPLED_RATE_FLOOR);
        params.inflation_rate = Some(
            rng.next_normal(base.inflation_rate.unwrap_or(0.0), s.inflation_std_dev)
                .max(0.0),
        );
        params.monthly_contribution = rng
            .next_normal(
                base.monthly_contribution,
                base.monthly_contribution * s.contribution_std_dev_fraction,
            )
            .max(0.0);
        params.contribution_growth_rate = Some(
            rng.next_normal(base.contribution_growth_rate.unwrap_or(0.0), s.contribution_growth_std_dev)
                .max(SAMPLED_RATE_FLOOR),
        );

        params
    }
}

/// Nearest-rank index `ceil(p/100 * n) - 1`, clamped to the slice
fn rank_index(n: usize, percentile: f64) -> usize {
    if n == 0 {
        return 0;
    }
    let rank = (percentile / 100.0 * n as f64).ceil() as isize - 1;
    rank.clamp(0, n as isize - 1) as usize
}

fn nearest_rank(sorted: &[f64], percentile: f64) -> f64 {
    sorted.get(rank_index(sorted.len(), percentile)).copied().unwrap_or(0.0)
}

/// Summary statistics over ascending-sorted real outcomes
fn aggregate(sorted: &[f64], target: Option<f64>) -> MonteCarloResult {
    let n = sorted.len();
    let mean = sorted.iter().sum::<f64>() / n as f64;
    let std_dev = if n > 1 {
        (sorted.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1) as f64).sqrt()
    } else {
        0.0
    };
    let coefficient_of_variation = if mean.abs() > f64::EPSILON { std_dev / mean } else { 0.0 };

    let tail = ((0.05 * n as f64).ceil() as usize).clamp(1, n);
    let expected_shortfall_95 = sorted[..tail].iter().sum::<f64>() / tail as f64;

    let (success_probability, expected_shortfall) = match target {
        Some(t) => {
            let successes = sorted.iter().filter(|&&v| v >= t).count();
            let shortfalls: Vec<f64> = sorted.iter().filter(|&&v| v < t).map(|v| t - v).collect();
            let shortfall = if shortfalls.is_empty() {
                0.0
            } else {
                shortfalls.iter().sum::<f64>() / shortfalls.len() as f64
            };
            (Some(successes as f64 / n as f64 * 100.0), Some(shortfall))
        }
        None => (None, None),
    };

    let percentiles = PercentileLadder::from_sorted(sorted);

    MonteCarloResult {
        iterations: n as u32,
        percentiles,
        mean,
        min: sorted[0],
        max: sorted[n - 1],
        target,
        success_probability,
        expected_shortfall,
        volatility: VolatilityMetrics {
            std_dev,
            coefficient_of_variation,
            var_95: percentiles.p5,
            expected_shortfall_95,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::SolverLimits;
    use crate::error::EngineError;
    use crate::risk::random::SeededRandom;

    fn simulator(settings: MonteCarloSettings) -> MonteCarloSimulator {
        MonteCarloSimulator::new(CompoundingCalculator::new(SolverLimits::default()), settings)
    }

    fn base() -> ProjectionParameters {
        ProjectionParameters::new(25_000.0, 1_000.0, 10.0, 60)
            .with_inflation(120.0)
            .with_contribution_growth(25.0)
            .with_dividends(3.0, true)
    }

    #[test]
    fn test_rank_index() {
        assert_eq!(rank_index(100, 50.0), 49);
        assert_eq!(rank_index(100, 5.0), 4);
        assert_eq!(rank_index(10, 0.0), 0);
        assert_eq!(rank_index(10, 100.0), 9);
        assert_eq!(rank_index(1, 95.0), 0);
    }

    #[test]
    fn test_aggregate_known_values() {
        let sorted: Vec<f64> = (1..=100).map(|v| v as f64).collect();
        let result = aggregate(&sorted, Some(91.0));

        assert_eq!(result.percentiles.p50, 50.0);
        assert_eq!(result.percentiles.p90, 90.0);
        assert_eq!(result.volatility.var_95, 5.0);
        // Worst five: 1..=5
        assert_eq!(result.volatility.expected_shortfall_95, 3.0);
        assert_eq!(result.success_probability, Some(10.0));
        // Failing trials 1..=90 fall short by 90..=1, mean 45.5
        assert!((result.expected_shortfall.unwrap() - 45.5).abs() < 1e-12);
        assert!((result.mean - 50.5).abs() < 1e-12);
    }

    #[test]
    fn test_ladder_non_decreasing_and_probability_bounded() {
        let run = simulator(MonteCarloSettings::default())
            .simulate(&base(), Some(500.0), &mut SeededRandom::new(42))
            .unwrap();

        let ladder = run.result.percentiles.as_array();
        assert!(ladder.windows(2).all(|w| w[0] <= w[1]), "{:?}", ladder);

        let probability = run.result.success_probability.unwrap();
        assert!((0.0..=100.0).contains(&probability));
        assert!(run.result.min <= ladder[0] && ladder[6] <= run.result.max);
    }

    #[test]
    fn test_same_seed_reproduces_result() {
        let sim = simulator(MonteCarloSettings::default());
        let first = sim.simulate(&base(), Some(500.0), &mut SeededRandom::new(7)).unwrap();
        let second = sim.simulate(&base(), Some(500.0), &mut SeededRandom::new(7)).unwrap();

        assert_eq!(first.result, second.result);
        assert_eq!(first.median_parameters, second.median_parameters);
    }

    #[test]
    fn test_zero_variance_converges_to_base() {
        let settings = MonteCarloSettings::default().deterministic();
        let expected = CompoundingCalculator::new(SolverLimits::default())
            .project(&base(), false)
            .unwrap()
            .real_future_value;

        let run = simulator(settings)
            .simulate_iterations(&base(), None, 100, &mut SeededRandom::new(1))
            .unwrap();

        assert!((run.result.percentiles.p50 - expected).abs() < 1e-9 * expected);
        assert!(run.result.volatility.std_dev < 1e-9 * expected);
        assert_eq!(run.result.success_probability, None);
    }

    #[test]
    fn test_no_failures_means_zero_shortfall() {
        let run = simulator(MonteCarloSettings::default())
            .simulate(&base(), Some(0.0), &mut SeededRandom::new(3))
            .unwrap();
        assert_eq!(run.result.success_probability, Some(100.0));
        assert_eq!(run.result.expected_shortfall, Some(0.0));
    }

    #[test]
    fn test_iteration_bounds_enforced() {
        let sim = simulator(MonteCarloSettings::default());
        assert!(sim.simulate_iterations(&base(), None, 99, &mut SeededRandom::new(1)).is_err());
        assert!(sim.simulate_iterations(&base(), None, 50_001, &mut SeededRandom::new(1)).is_err());
    }

    #[test]
    fn test_success_measured_against_real_value() {
        let nominal = CompoundingCalculator::new(SolverLimits::default())
            .project(&base(), false)
            .unwrap()
            .future_value;

        // Reachable in nominal terms, but every trial's real value falls short
        let run = simulator(MonteCarloSettings::default().deterministic())
            .simulate_iterations(&base(), Some(nominal), 100, &mut SeededRandom::new(5))
            .unwrap();

        assert_eq!(run.result.success_probability, Some(0.0));
        let shortfall = run.result.expected_shortfall.unwrap();
        assert!((shortfall - (nominal - run.result.percentiles.p50)).abs() < 1e-6 * nominal);
    }

    #[test]
    fn test_zero_iterations_rejected_even_when_configured() {
        let settings = MonteCarloSettings { iterations: 0, min_iterations: 0, ..Default::default() };
        let result = simulator(settings).simulate(&base(), Some(500.0), &mut SeededRandom::new(1));
        assert!(matches!(result, Err(EngineError::InvalidParameter { name: "iterations", .. })));
    }

    #[test]
    fn test_median_parameters_reproduce_median() {
        let calc = CompoundingCalculator::new(SolverLimits::default());
        let run = simulator(MonteCarloSettings::default())
            .simulate(&base(), None, &mut SeededRandom::new(99))
            .unwrap();

        let median = calc.project(&run.median_parameters, false).unwrap();
        assert_eq!(median.real_future_value, run.result.percentiles.p50);
    }
}
