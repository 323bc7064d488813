//! Sensitivity analyzer: sweep each parameter over the configured grid and
//! classify the impact on the projected value

use std::collections::BTreeMap;

use log::{info, warn};
use serde::{Deserialize, Serialize};

use crate::assumptions::{ImpactBasis, SensitivityGrid};
use crate::error::{Outcome, Result};
use crate::projection::{CompoundingCalculator, ProjectionParameters, SensitivityParameter, SensitivityPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Overall rating from the average absolute impact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskRating {
    Low,
    Moderate,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityResult {
    pub parameter: SensitivityParameter,
    pub variation: f64,
    pub original_value: f64,
    pub new_value: f64,
    pub future_value: f64,
    pub real_future_value: f64,
    pub impact_percent: f64,
    pub risk_level: RiskLevel,
}

impl SensitivityResult {
    fn from_point(point: SensitivityPoint, grid: &SensitivityGrid) -> Self {
        let magnitude = point.impact_percent.abs();
        let risk_level = if magnitude >= grid.high_impact_threshold {
            RiskLevel::High
        } else if magnitude >= grid.medium_impact_threshold {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };

        Self {
            parameter: point.parameter,
            variation: point.variation,
            original_value: point.original_value,
            new_value: point.new_value,
            future_value: point.future_value,
            real_future_value: point.real_future_value,
            impact_percent: point.impact_percent,
            risk_level,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivitySummary {
    /// Parameter with the highest mean |impact|
    pub most_sensitive: Option<SensitivityParameter>,
    /// Parameter with the lowest mean |impact|
    pub least_sensitive: Option<SensitivityParameter>,
    /// Mean |impact| per parameter, percent
    pub mean_impact_by_parameter: BTreeMap<SensitivityParameter, f64>,
    /// Mean |impact| over every completed point, percent
    pub average_impact: f64,
    pub risk_rating: RiskRating,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SensitivityAnalysis {
    pub impact_basis: ImpactBasis,
    pub base_future_value: f64,
    pub base_real_future_value: f64,
    pub results: Vec<Outcome<SensitivityResult>>,
    pub summary: SensitivitySummary,
}

impl SensitivityAnalysis {
    pub fn completed(&self) -> impl Iterator<Item = &SensitivityResult> {
        self.results.iter().filter_map(Outcome::completed)
    }

    pub fn failed_count(&self) -> usize {
        self.results.iter().filter(|r| r.is_failed()).count()
    }
}

#[derive(Debug, Clone)]
pub struct SensitivityAnalyzer {
    calculator: CompoundingCalculator,
    grid: SensitivityGrid,
}

impl SensitivityAnalyzer {
    pub fn new(calculator: CompoundingCalculator, grid: SensitivityGrid) -> Self {
        Self { calculator, grid }
    }

    /// Sweep every parameter in the grid around `base`
    pub fn analyze(&self, base: &ProjectionParameters) -> Result<SensitivityAnalysis> {
        let base_result = self.calculator.project(base, false)?;
        let mut results = Vec::new();

        for parameter in SensitivityParameter::ALL {
            let points = self.calculator.perform_sensitivity_analysis(
                base,
                parameter,
                self.grid.variations_for(parameter),
                self.grid.impact_basis,
            )?;

            for point in points {
                results.push(match point {
                    Outcome::Completed(point) => Outcome::Completed(SensitivityResult::from_point(point, &self.grid)),
                    Outcome::Failed { reason } => {
                        warn!("sensitivity point for {} failed: {}", parameter, reason);
                        Outcome::Failed { reason }
                    }
                });
            }
        }

        let summary = self.summarize(&results);
        info!(
            "sensitivity: {} points, average impact {:.2}% ({:?})",
            results.len(),
            summary.average_impact,
            summary.risk_rating
        );

        Ok(SensitivityAnalysis {
            impact_basis: self.grid.impact_basis,
            base_future_value: base_result.future_value,
            base_real_future_value: base_result.real_future_value,
            results,
            summary,
        })
    }

    fn summarize(&self, results: &[Outcome<SensitivityResult>]) -> SensitivitySummary {
        let mut totals: BTreeMap<SensitivityParameter, (f64, usize)> = BTreeMap::new();
        let mut sum = 0.0;
        let mut count = 0usize;

        for result in results.iter().filter_map(Outcome::completed) {
            let magnitude = result.impact_percent.abs();
            let entry = totals.entry(result.parameter).or_insert((0.0, 0));
            entry.0 += magnitude;
            entry.1 += 1;
            sum += magnitude;
            count += 1;
        }

        let mean_impact_by_parameter: BTreeMap<SensitivityParameter, f64> = totals
            .into_iter()
            .map(|(parameter, (total, n))| (parameter, total / n as f64))
            .collect();

        let most_sensitive = mean_impact_by_parameter
            .iter()
            .max_by(|a, b| a.1.total_cmp(b.1))
            .map(|(p, _)| *p);
        let least_sensitive = mean_impact_by_parameter
            .iter()
            .min_by(|a, b| a.1.total_cmp(b.1))
            .map(|(p, _)| *p);

        let average_impact = if count > 0 { sum / count as f64 } else { 0.0 };
        let risk_rating = if average_impact > self.grid.high_rating_threshold {
            RiskRating::High
        } else if average_impact >= self.grid.moderate_rating_threshold {
            RiskRating::Moderate
        } else {
            RiskRating::Low
        };

        SensitivitySummary {
            most_sensitive,
            least_sensitive,
            mean_impact_by_parameter,
            average_impact,
            risk_rating,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::SolverLimits;

    fn analyzer(grid: SensitivityGrid) -> SensitivityAnalyzer {
        SensitivityAnalyzer::new(CompoundingCalculator::new(SolverLimits::default()), grid)
    }

    fn base() -> ProjectionParameters {
        ProjectionParameters::new(25_000.0, 1_000.0, 10.0, 60)
            .with_inflation(120.0)
            .with_contribution_growth(25.0)
            .with_dividends(3.0, true)
    }

    #[test]
    fn test_full_grid_runs() {
        let grid = SensitivityGrid::default();
        let expected_points = grid.return_rate_variations.len()
            + grid.inflation_variations.len()
            + grid.contribution_variations.len()
            + grid.contribution_growth_variations.len();

        let analysis = analyzer(grid).analyze(&base()).unwrap();
        assert_eq!(analysis.results.len(), expected_points);
        assert_eq!(analysis.failed_count(), 0);
        assert!(analysis.summary.most_sensitive.is_some());
    }

    #[test]
    fn test_nominal_basis_ignores_inflation() {
        let analysis = analyzer(SensitivityGrid::default()).analyze(&base()).unwrap();

        for result in analysis.completed().filter(|r| r.parameter == SensitivityParameter::InflationRate) {
            assert_eq!(result.impact_percent, 0.0);
            assert_eq!(result.risk_level, RiskLevel::Low);
        }
        assert_eq!(analysis.summary.least_sensitive, Some(SensitivityParameter::InflationRate));
    }

    #[test]
    fn test_real_basis_picks_up_inflation() {
        let grid = SensitivityGrid { impact_basis: ImpactBasis::Real, ..Default::default() };
        let analysis = analyzer(grid).analyze(&base()).unwrap();

        let higher_inflation = analysis
            .completed()
            .find(|r| r.parameter == SensitivityParameter::InflationRate && r.variation == 60.0)
            .unwrap();
        assert!(higher_inflation.impact_percent < 0.0);
    }

    #[test]
    fn test_risk_classification() {
        let grid = SensitivityGrid {
            contribution_variations: vec![-5.0, 50.0],
            return_rate_variations: vec![],
            inflation_variations: vec![],
            contribution_growth_variations: vec![],
            ..Default::default()
        };
        // Contributions only: FV scales linearly with the contribution
        let params = ProjectionParameters::new(0.0, 1_000.0, 0.0, 12);
        let analysis = analyzer(grid).analyze(&params).unwrap();

        let levels: Vec<RiskLevel> = analysis.completed().map(|r| r.risk_level).collect();
        assert_eq!(levels, vec![RiskLevel::Low, RiskLevel::High]);
        assert!((analysis.summary.average_impact - 27.5).abs() < 1e-9);
        assert_eq!(analysis.summary.risk_rating, RiskRating::High);
    }

    #[test]
    fn test_failed_point_does_not_abort_batch() {
        let grid = SensitivityGrid {
            return_rate_variations: vec![-500.0, 1.0],
            ..Default::default()
        };
        let analysis = analyzer(grid).analyze(&base()).unwrap();

        assert_eq!(analysis.failed_count(), 1);
        assert!(analysis.completed().count() > 1);
    }

    #[test]
    fn test_invalid_base_is_an_error() {
        let params = ProjectionParameters::new(1_000.0, 100.0, 5.0, 0);
        assert!(analyzer(SensitivityGrid::default()).analyze(&params).is_err());
    }
}
