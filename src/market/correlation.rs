//! Heuristic parameter correlations for narrative text
//!
//! These coefficients are rules of thumb, not estimates. The Monte Carlo
//! simulator samples every parameter independently and does not read them.

use serde::{Deserialize, Serialize};

use crate::projection::SensitivityParameter;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CorrelationEntry {
    pub first: SensitivityParameter,
    pub second: SensitivityParameter,
    pub coefficient: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorrelationEstimator {
    entries: Vec<CorrelationEntry>,
}

impl CorrelationEstimator {
    pub fn default_table() -> Self {
        use SensitivityParameter::*;
        let entry = |first, second, coefficient| CorrelationEntry { first, second, coefficient };
        Self {
            entries: vec![
                entry(AnnualReturnRate, InflationRate, -0.3),
                entry(InflationRate, ContributionGrowthRate, 0.5),
                entry(AnnualReturnRate, ContributionGrowthRate, 0.2),
                entry(MonthlyContribution, ContributionGrowthRate, 0.1),
            ],
        }
    }

    pub fn entries(&self) -> &[CorrelationEntry] {
        &self.entries
    }

    /// Symmetric lookup; 1 on the diagonal, 0 for unlisted pairs
    pub fn correlation(&self, a: SensitivityParameter, b: SensitivityParameter) -> f64 {
        if a == b {
            return 1.0;
        }
        self.entries
            .iter()
            .find(|e| (e.first == a && e.second == b) || (e.first == b && e.second == a))
            .map(|e| e.coefficient)
            .unwrap_or(0.0)
    }

    /// One sentence per listed pair plus a note on how the simulation samples
    pub fn narrative(&self) -> Vec<String> {
        let mut lines: Vec<String> = self
            .entries
            .iter()
            .map(|e| {
                let direction = if e.coefficient < 0.0 { "against" } else { "with" };
                format!(
                    "{} tends to move {} {} ({} correlation, {:+.2}).",
                    e.first,
                    direction,
                    e.second,
                    strength(e.coefficient),
                    e.coefficient
                )
            })
            .collect();
        lines.push(
            "Monte Carlo trials sample each parameter independently; these correlations are not simulated."
                .to_string(),
        );
        lines
    }
}

impl Default for CorrelationEstimator {
    fn default() -> Self {
        Self::default_table()
    }
}

fn strength(coefficient: f64) -> &'static str {
    match coefficient.abs() {
        c if c >= 0.7 => "strong",
        c if c >= 0.4 => "moderate",
        c if c >= 0.2 => "weak",
        _ => "negligible",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SensitivityParameter::*;

    #[test]
    fn test_lookup_is_symmetric() {
        let table = CorrelationEstimator::default_table();
        assert_eq!(table.correlation(AnnualReturnRate, InflationRate), -0.3);
        assert_eq!(table.correlation(InflationRate, AnnualReturnRate), -0.3);
        assert_eq!(table.correlation(MonthlyContribution, MonthlyContribution), 1.0);
        assert_eq!(table.correlation(MonthlyContribution, InflationRate), 0.0);
    }

    #[test]
    fn test_narrative_flags_independent_sampling() {
        let lines = CorrelationEstimator::default_table().narrative();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].contains("against"));
        assert!(lines.last().unwrap().contains("independently"));
    }
}
