//! Compounding calculator: month-by-month capital ledger and future values

use log::debug;

use crate::assumptions::{ImpactBasis, SolverLimits};
use crate::error::{Outcome, Result};
use super::ledger::ProjectionResult;
use super::params::{monthly_rate, ProjectionParameters};
use super::perturb::{SensitivityParameter, SensitivityPoint};
use super::state::ProjectionState;

/// Stateless compounding calculator
///
/// Holds only the solver limits; every call builds its own state, so one
/// calculator can be shared freely across threads.
#[derive(Debug, Clone, Copy, Default)]
pub struct CompoundingCalculator {
    pub(crate) limits: SolverLimits,
}

impl CompoundingCalculator {
    pub fn new(limits: SolverLimits) -> Self {
        Self { limits }
    }

    pub fn limits(&self) -> &SolverLimits {
        &self.limits
    }

    /// Project with the full monthly ledger
    pub fn calculate_future_value(&self, params: &ProjectionParameters) -> Result<ProjectionResult> {
        self.project(params, true)
    }

    /// Run a projection; `detailed` controls whether the monthly ledger is kept
    pub fn project(&self, params: &ProjectionParameters, detailed: bool) -> Result<ProjectionResult> {
        params.validate()?;

        let mut state = ProjectionState::from_params(params);
        let mut ledger = if detailed {
            Vec::with_capacity(params.periods as usize)
        } else {
            Vec::new()
        };

        for _month in 1..=params.periods {
            let row = state.advance_month();
            if detailed {
                ledger.push(row);
            }
        }

        let future_value = state.capital;
        let real_future_value = state.real_value();
        let invested = params.present_value + state.cumulative_contributions;

        let result = ProjectionResult {
            future_value,
            real_future_value,
            total_contributions: state.cumulative_contributions,
            total_growth: state.total_growth,
            total_dividends: state.total_dividends,
            effective_annual_return: annualized_return(future_value, invested, params.periods),
            real_annual_return: annualized_return(real_future_value, invested, params.periods),
            periods: params.periods,
            ledger,
        };

        debug!(
            "projected {} months: fv={:.2} real={:.2} contributions={:.2}",
            params.periods, result.future_value, result.real_future_value, result.total_contributions
        );

        Ok(result)
    }

    /// Deflate a nominal amount by `months` of inflation at an annual percentage rate
    pub fn real_value(&self, nominal: f64, inflation_rate: f64, months: u32) -> f64 {
        nominal / (1.0 + monthly_rate(inflation_rate)).powi(months as i32)
    }

    /// Perturb one parameter across `variations` and recompute each point
    ///
    /// The base run must succeed; an individual point that fails validation
    /// is labeled failed and the remaining points still run.
    pub fn perform_sensitivity_analysis(
        &self,
        base: &ProjectionParameters,
        parameter: SensitivityParameter,
        variations: &[f64],
        basis: ImpactBasis,
    ) -> Result<Vec<Outcome<SensitivityPoint>>> {
        let base_result = self.project(base, false)?;
        let base_value = basis.pick(&base_result);
        let original_value = parameter.current(base);

        let points = variations
            .iter()
            .map(|&variation| {
                let perturbed = parameter.perturb(base, variation);
                let outcome = self.project(&perturbed, false).map(|result| {
                    let value = basis.pick(&result);
                    SensitivityPoint {
                        parameter,
                        variation,
                        original_value,
                        new_value: parameter.current(&perturbed),
                        future_value: result.future_value,
                        real_future_value: result.real_future_value,
                        impact_percent: impact_percent(base_value, value),
                    }
                });
                Outcome::from(outcome)
            })
            .collect();

        Ok(points)
    }
}

impl ImpactBasis {
    fn pick(&self, result: &ProjectionResult) -> f64 {
        match self {
            ImpactBasis::Nominal => result.future_value,
            ImpactBasis::Real => result.real_future_value,
        }
    }
}

/// CAGR from `value = base * (1 + r)^years`, percent. Zero when undefined.
pub fn annualized_return(value: f64, base: f64, periods: u32) -> f64 {
    if base <= 0.0 || value <= 0.0 || periods == 0 {
        return 0.0;
    }
    let years = periods as f64 / 12.0;
    ((value / base).powf(1.0 / years) - 1.0) * 100.0
}

/// Percent change from `base` to `value`; zero when the base is zero
pub fn impact_percent(base: f64, value: f64) -> f64 {
    if base.abs() < f64::EPSILON {
        0.0
    } else {
        (value - base) / base * 100.0
    }
}
