//! Internal Rate of Return (IRR) calculation
//!
//! Newton-Raphson on the NPV of an initial outlay followed by one cash flow
//! per period. Failure to converge is an error, never an approximation.

use log::debug;

use crate::assumptions::SolverLimits;
use crate::error::{ensure_finite, EngineError, Result};
use super::engine::CompoundingCalculator;

/// Calculate the IRR of `initial_investment` paid now and `cash_flows`
/// received at the end of periods 1, 2, ...
///
/// # Returns
/// * Periodic IRR as a percentage (e.g. 10.0 for 10%)
pub fn calculate_irr(initial_investment: f64, cash_flows: &[f64], limits: &SolverLimits) -> Result<f64> {
    ensure_finite("initial_investment", initial_investment)?;
    if initial_investment <= 0.0 {
        return Err(EngineError::invalid("initial_investment", "must be positive"));
    }
    if cash_flows.is_empty() {
        return Err(EngineError::invalid("cash_flows", "at least one cash flow is required"));
    }
    for &cf in cash_flows {
        ensure_finite("cash_flows", cf)?;
    }

    let floor = limits.irr_rate_floor / 100.0;
    let tolerance = limits.irr_tolerance;
    let mut rate = limits.irr_initial_rate / 100.0;

    for iteration in 0..limits.irr_max_iterations {
        let (npv, dnpv) = npv_and_derivative(initial_investment, cash_flows, rate);

        if npv.abs() < tolerance {
            debug!("irr converged on npv after {} iterations: {:.6}", iteration, rate);
            return Ok(rate * 100.0);
        }

        if dnpv.abs() < 1e-20 {
            return Err(EngineError::non_convergence(
                "irr",
                format!("flat NPV derivative at rate {:.6}", rate),
            ));
        }

        let step = rate - npv / dnpv;
        if step < floor && rate <= floor {
            return Err(EngineError::non_convergence(
                "irr",
                format!("root lies below the {}% rate floor", limits.irr_rate_floor),
            ));
        }

        // Bound the rate above total loss
        let new_rate = step.max(floor);

        if (new_rate - rate).abs() < tolerance {
            debug!("irr converged on step after {} iterations: {:.6}", iteration, new_rate);
            return Ok(new_rate * 100.0);
        }

        rate = new_rate;
    }

    Err(EngineError::non_convergence(
        "irr",
        format!("no root within {} iterations", limits.irr_max_iterations),
    ))
}

/// Calculate NPV and its derivative with respect to rate
fn npv_and_derivative(initial_investment: f64, cash_flows: &[f64], rate: f64) -> (f64, f64) {
    let mut npv = -initial_investment;
    let mut dnpv = 0.0;

    for (i, &cf) in cash_flows.iter().enumerate() {
        let t = (i + 1) as i32;
        npv += cf / (1.0 + rate).powi(t);
        dnpv -= t as f64 * cf / (1.0 + rate).powi(t + 1);
    }

    (npv, dnpv)
}

impl CompoundingCalculator {
    /// IRR using this calculator's solver limits
    pub fn calculate_irr(&self, initial_investment: f64, cash_flows: &[f64]) -> Result<f64> {
        calculate_irr(initial_investment, cash_flows, &self.limits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_irr() {
        // Investment of $1000, returns $1100 after one period
        let irr = calculate_irr(1000.0, &[1100.0], &SolverLimits::default()).unwrap();
        assert!((irr - 10.0).abs() < 0.01, "Expected ~10% IRR, got {}", irr);
    }

    #[test]
    fn test_level_cashflows() {
        // 1000 returning 300 a period for five periods: ~15.24%
        let irr = calculate_irr(1000.0, &[300.0; 5], &SolverLimits::default()).unwrap();
        assert!((irr - 15.24).abs() < 0.01, "got {}", irr);
    }

    #[test]
    fn test_total_loss_hits_floor() {
        // Getting back 1 of 1000 is close to -99.9%, below the -99% floor
        let result = calculate_irr(1000.0, &[1.0], &SolverLimits::default());
        assert!(matches!(result, Err(EngineError::NonConvergence { solver: "irr", .. })));
    }

    #[test]
    fn test_iteration_cap_is_configurable() {
        let limits = SolverLimits { irr_max_iterations: 1, ..Default::default() };
        let result = calculate_irr(1000.0, &[300.0; 5], &limits);
        assert!(matches!(result, Err(EngineError::NonConvergence { .. })));
    }

    #[test]
    fn test_invalid_inputs() {
        let limits = SolverLimits::default();
        assert!(calculate_irr(0.0, &[100.0], &limits).is_err());
        assert!(calculate_irr(100.0, &[], &limits).is_err());
        assert!(calculate_irr(100.0, &[f64::NAN], &limits).is_err());
    }
}
