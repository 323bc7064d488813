//! Iteration caps and tolerances for the iterative solvers

use serde::{Deserialize, Serialize};

/// Limits shared by the calculator's solvers
///
/// The 600-month cap encodes a 50-year maximum horizon. Break-even and the
/// inflation-adjusted time-to-goal search stop there and report non-convergence.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SolverLimits {
    /// Maximum months simulated by month-by-month searches
    pub max_months: u32,

    /// Maximum Newton-Raphson steps for IRR
    pub irr_max_iterations: u32,

    /// Convergence tolerance for IRR (on both NPV and step size)
    pub irr_tolerance: f64,

    /// Starting guess for IRR, percent
    pub irr_initial_rate: f64,

    /// Lower bound for the IRR iterate, percent
    pub irr_rate_floor: f64,

    /// Annual inflation (percent) used by inflation-adjusted solvers and
    /// as the default for goals that carry no inflation assumption
    pub assumed_inflation_rate: f64,
}

impl Default for SolverLimits {
    fn default() -> Self {
        Self {
            max_months: 600,
            irr_max_iterations: 1000,
            irr_tolerance: 1e-4,
            irr_initial_rate: 10.0,
            irr_rate_floor: -99.0,
            assumed_inflation_rate: 3.0,
        }
    }
}
