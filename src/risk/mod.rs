//! Risk analysis: sensitivity sweeps, stress scenarios, Monte Carlo simulation

mod monte_carlo;
mod random;
mod sensitivity;
mod stress;

pub use monte_carlo::{MonteCarloResult, MonteCarloRun, MonteCarloSimulator, PercentileLadder, VolatilityMetrics};
pub use random::{RandomSource, SeededRandom};
pub use sensitivity::{
    RiskLevel, RiskRating, SensitivityAnalysis, SensitivityAnalyzer, SensitivityResult, SensitivitySummary,
};
pub use stress::{StressOutcome, StressReport, StressTester};
