//! Goal Projection - compounding projections and risk analysis for savings goals
//!
//! This library provides:
//! - Monthly capital ledger with contributions, dividends and inflation
//! - Goal solvers (required contribution, time to goal, break-even, IRR)
//! - Dynamic return-rate adjustment from market context
//! - Named scenarios, sensitivity sweeps and stress scenarios
//! - Seedable Monte Carlo simulation with percentile and tail-risk metrics

pub mod error;
pub mod assumptions;
pub mod projection;
pub mod market;
pub mod risk;
pub mod scenario;
pub mod goal;

// Re-export commonly used types
pub use error::{EngineError, Outcome, Result};
pub use assumptions::{EngineConfig, SolverLimits, StressLibrary};
pub use projection::{CompoundingCalculator, ProjectionParameters, ProjectionResult, MonthlyProjectionRecord};
pub use market::{CorrelationEstimator, DynamicRateAdjuster, MarketCondition, MarketContext};
pub use risk::{MonteCarloSimulator, SeededRandom, SensitivityAnalyzer, StressTester};
pub use scenario::{ScenarioGenerator, ScenarioKind};
pub use goal::{FixedCapital, Goal, GoalAnalysis, GoalAnalyzer, JsonLinesSink, MemorySink, StaticMarket};
