//! Goal orchestration: provider seams, result sinks and the end-to-end analyzer

mod analyzer;
mod providers;
mod sink;

pub use analyzer::{GoalAnalysis, GoalAnalyzer};
pub use providers::{CapitalProvider, FixedCapital, Goal, MarketContextProvider, StaticMarket};
pub use sink::{AnalysisKey, JsonLinesSink, MemorySink, ProjectionSink};
