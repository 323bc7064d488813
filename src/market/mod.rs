//! Market context: dynamic rate adjustment and heuristic correlations

mod adjuster;
mod correlation;

pub use adjuster::{DynamicAdjustment, DynamicRateAdjuster, MarketCondition, MarketContext};
pub use correlation::{CorrelationEntry, CorrelationEstimator};
