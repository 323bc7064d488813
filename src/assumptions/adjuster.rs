//! Thresholds and multipliers for the dynamic rate adjuster

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// One adjustment rule. The order rules run in changes the compounded result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentRule {
    /// Partial mean-reversion toward observed historical performance
    Performance,
    /// Haircut under elevated volatility
    Volatility,
    /// Bullish / bearish regime multiplier
    Regime,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdjusterRules {
    /// Rule application order; clamping always runs last
    pub order: Vec<AdjustmentRule>,

    /// Confidence score before any rule runs (0-100)
    pub base_confidence: f64,

    // Performance rule
    pub performance_gap_threshold: f64,
    pub performance_weight: f64,
    /// Confidence points lost per percentage point of gap
    pub confidence_penalty_per_point: f64,

    // Volatility rule
    pub volatility_threshold: f64,
    pub volatility_rate_multiplier: f64,
    pub volatility_confidence_multiplier: f64,
    /// Volatility assumed when the market context omits it
    pub neutral_volatility: f64,

    // Regime rule
    pub bullish_rate_multiplier: f64,
    pub bullish_confidence_multiplier: f64,
    pub bullish_confidence_cap: f64,
    pub bearish_rate_multiplier: f64,
    pub bearish_confidence_multiplier: f64,

    // Final clamp, percent
    pub min_rate: f64,
    pub max_rate: f64,
}

impl Default for AdjusterRules {
    fn default() -> Self {
        Self {
            order: vec![
                AdjustmentRule::Performance,
                AdjustmentRule::Volatility,
                AdjustmentRule::Regime,
            ],
            base_confidence: 80.0,
            performance_gap_threshold: 2.0,
            performance_weight: 0.6,
            confidence_penalty_per_point: 2.0,
            volatility_threshold: 25.0,
            volatility_rate_multiplier: 0.9,
            volatility_confidence_multiplier: 0.85,
            neutral_volatility: 15.0,
            bullish_rate_multiplier: 1.10,
            bullish_confidence_multiplier: 1.10,
            bullish_confidence_cap: 95.0,
            bearish_rate_multiplier: 0.85,
            bearish_confidence_multiplier: 0.80,
            min_rate: -50.0,
            max_rate: 50.0,
        }
    }
}

impl AdjusterRules {
    /// Each rule may appear at most once in `order`
    pub fn validate(&self) -> Result<()> {
        for (i, rule) in self.order.iter().enumerate() {
            if self.order[..i].contains(rule) {
                return Err(EngineError::invalid(
                    "order",
                    format!("adjustment rule {:?} is listed more than once", rule),
                ));
            }
        }
        Ok(())
    }
}
