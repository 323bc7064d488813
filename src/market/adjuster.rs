//! Dynamic rate adjuster
//!
//! Recalibrates a goal's expected return against observed performance,
//! volatility and market regime. Rules run in the configured order (default
//! performance → volatility → regime) and the result is clamped last.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::assumptions::{AdjusterRules, AdjustmentRule};
use crate::error::{ensure_finite, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MarketCondition {
    Bullish,
    #[default]
    Neutral,
    Bearish,
}

impl MarketCondition {
    /// Classify a free-form regime label; anything unrecognized is neutral
    pub fn classify(label: &str) -> Self {
        let label = label.trim().to_ascii_lowercase();
        if ["bull", "expansion", "uptrend", "rally"].iter().any(|k| label.contains(k)) {
            MarketCondition::Bullish
        } else if ["bear", "recession", "downtrend", "crash", "contraction"].iter().any(|k| label.contains(k)) {
            MarketCondition::Bearish
        } else {
            MarketCondition::Neutral
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MarketCondition::Bullish => "BULLISH",
            MarketCondition::Neutral => "NEUTRAL",
            MarketCondition::Bearish => "BEARISH",
        }
    }
}

/// Externally observed market inputs; each is best-effort
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MarketContext {
    /// Observed annual performance, percent
    #[serde(default)]
    pub historical_performance: Option<f64>,
    #[serde(default)]
    pub volatility_factor: Option<f64>,
    #[serde(default)]
    pub market_condition: Option<MarketCondition>,
}

impl MarketContext {
    /// Context with every input absent
    pub fn neutral() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicAdjustment {
    pub original_rate: f64,
    pub adjusted_rate: f64,
    pub rationale: String,
    pub historical_performance: f64,
    pub volatility_factor: f64,
    pub market_condition: MarketCondition,
    /// 0-100
    pub confidence_score: f64,
    /// Rules that changed the rate, in application order
    pub triggered_rules: Vec<AdjustmentRule>,
}

#[derive(Debug, Clone, Default)]
pub struct DynamicRateAdjuster {
    rules: AdjusterRules,
}

impl DynamicRateAdjuster {
    pub fn new(rules: AdjusterRules) -> Self {
        Self { rules }
    }

    pub fn adjust(&self, expected_rate: f64, context: &MarketContext) -> Result<DynamicAdjustment> {
        ensure_finite("expected_return_rate", expected_rate)?;
        self.rules.validate()?;
        let rules = &self.rules;

        let historical = finite_or(context.historical_performance, expected_rate, "historical_performance");
        let volatility = finite_or(context.volatility_factor, rules.neutral_volatility, "volatility_factor");
        let condition = context.market_condition.unwrap_or_default();

        let mut rate = expected_rate;
        let mut confidence = rules.base_confidence;
        let mut clauses: Vec<String> = Vec::new();
        let mut triggered = Vec::new();

        for rule in &rules.order {
            let fired = match rule {
                AdjustmentRule::Performance => {
                    let gap = historical - expected_rate;
                    if gap.abs() > rules.performance_gap_threshold {
                        rate += rules.performance_weight * gap;
                        confidence = (confidence - rules.confidence_penalty_per_point * gap.abs()).max(0.0);
                        clauses.push(format!(
                            "Historical performance of {:.2}% differs from the expected {:.2}% by {:+.2} pp; rate moved {:.0}% of the gap.",
                            historical,
                            expected_rate,
                            gap,
                            rules.performance_weight * 100.0
                        ));
                        true
                    } else {
                        false
                    }
                }
                AdjustmentRule::Volatility => {
                    if volatility > rules.volatility_threshold {
                        rate *= rules.volatility_rate_multiplier;
                        confidence *= rules.volatility_confidence_multiplier;
                        clauses.push(format!(
                            "Volatility factor {:.1} exceeds {:.1}; rate scaled by {:.2}.",
                            volatility, rules.volatility_threshold, rules.volatility_rate_multiplier
                        ));
                        true
                    } else {
                        false
                    }
                }
                AdjustmentRule::Regime => match condition {
                    MarketCondition::Bullish => {
                        rate *= rules.bullish_rate_multiplier;
                        confidence = (confidence * rules.bullish_confidence_multiplier)
                            .min(rules.bullish_confidence_cap);
                        clauses.push(format!(
                            "Bullish market; rate scaled by {:.2}.",
                            rules.bullish_rate_multiplier
                        ));
                        true
                    }
                    MarketCondition::Bearish => {
                        rate *= rules.bearish_rate_multiplier;
                        confidence *= rules.bearish_confidence_multiplier;
                        clauses.push(format!(
                            "Bearish market; rate scaled by {:.2}.",
                            rules.bearish_rate_multiplier
                        ));
                        true
                    }
                    MarketCondition::Neutral => false,
                },
            };
            if fired {
                triggered.push(*rule);
            }
        }

        let clamped = rate.clamp(rules.min_rate, rules.max_rate);
        if clamped != rate {
            clauses.push(format!(
                "Rate {:.2}% clamped to the [{:.0}%, {:.0}%] range.",
                rate, rules.min_rate, rules.max_rate
            ));
        }

        if clauses.is_empty() {
            clauses.push("Market context is consistent with the expected rate; no adjustment applied.".to_string());
        }

        let adjustment = DynamicAdjustment {
            original_rate: expected_rate,
            adjusted_rate: clamped,
            rationale: clauses.join(" "),
            historical_performance: historical,
            volatility_factor: volatility,
            market_condition: condition,
            confidence_score: confidence.clamp(0.0, 100.0),
            triggered_rules: triggered,
        };

        debug!(
            "rate adjusted {:.2}% -> {:.2}% (confidence {:.1})",
            adjustment.original_rate, adjustment.adjusted_rate, adjustment.confidence_score
        );

        Ok(adjustment)
    }
}

fn finite_or(value: Option<f64>, fallback: f64, name: &str) -> f64 {
    match value {
        Some(v) if v.is_finite() => v,
        Some(v) => {
            warn!("ignoring non-finite {} ({}); using {}", name, v, fallback);
            fallback
        }
        None => fallback,
    }
}
