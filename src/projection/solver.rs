//! Goal solvers: required contribution, time to goal and break-even
//!
//! Closed forms are used where they exist; the iterative searches stop at
//! `SolverLimits::max_months` and report non-convergence instead of
//! returning a capped answer.

use log::debug;
use serde::{Deserialize, Serialize};

use crate::error::{ensure_finite, EngineError, Result};
use super::engine::CompoundingCalculator;
use super::params::monthly_rate;

/// Months needed to reach a target
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeToGoal {
    pub months: u32,
    pub years: f64,
}

impl TimeToGoal {
    fn from_months(months: u32) -> Self {
        Self { months, years: months as f64 / 12.0 }
    }
}

/// Month in which cumulative growth first covers cumulative contributions
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BreakEven {
    pub months: u32,
    pub capital: f64,
    pub cumulative_growth: f64,
    pub cumulative_contributions: f64,
}

impl CompoundingCalculator {
    /// Monthly contribution needed to grow `present_value` into `future_value`
    ///
    /// Ordinary-annuity payment `(FV - PV(1+r)^n) / (((1+r)^n - 1) / r)`, or
    /// `(FV - PV) / n` at a zero rate. With `inflation_adjusted` the target is
    /// first inflated by the assumed inflation over the horizon. Floored at
    /// zero when the present value alone reaches the target.
    pub fn calculate_required_contribution(
        &self,
        present_value: f64,
        future_value: f64,
        annual_rate: f64,
        periods: u32,
        inflation_adjusted: bool,
    ) -> Result<f64> {
        if periods == 0 {
            return Err(EngineError::invalid("periods", "must be a positive number of months"));
        }
        ensure_finite("present_value", present_value)?;
        ensure_finite("future_value", future_value)?;
        ensure_finite("annual_rate", annual_rate)?;

        let target = if inflation_adjusted {
            future_value * self.inflation_factor(periods)
        } else {
            future_value
        };

        let r = monthly_rate(annual_rate);
        let n = periods as f64;
        // (1+r)^n - 1 without cancellation for small r
        let growth_m1 = (n * r.ln_1p()).exp_m1();
        let payment = if r == 0.0 || growth_m1 == 0.0 {
            (target - present_value) / n
        } else {
            (target - present_value * (1.0 + growth_m1)) / (growth_m1 / r)
        };

        debug!(
            "required contribution for {:.2} over {} months at {}%: {:.2}",
            target, periods, annual_rate, payment
        );

        Ok(payment.max(0.0))
    }

    /// Months until `present_value` plus contributions reaches `future_value`
    ///
    /// Nominal targets use the closed form
    /// `ln((FV·r + PMT) / (PV·r + PMT)) / ln(1 + r)`; inflation-adjusted
    /// targets are searched month by month against the deflated capital.
    pub fn calculate_time_to_goal(
        &self,
        present_value: f64,
        future_value: f64,
        contribution: f64,
        annual_rate: f64,
        inflation_adjusted: bool,
    ) -> Result<TimeToGoal> {
        ensure_finite("present_value", present_value)?;
        ensure_finite("future_value", future_value)?;
        ensure_finite("contribution", contribution)?;
        ensure_finite("annual_rate", annual_rate)?;

        if present_value >= future_value {
            return Ok(TimeToGoal::from_months(0));
        }

        if inflation_adjusted {
            return self.search_real_time_to_goal(present_value, future_value, contribution, annual_rate);
        }

        let r = monthly_rate(annual_rate);
        let months = if r == 0.0 {
            if contribution <= 0.0 {
                return Err(unreachable_goal("contributions are zero at a zero return"));
            }
            (future_value - present_value) / contribution
        } else {
            let numerator = future_value * r + contribution;
            let denominator = present_value * r + contribution;
            if numerator <= 0.0 || denominator <= 0.0 {
                return Err(unreachable_goal("capital can never reach the target at this rate"));
            }
            // ln_1p keeps precision when r is tiny
            ((future_value - present_value) * r / denominator).ln_1p() / r.ln_1p()
        };

        if !months.is_finite() || months < 0.0 || months > u32::MAX as f64 {
            return Err(unreachable_goal("no finite horizon reaches the target"));
        }

        // Tolerate float noise on exact month boundaries
        let months = (months - 1e-9).ceil().max(0.0) as u32;
        Ok(TimeToGoal::from_months(months))
    }

    fn search_real_time_to_goal(
        &self,
        present_value: f64,
        future_value: f64,
        contribution: f64,
        annual_rate: f64,
    ) -> Result<TimeToGoal> {
        let r = monthly_rate(annual_rate);
        let inflation = 1.0 + monthly_rate(self.limits.assumed_inflation_rate);
        let mut capital = present_value;
        let mut deflator = 1.0;

        for month in 1..=self.limits.max_months {
            capital += capital * r + contribution;
            deflator *= inflation;
            if capital / deflator >= future_value {
                return Ok(TimeToGoal::from_months(month));
            }
        }

        Err(EngineError::non_convergence(
            "time_to_goal",
            format!(
                "inflation-adjusted target {:.2} not reached within {} months",
                future_value, self.limits.max_months
            ),
        ))
    }

    /// First month where cumulative growth is at least cumulative contributions
    ///
    /// Growth must be strictly positive, so a zero-return account never breaks
    /// even and exhausts the cap.
    pub fn calculate_break_even(
        &self,
        present_value: f64,
        contribution: f64,
        annual_rate: f64,
    ) -> Result<BreakEven> {
        ensure_finite("present_value", present_value)?;
        ensure_finite("contribution", contribution)?;
        ensure_finite("annual_rate", annual_rate)?;
        if present_value < 0.0 {
            return Err(EngineError::invalid("present_value", "must not be negative"));
        }
        if contribution < 0.0 {
            return Err(EngineError::invalid("contribution", "must not be negative"));
        }

        let r = monthly_rate(annual_rate);
        let mut capital = present_value;
        let mut cumulative_growth = 0.0;
        let mut cumulative_contributions = 0.0;

        for month in 1..=self.limits.max_months {
            let growth = capital * r;
            capital += contribution + growth;
            cumulative_growth += growth;
            cumulative_contributions += contribution;

            if cumulative_growth > 0.0 && cumulative_growth >= cumulative_contributions {
                return Ok(BreakEven {
                    months: month,
                    capital,
                    cumulative_growth,
                    cumulative_contributions,
                });
            }
        }

        Err(EngineError::non_convergence(
            "break_even",
            format!(
                "growth {:.2} still below contributions {:.2} after {} months",
                cumulative_growth, cumulative_contributions, self.limits.max_months
            ),
        ))
    }

    fn inflation_factor(&self, periods: u32) -> f64 {
        (1.0 + monthly_rate(self.limits.assumed_inflation_rate)).powi(periods as i32)
    }
}

fn unreachable_goal(detail: &str) -> EngineError {
    EngineError::non_convergence("time_to_goal", detail)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assumptions::SolverLimits;
    use crate::projection::ProjectionParameters;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn calculator() -> CompoundingCalculator {
        CompoundingCalculator::new(SolverLimits::default())
    }

    #[test]
    fn test_required_contribution_round_trip() {
        let calc = calculator();
        let payment = calc
            .calculate_required_contribution(10_000.0, 250_000.0, 7.0, 180, false)
            .unwrap();

        let params = ProjectionParameters::new(10_000.0, payment, 7.0, 180);
        let result = calc.calculate_future_value(&params).unwrap();
        assert_relative_eq!(result.future_value, 250_000.0, max_relative = 1e-9);
    }

    #[test]
    fn test_required_contribution_zero_rate_is_linear() {
        let payment = calculator()
            .calculate_required_contribution(1_000.0, 13_000.0, 0.0, 24, false)
            .unwrap();
        assert_eq!(payment, 500.0);
    }

    #[test]
    fn test_required_contribution_near_zero_rate_is_finite() {
        let calc = calculator();
        for rate in [1e-15, 1e-13, 1e-11, 1e-9] {
            let payment = calc
                .calculate_required_contribution(1_000.0, 13_000.0, rate, 24, false)
                .unwrap();
            assert!(payment.is_finite(), "rate {} gave {}", rate, payment);
            assert!((payment - 500.0).abs() < 1e-6, "rate {} gave {}", rate, payment);
        }
    }

    #[test]
    fn test_required_contribution_inflation_adjusted_is_higher() {
        let calc = calculator();
        let nominal = calc.calculate_required_contribution(0.0, 100_000.0, 5.0, 120, false).unwrap();
        let real = calc.calculate_required_contribution(0.0, 100_000.0, 5.0, 120, true).unwrap();
        assert!(real > nominal);

        // Feeding the inflated target back reproduces it nominally
        let inflated_target = 100_000.0 * (1.0 + 0.03 / 12.0_f64).powi(120);
        let result = calc
            .calculate_future_value(&ProjectionParameters::new(0.0, real, 5.0, 120))
            .unwrap();
        assert_relative_eq!(result.future_value, inflated_target, max_relative = 1e-9);
    }

    #[test]
    fn test_required_contribution_floored_when_already_funded() {
        let payment = calculator()
            .calculate_required_contribution(500_000.0, 100_000.0, 5.0, 60, false)
            .unwrap();
        assert_eq!(payment, 0.0);
    }

    #[test]
    fn test_time_to_goal_closed_form() {
        // 1,000/month at 0% to 12,000 takes exactly a year
        let time = calculator().calculate_time_to_goal(0.0, 12_000.0, 1_000.0, 0.0, false).unwrap();
        assert_eq!(time.months, 12);
        assert_eq!(time.years, 1.0);

        let time = calculator().calculate_time_to_goal(0.0, 12_000.0, 1_000.0, 6.0, false).unwrap();
        assert!(time.months <= 12);
    }

    #[test]
    fn test_time_to_goal_matches_projection() {
        let calc = calculator();
        let time = calc.calculate_time_to_goal(5_000.0, 50_000.0, 400.0, 8.0, false).unwrap();

        let reached = calc
            .project(&ProjectionParameters::new(5_000.0, 400.0, 8.0, time.months), false)
            .unwrap();
        let short = calc
            .project(&ProjectionParameters::new(5_000.0, 400.0, 8.0, time.months - 1), false)
            .unwrap();
        assert!(reached.future_value >= 50_000.0);
        assert!(short.future_value < 50_000.0);
    }

    #[test]
    fn test_time_to_goal_already_reached() {
        let time = calculator().calculate_time_to_goal(10_000.0, 5_000.0, 0.0, 5.0, true).unwrap();
        assert_eq!(time.months, 0);
    }

    #[test]
    fn test_time_to_goal_unreachable() {
        let err = calculator().calculate_time_to_goal(0.0, 1_000.0, 0.0, 0.0, false).unwrap_err();
        assert!(matches!(err, EngineError::NonConvergence { solver: "time_to_goal", .. }));
    }

    #[test]
    fn test_time_to_goal_inflation_adjusted_takes_longer() {
        let calc = calculator();
        let nominal = calc.calculate_time_to_goal(0.0, 50_000.0, 500.0, 6.0, false).unwrap();
        let real = calc.calculate_time_to_goal(0.0, 50_000.0, 500.0, 6.0, true).unwrap();
        assert!(real.months > nominal.months);
    }

    #[test]
    fn test_time_to_goal_inflation_adjusted_hits_cap() {
        // Returns below inflation with no contributions never catch up
        let err = calculator().calculate_time_to_goal(1_000.0, 2_000.0, 0.0, 1.0, true).unwrap_err();
        assert!(matches!(err, EngineError::NonConvergence { .. }));
    }

    #[test]
    fn test_break_even_zero_return_never_converges() {
        let err = calculator().calculate_break_even(0.0, 500.0, 0.0).unwrap_err();
        assert!(matches!(err, EngineError::NonConvergence { solver: "break_even", .. }));
    }

    #[test]
    fn test_break_even_found() {
        let result = calculator().calculate_break_even(0.0, 500.0, 10.0).unwrap();
        assert!(result.months > 12 && result.months < 600);
        assert!(result.cumulative_growth >= result.cumulative_contributions);
    }

    #[test]
    fn test_break_even_respects_configured_cap() {
        let limits = SolverLimits { max_months: 12, ..Default::default() };
        let err = CompoundingCalculator::new(limits).calculate_break_even(0.0, 500.0, 10.0).unwrap_err();
        assert!(matches!(err, EngineError::NonConvergence { .. }));
    }

    proptest! {
        #[test]
        fn prop_time_to_goal_non_increasing_in_contribution(
            pv in 0.0..10_000.0f64,
            target in 20_000.0..500_000.0f64,
            contribution in 50.0..5_000.0f64,
            extra in 0.0..1_000.0f64,
            rate in 0.0..20.0f64,
        ) {
            let calc = calculator();
            let low = calc.calculate_time_to_goal(pv, target, contribution, rate, false).unwrap();
            let high = calc.calculate_time_to_goal(pv, target, contribution + extra, rate, false).unwrap();
            prop_assert!(high.months <= low.months);
        }

        #[test]
        fn prop_time_to_goal_non_increasing_in_rate(
            pv in 0.0..10_000.0f64,
            target in 20_000.0..500_000.0f64,
            contribution in 50.0..5_000.0f64,
            rate in 0.0..20.0f64,
            bump in 0.0..5.0f64,
        ) {
            let calc = calculator();
            let low = calc.calculate_time_to_goal(pv, target, contribution, rate, false).unwrap();
            let high = calc.calculate_time_to_goal(pv, target, contribution, rate + bump, false).unwrap();
            prop_assert!(high.months <= low.months);
        }
    }
}
