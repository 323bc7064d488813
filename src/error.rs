//! Error types for the projection engine

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised by the calculator, solvers and analyzers
#[derive(Debug, Error, Clone, PartialEq)]
pub enum EngineError {
    /// Input rejected before any computation ran
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter {
        name: &'static str,
        reason: String,
    },

    /// An iterative solver exhausted its cap or the target is unreachable
    #[error("{solver} did not converge: {detail}")]
    NonConvergence {
        solver: &'static str,
        detail: String,
    },

    /// An upstream provider failed or returned nothing
    #[error("Upstream data unavailable from {provider}: {reason}")]
    UpstreamDataUnavailable {
        provider: &'static str,
        reason: String,
    },
}

impl EngineError {
    pub fn invalid(name: &'static str, reason: impl Into<String>) -> Self {
        EngineError::InvalidParameter { name, reason: reason.into() }
    }

    pub fn non_convergence(solver: &'static str, detail: impl Into<String>) -> Self {
        EngineError::NonConvergence { solver, detail: detail.into() }
    }

    pub fn unavailable(provider: &'static str, reason: impl Into<String>) -> Self {
        EngineError::UpstreamDataUnavailable { provider, reason: reason.into() }
    }
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// Reject NaN and infinite inputs
pub(crate) fn ensure_finite(name: &'static str, value: f64) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(EngineError::invalid(name, format!("must be a finite number, got {}", value)))
    }
}

/// Outcome of one item in a batch (stress scenario, sensitivity point)
///
/// A failed item carries its reason and never aborts the rest of the batch.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Outcome<T> {
    Completed(T),
    Failed { reason: String },
}

impl<T> Outcome<T> {
    pub fn completed(&self) -> Option<&T> {
        match self {
            Outcome::Completed(value) => Some(value),
            Outcome::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Outcome::Failed { .. })
    }
}

impl<T> From<Result<T>> for Outcome<T> {
    fn from(result: Result<T>) -> Self {
        match result {
            Ok(value) => Outcome::Completed(value),
            Err(err) => Outcome::Failed { reason: err.to_string() },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_from_error_keeps_reason() {
        let outcome: Outcome<f64> = Err(EngineError::invalid("periods", "must be at least 1")).into();
        assert!(outcome.is_failed());
        match outcome {
            Outcome::Failed { reason } => assert!(reason.contains("periods")),
            Outcome::Completed(_) => panic!("expected failure"),
        }
    }

    #[test]
    fn test_outcome_serializes_scalars() {
        let value = serde_json::to_value(Outcome::Completed(12.5)).unwrap();
        assert_eq!(value["status"], "completed");
        assert_eq!(value["value"], 12.5);

        let failed: Outcome<f64> = Outcome::Failed { reason: "no".to_string() };
        let value = serde_json::to_value(failed).unwrap();
        assert_eq!(value["status"], "failed");
        assert_eq!(value["value"]["reason"], "no");
    }

    #[test]
    fn test_ensure_finite_rejects_nan() {
        assert!(ensure_finite("annual_return_rate", f64::NAN).is_err());
        assert!(ensure_finite("annual_return_rate", 7.5).is_ok());
    }
}
