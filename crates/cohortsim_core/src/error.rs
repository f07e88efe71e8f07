//! Error types for model construction and evaluation
//!
//! Every stage of the pipeline validates its inputs at its own boundary and
//! returns the first violation it observes. Numerical drift is the one
//! condition that is normally reported rather than raised; see
//! [`crate::model::DriftReport`].

use thiserror::Error;

/// Errors raised while building or evaluating a cohort model
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// A scalar input is outside its admissible range
    #[error("invalid parameter {name} = {value}: {reason}")]
    InvalidParameter {
        name: String,
        value: f64,
        reason: String,
    },

    /// A matrix or distribution does not have the expected shape
    #[error("invalid dimension for {context}: expected {expected}, found {found}")]
    InvalidDimension {
        context: &'static str,
        expected: usize,
        found: usize,
    },

    /// Probability mass left the unit sum beyond the configured tolerance
    #[error("probability mass drifted to {mass} at cycle {cycle}")]
    NumericalDrift { cycle: usize, mass: f64 },

    /// A reward or weight vector does not match the trace it is applied to
    #[error("{what} has length {found}, expected {expected}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },

    /// Sensitivity target that does not name a model parameter
    #[error("unknown parameter: {0}")]
    UnknownParameter(String),

    /// State name not present in the state space
    #[error("unknown state: {0}")]
    UnknownState(String),

    /// Sensitivity analysis was cancelled through its progress handle
    #[error("sensitivity analysis cancelled")]
    Cancelled,
}

impl ModelError {
    pub(crate) fn invalid(name: impl Into<String>, value: f64, reason: impl Into<String>) -> Self {
        ModelError::InvalidParameter {
            name: name.into(),
            value,
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, ModelError>;

/// Check that `value` is a finite probability.
pub(crate) fn check_probability(name: &str, value: f64) -> Result<()> {
    if !value.is_finite() || !(0.0..=1.0).contains(&value) {
        return Err(ModelError::invalid(name, value, "probability must be in [0, 1]"));
    }
    Ok(())
}
