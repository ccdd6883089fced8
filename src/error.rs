//! Error types for two-body integration.

use thiserror::Error;

/// Errors encountered while validating or integrating a two-body run.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SimError {
    #[error("Invalid configuration: {what}")]
    InvalidConfiguration { what: String },

    #[error("Numerical singularity at t={t} (time point {index}): separation {separation:e}")]
    NumericalSingularity { t: f64, index: usize, separation: f64 },

    #[error("Non-finite state at t={t} (time point {index})")]
    NonFiniteState { t: f64, index: usize },

    #[error("Tolerance failure at t={t} (time point {index}): step size {step:e}")]
    ToleranceFailure { t: f64, index: usize, step: f64 },
}

pub type SimResult<T> = Result<T, SimError>;

impl SimError {
    pub(crate) fn invalid(what: impl Into<String>) -> Self {
        SimError::InvalidConfiguration { what: what.into() }
    }

    /// Simulation time at which the run stopped, when it got that far.
    pub fn time(&self) -> Option<f64> {
        match self {
            SimError::InvalidConfiguration { .. } => None,
            SimError::NumericalSingularity { t, .. }
            | SimError::NonFiniteState { t, .. }
            | SimError::ToleranceFailure { t, .. } => Some(*t),
        }
    }

    /// Index of the requested time point the run was heading for.
    pub fn time_index(&self) -> Option<usize> {
        match self {
            SimError::InvalidConfiguration { .. } => None,
            SimError::NumericalSingularity { index, .. }
            | SimError::NonFiniteState { index, .. }
            | SimError::ToleranceFailure { index, .. } => Some(*index),
        }
    }
}
