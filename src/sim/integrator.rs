//! Common interface of the trajectory integrators.

use crate::dynamics::state::{State, SystemParams, Trajectory};
use crate::error::SimResult;

/// Work counters for one integration run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntegrationStats {
    /// Field model evaluations.
    pub rhs_evals: u64,
    pub accepted_steps: u64,
    /// Always zero for fixed-step methods.
    pub rejected_steps: u64,
}

/// Trajectory sampled on the requested grid plus the work it took.
#[derive(Debug, Clone, PartialEq)]
pub struct Solution {
    pub trajectory: Trajectory,
    pub stats: IntegrationStats,
}

/// Advances an initial state across a caller-supplied time grid.
pub trait Integrator {
    /// Integrate from `initial` at `times[0]`, producing one sample per
    /// entry of `times`.
    fn integrate(
        &self,
        params: &SystemParams,
        times: &[f64],
        initial: &State,
    ) -> SimResult<Solution>;
}
