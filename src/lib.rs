//! Planar two-body gravitational integration.
//!
//! The state of both bodies lives in one 8-component vector ordered
//! `(x1, vx1, x2, vx2, y1, vy1, y2, vy2)`. [`physics::gravity`] evaluates its
//! time derivative; [`sim`] advances it across a caller-supplied time grid
//! with either an adaptive Dormand-Prince 5(4) solver or a fixed-step
//! leapfrog; [`orbital`] checks conserved quantities along the result.

pub mod dynamics;
pub mod error;
pub mod orbital;
pub mod physics;
pub mod sim;

pub use error::{SimError, SimResult};

pub mod integrator {
    pub use crate::sim::adaptive::{integrate_adaptive, AdaptiveOptions};
    pub use crate::sim::leapfrog::{integrate_leapfrog, LeapfrogScheme};
}

pub mod types {
    pub use crate::dynamics::state::{
        Body, BodyState, State, SystemParams, Trajectory, STATE_DIM, VX1, VX2, VY1, VY2, X1, X2,
        Y1, Y2,
    };
}
