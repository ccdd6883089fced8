use nalgebra::{SVector, Vector2};

use crate::error::{SimError, SimResult};

// ---------------------------------------------------------------------------
// State vector layout
// ---------------------------------------------------------------------------

/// Number of scalar components in the system state.
pub const STATE_DIM: usize = 8;

pub const X1: usize = 0;
pub const VX1: usize = 1;
pub const X2: usize = 2;
pub const VX2: usize = 3;
pub const Y1: usize = 4;
pub const VY1: usize = 5;
pub const Y2: usize = 6;
pub const VY2: usize = 7;

/// Position slots in the order the staggered leapfrog visits them.
/// Each velocity slot sits directly after its position slot.
pub const POSITION_SLOTS: [usize; 4] = [X1, X2, Y1, Y2];

/// Full system state, ordered (x1, vx1, x2, vx2, y1, vy1, y2, vy2).
pub type State = SVector<f64, STATE_DIM>;

/// Which of the two bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Body {
    First,
    Second,
}

impl Body {
    /// (x, vx, y, vy) slots of this body in the state vector.
    fn slots(self) -> (usize, usize, usize, usize) {
        match self {
            Body::First => (X1, VX1, Y1, VY1),
            Body::Second => (X2, VX2, Y2, VY2),
        }
    }
}

/// Position and velocity of one body, read out of a [`State`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BodyState {
    pub pos: Vector2<f64>,
    pub vel: Vector2<f64>,
}

/// Assemble a state from both bodies.
pub fn state_from_bodies(first: &BodyState, second: &BodyState) -> State {
    State::from([
        first.pos.x,
        first.vel.x,
        second.pos.x,
        second.vel.x,
        first.pos.y,
        first.vel.y,
        second.pos.y,
        second.vel.y,
    ])
}

/// Extract one body's position and velocity.
pub fn body_state(state: &State, body: Body) -> BodyState {
    let (x, vx, y, vy) = body.slots();
    BodyState {
        pos: Vector2::new(state[x], state[y]),
        vel: Vector2::new(state[vx], state[vy]),
    }
}

// ---------------------------------------------------------------------------
// Field model parameters
// ---------------------------------------------------------------------------

/// Masses and coupling constant. Immutable for the lifetime of a run.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SystemParams {
    pub m1: f64,
    pub m2: f64,
    pub k: f64, // coupling constant (G times any normalisation)
}

impl SystemParams {
    pub fn new(m1: f64, m2: f64, k: f64) -> SimResult<Self> {
        let params = Self { m1, m2, k };
        params.validate()?;
        Ok(params)
    }

    pub fn validate(&self) -> SimResult<()> {
        for (name, value) in [("m1", self.m1), ("m2", self.m2), ("k", self.k)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(SimError::invalid(format!(
                    "{name} must be positive and finite, got {value}"
                )));
            }
        }
        Ok(())
    }

    pub fn total_mass(&self) -> f64 {
        self.m1 + self.m2
    }

    /// mu = m1 m2 / (m1 + m2)
    pub fn reduced_mass(&self) -> f64 {
        self.m1 * self.m2 / self.total_mass()
    }

    pub fn mass_of(&self, body: Body) -> f64 {
        match body {
            Body::First => self.m1,
            Body::Second => self.m2,
        }
    }
}

// ---------------------------------------------------------------------------
// Trajectory
// ---------------------------------------------------------------------------

/// Integration output: one series per state component, aligned to `times`.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    times: Vec<f64>,
    series: [Vec<f64>; STATE_DIM],
}

impl Trajectory {
    pub(crate) fn with_capacity(n: usize) -> Self {
        Self {
            times: Vec::with_capacity(n),
            series: std::array::from_fn(|_| Vec::with_capacity(n)),
        }
    }

    pub(crate) fn push(&mut self, t: f64, state: &State) {
        self.times.push(t);
        for (column, value) in self.series.iter_mut().zip(state.iter()) {
            column.push(*value);
        }
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    /// Values of one state component (use the slot constants, e.g. [`X1`]).
    /// `None` when `slot` is not below [`STATE_DIM`].
    pub fn component(&self, slot: usize) -> Option<&[f64]> {
        self.series.get(slot).map(Vec::as_slice)
    }

    /// All eight series in state-vector order.
    pub fn components(&self) -> &[Vec<f64>; STATE_DIM] {
        &self.series
    }

    /// Full state at sample `i`.
    pub fn state(&self, i: usize) -> Option<State> {
        if i >= self.len() {
            return None;
        }
        Some(State::from_fn(|slot, _| self.series[slot][i]))
    }

    pub fn body(&self, i: usize, body: Body) -> Option<BodyState> {
        self.state(i).map(|s| body_state(&s, body))
    }

    pub fn last_state(&self) -> Option<State> {
        self.len().checked_sub(1).and_then(|i| self.state(i))
    }

    /// Iterate `(t, state)` pairs in time order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, State)> + '_ {
        self.times
            .iter()
            .enumerate()
            .map(move |(i, &t)| (t, State::from_fn(|slot, _| self.series[slot][i])))
    }
}
