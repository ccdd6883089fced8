pub mod state;

pub use state::{body_state, state_from_bodies, Body, BodyState, State, SystemParams, Trajectory};
