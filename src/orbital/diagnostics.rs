use nalgebra::Vector2;

use crate::dynamics::state::{body_state, Body, State, SystemParams, Trajectory};
use crate::physics::gravity::separation;

// ---------------------------------------------------------------------------
// Conserved quantities
// ---------------------------------------------------------------------------

/// 1/2 m1 |v1|^2 + 1/2 m2 |v2|^2
pub fn kinetic_energy(state: &State, params: &SystemParams) -> f64 {
    let b1 = body_state(state, Body::First);
    let b2 = body_state(state, Body::Second);
    0.5 * params.m1 * b1.vel.norm_squared() + 0.5 * params.m2 * b2.vel.norm_squared()
}

/// -k m1 m2 / r
pub fn potential_energy(state: &State, params: &SystemParams) -> f64 {
    -params.k * params.m1 * params.m2 / separation(state)
}

/// Total mechanical energy of both bodies.
pub fn total_energy(state: &State, params: &SystemParams) -> f64 {
    kinetic_energy(state, params) + potential_energy(state, params)
}

pub fn linear_momentum(state: &State, params: &SystemParams) -> Vector2<f64> {
    let b1 = body_state(state, Body::First);
    let b2 = body_state(state, Body::Second);
    b1.vel * params.m1 + b2.vel * params.m2
}

/// z-component of the total angular momentum about the origin.
pub fn angular_momentum(state: &State, params: &SystemParams) -> f64 {
    [Body::First, Body::Second]
        .into_iter()
        .map(|body| {
            let b = body_state(state, body);
            params.mass_of(body) * b.pos.perp(&b.vel)
        })
        .sum()
}

pub fn center_of_mass(state: &State, params: &SystemParams) -> Vector2<f64> {
    let b1 = body_state(state, Body::First);
    let b2 = body_state(state, Body::Second);
    (b1.pos * params.m1 + b2.pos * params.m2) / params.total_mass()
}

// ---------------------------------------------------------------------------
// Trajectory diagnostics
// ---------------------------------------------------------------------------

/// Total energy at every sample.
pub fn energy_series(trajectory: &Trajectory, params: &SystemParams) -> Vec<f64> {
    trajectory
        .iter()
        .map(|(_, s)| total_energy(&s, params))
        .collect()
}

/// |E_last - E_first| / |E_first|; `None` for an empty trajectory.
pub fn relative_energy_drift(trajectory: &Trajectory, params: &SystemParams) -> Option<f64> {
    let first = trajectory.state(0)?;
    let last = trajectory.last_state()?;
    let e0 = total_energy(&first, params);
    let e1 = total_energy(&last, params);
    Some((e1 - e0).abs() / e0.abs())
}

/// Largest |E_i - E_0| / |E_0| over the whole trajectory.
pub fn max_relative_energy_error(trajectory: &Trajectory, params: &SystemParams) -> Option<f64> {
    let energies = energy_series(trajectory, params);
    let e0 = *energies.first()?;
    energies
        .iter()
        .map(|e| (e - e0).abs() / e0.abs())
        .reduce(f64::max)
}
