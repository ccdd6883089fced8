use crate::dynamics::state::State;
use crate::error::{SimError, SimResult};

/// Relative tolerance on spacing when a grid must be uniform.
pub const UNIFORM_SPACING_TOL: f64 = 1e-6;

/// Largest number of steps [`time_grid`] will allocate.
pub const MAX_GRID_STEPS: u32 = u32::MAX;

// ---------------------------------------------------------------------------
// Time grids
// ---------------------------------------------------------------------------

/// Uniform grid `t0, t0 + dt, ..., t_end` (the end point is included when
/// `t_end - t0` is a whole number of steps, up to rounding).
pub fn time_grid(t0: f64, t_end: f64, dt: f64) -> SimResult<Vec<f64>> {
    if !t0.is_finite() || !t_end.is_finite() || !dt.is_finite() {
        return Err(SimError::invalid("time grid bounds and step must be finite"));
    }
    if dt <= 0.0 {
        return Err(SimError::invalid(format!("time step must be positive, got {dt}")));
    }
    if t_end <= t0 {
        return Err(SimError::invalid(format!(
            "time grid end {t_end} must be after start {t0}"
        )));
    }

    let steps = ((t_end - t0) / dt + 1e-9).floor();
    if !steps.is_finite() || steps > MAX_GRID_STEPS as f64 {
        return Err(SimError::invalid(format!(
            "time grid [{t0}, {t_end}] with step {dt} exceeds {MAX_GRID_STEPS} steps"
        )));
    }
    let n = steps as usize;
    Ok((0..=n).map(|i| t0 + i as f64 * dt).collect())
}

/// At least two finite, strictly increasing time points.
pub fn validate_time_points(times: &[f64]) -> SimResult<()> {
    if times.len() < 2 {
        return Err(SimError::invalid(format!(
            "need at least 2 time points, got {}",
            times.len()
        )));
    }
    if let Some(i) = times.iter().position(|t| !t.is_finite()) {
        return Err(SimError::invalid(format!("time point {i} is not finite")));
    }
    if let Some(i) = times.windows(2).position(|w| w[1] <= w[0]) {
        return Err(SimError::invalid(format!(
            "time points must be strictly increasing (index {})",
            i + 1
        )));
    }
    Ok(())
}

/// Step size of a uniform grid, taken from the first two points.
///
/// Every other spacing must agree with it to within [`UNIFORM_SPACING_TOL`].
pub fn uniform_step(times: &[f64]) -> SimResult<f64> {
    validate_time_points(times)?;
    let dt = times[1] - times[0];
    for (i, w) in times.windows(2).enumerate().skip(1) {
        let spacing = w[1] - w[0];
        if (spacing - dt).abs() > UNIFORM_SPACING_TOL * dt {
            return Err(SimError::invalid(format!(
                "non-uniform time grid: spacing {spacing} at index {} differs from {dt}",
                i + 1
            )));
        }
    }
    Ok(dt)
}

pub fn validate_initial_state(state: &State) -> SimResult<()> {
    if let Some(slot) = state.iter().position(|v| !v.is_finite()) {
        return Err(SimError::invalid(format!(
            "initial state component {slot} is not finite"
        )));
    }
    Ok(())
}
