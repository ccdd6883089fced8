use crate::dynamics::state::{State, SystemParams, VX1, VX2, VY1, VY2, X1, X2, Y1, Y2};
use crate::error::{SimError, SimResult};

// ---------------------------------------------------------------------------
// Newtonian two-body field model
// ---------------------------------------------------------------------------

/// Squared separation d^2 = (x1 - x2)^2 + (y1 - y2)^2.
pub fn separation_squared(state: &State) -> f64 {
    let dx = state[X1] - state[X2];
    let dy = state[Y1] - state[Y2];
    dx * dx + dy * dy
}

/// Distance between the two bodies.
pub fn separation(state: &State) -> f64 {
    separation_squared(state).sqrt()
}

/// Accelerations (ax1, ax2, ay1, ay2), in the order the position slots
/// appear in the state vector.
///
/// Body 1 is pulled with a factor of m2 and body 2 with m1: the force scales
/// with m1 m2 and each body's own mass cancels.
pub fn accelerations(state: &State, params: &SystemParams) -> [f64; 4] {
    let dx = state[X1] - state[X2];
    let dy = state[Y1] - state[Y2];
    let d2 = dx * dx + dy * dy;
    let eta = params.k * d2.powf(-1.5);

    [
        -eta * params.m2 * dx,
        -eta * params.m1 * -dx,
        -eta * params.m2 * dy,
        -eta * params.m1 * -dy,
    ]
}

/// Right-hand side of the two-body ODE.
///
/// `t` is unused (the force law is autonomous) but kept so the signature
/// matches generic ODE solvers. Singular, not an error, at zero separation:
/// the result is then non-finite.
pub fn derivatives(_t: f64, state: &State, params: &SystemParams) -> State {
    let [ax1, ax2, ay1, ay2] = accelerations(state, params);
    State::from([
        state[VX1],
        ax1,
        state[VX2],
        ax2,
        state[VY1],
        ay1,
        state[VY2],
        ay2,
    ])
}

/// [`derivatives`] with a guard against a collapsing separation.
///
/// `index` is the requested time point the caller is integrating towards and
/// is only used to locate the failure.
pub fn checked_derivatives(
    t: f64,
    state: &State,
    params: &SystemParams,
    min_separation: f64,
    index: usize,
) -> SimResult<State> {
    let r = separation(state);
    if !(r > min_separation) {
        return Err(SimError::NumericalSingularity { t, index, separation: r });
    }
    let d = derivatives(t, state, params);
    if !d.iter().all(|v| v.is_finite()) {
        return Err(SimError::NumericalSingularity { t, index, separation: r });
    }
    Ok(d)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> SystemParams {
        SystemParams::new(1.0, 3.0, 2.0).unwrap()
    }

    #[test]
    fn positions_pass_velocities_through() {
        let s = State::from([1.0, 0.1, -1.0, 0.2, 0.5, 0.3, -0.5, 0.4]);
        let d = derivatives(0.0, &s, &params());
        assert_eq!(d[X1], 0.1);
        assert_eq!(d[X2], 0.2);
        assert_eq!(d[Y1], 0.3);
        assert_eq!(d[Y2], 0.4);
    }

    #[test]
    fn inverse_square_magnitude() {
        // Bodies 2 apart on the x axis: |a1| = k m2 / r^2, |a2| = k m1 / r^2
        let s = State::from([1.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let p = params();
        let d = derivatives(0.0, &s, &p);
        assert!((d[VX1] + p.k * p.m2 / 4.0).abs() < 1e-15);
        assert!((d[VX2] - p.k * p.m1 / 4.0).abs() < 1e-15);
        assert_eq!(d[VY1], 0.0);
        assert_eq!(d[VY2], 0.0);
    }

    #[test]
    fn forces_are_equal_and_opposite() {
        let s = State::from([0.3, 0.0, -1.2, 0.0, 2.0, 0.0, 0.7, 0.0]);
        let p = params();
        let [ax1, ax2, ay1, ay2] = accelerations(&s, &p);
        assert!((p.m1 * ax1 + p.m2 * ax2).abs() < 1e-14);
        assert!((p.m1 * ay1 + p.m2 * ay2).abs() < 1e-14);
    }

    #[test]
    fn time_does_not_enter() {
        let s = State::from([0.3, 1.0, -1.2, 0.0, 2.0, 0.0, 0.7, -1.0]);
        assert_eq!(derivatives(0.0, &s, &params()), derivatives(123.4, &s, &params()));
    }

    #[test]
    fn collision_is_flagged_by_checked_form() {
        let s = State::from([1.0, 0.0, 1.0, 0.0, 2.0, 0.0, 2.0, 0.0]);
        assert!(!derivatives(0.0, &s, &params()).iter().all(|v| v.is_finite()));

        let err = checked_derivatives(0.5, &s, &params(), 1e-12, 4).unwrap_err();
        assert!(matches!(
            err,
            SimError::NumericalSingularity { t, index: 4, separation }
                if t == 0.5 && separation == 0.0
        ));
    }

    #[test]
    fn separation_is_euclidean() {
        let s = State::from([3.0, 0.0, 0.0, 0.0, 4.0, 0.0, 0.0, 0.0]);
        assert_eq!(separation(&s), 5.0);
        assert_eq!(separation_squared(&s), 25.0);
    }
}
