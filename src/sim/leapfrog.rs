use tracing::{debug, warn};

use crate::dynamics::state::{
    State, SystemParams, Trajectory, POSITION_SLOTS, VX1, VX2, VY1, VY2,
};
use crate::error::{SimError, SimResult};
use crate::physics::gravity::{accelerations, checked_derivatives, separation};
use super::grid::{uniform_step, validate_initial_state};
use super::integrator::{IntegrationStats, Integrator, Solution};

// ---------------------------------------------------------------------------
// Fixed-step leapfrog (kick-drift-kick)
// ---------------------------------------------------------------------------

/// Update ordering within one leapfrog step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LeapfrogScheme {
    /// Kick, drift and kick one coordinate at a time in the order
    /// x1, x2, y1, y2, each seeing the coordinates already advanced earlier
    /// in the same step. Reproduces the reference output but does not
    /// conserve total momentum.
    Staggered,
    /// Half-kick all velocities, drift all positions, then half-kick again
    /// from a single acceleration evaluation.
    #[default]
    Synchronized,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Leapfrog {
    pub scheme: LeapfrogScheme,
    /// Separation at or below which the run fails as singular.
    pub min_separation: f64,
}

impl Default for Leapfrog {
    fn default() -> Self {
        Self {
            scheme: LeapfrogScheme::default(),
            min_separation: 1e-12,
        }
    }
}

impl Leapfrog {
    pub fn new(scheme: LeapfrogScheme) -> Self {
        Self { scheme, ..Self::default() }
    }

    /// One staggered step. Eight acceleration evaluations.
    pub fn staggered_step(state: &State, params: &SystemParams, dt: f64) -> State {
        let mut s = *state;
        for (dof, &pos) in POSITION_SLOTS.iter().enumerate() {
            let vel = pos + 1;
            let v_half = s[vel] + accelerations(&s, params)[dof] * dt * 0.5;
            s[pos] += v_half * dt;
            s[vel] = v_half + accelerations(&s, params)[dof] * dt * 0.5;
        }
        s
    }

    /// One synchronized step starting from `accel`, the acceleration at
    /// `state`. Returns the new state and the acceleration there.
    pub fn synchronized_step(
        state: &State,
        accel: &[f64; 4],
        params: &SystemParams,
        dt: f64,
    ) -> (State, [f64; 4]) {
        let mut s = *state;
        for (dof, &pos) in POSITION_SLOTS.iter().enumerate() {
            s[pos + 1] += accel[dof] * dt * 0.5;
            s[pos] += s[pos + 1] * dt;
        }
        let next = accelerations(&s, params);
        for (dof, &pos) in POSITION_SLOTS.iter().enumerate() {
            s[pos + 1] += next[dof] * dt * 0.5;
        }
        (s, next)
    }
}

impl Integrator for Leapfrog {
    fn integrate(
        &self,
        params: &SystemParams,
        times: &[f64],
        initial: &State,
    ) -> SimResult<Solution> {
        params.validate()?;
        let dt = uniform_step(times)?;
        validate_initial_state(initial)?;
        if !(self.min_separation >= 0.0) {
            return Err(SimError::invalid("min_separation must be non-negative"));
        }

        debug!(
            points = times.len(),
            dt,
            scheme = ?self.scheme,
            "leapfrog integration started"
        );

        let mut stats = IntegrationStats::default();
        let mut trajectory = Trajectory::with_capacity(times.len());

        let d0 = checked_derivatives(times[0], initial, params, self.min_separation, 0)?;
        let mut state = *initial;
        let mut accel = [d0[VX1], d0[VX2], d0[VY1], d0[VY2]];
        stats.rhs_evals += 1;
        trajectory.push(times[0], &state);

        for (index, &t) in times.iter().enumerate().skip(1) {
            state = match self.scheme {
                LeapfrogScheme::Staggered => {
                    stats.rhs_evals += 8;
                    Self::staggered_step(&state, params, dt)
                }
                LeapfrogScheme::Synchronized => {
                    stats.rhs_evals += 1;
                    let (next, next_accel) = Self::synchronized_step(&state, &accel, params, dt);
                    accel = next_accel;
                    next
                }
            };
            stats.accepted_steps += 1;

            if !state.iter().all(|v| v.is_finite()) {
                warn!(t, index, "non-finite state in leapfrog integration");
                return Err(SimError::NonFiniteState { t, index });
            }
            let r = separation(&state);
            if !(r > self.min_separation) {
                warn!(t, index, separation = r, "bodies collided");
                return Err(SimError::NumericalSingularity { t, index, separation: r });
            }

            trajectory.push(t, &state);
        }

        debug!(steps = stats.accepted_steps, "leapfrog integration finished");
        Ok(Solution { trajectory, stats })
    }
}

/// Integrate with the fixed-step leapfrog and return the sampled trajectory.
pub fn integrate_leapfrog(
    params: &SystemParams,
    times: &[f64],
    initial: &State,
    scheme: LeapfrogScheme,
) -> SimResult<Trajectory> {
    Leapfrog::new(scheme)
        .integrate(params, times, initial)
        .map(|solution| solution.trajectory)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::state::{X1, X2, Y1, Y2};
    use crate::sim::grid::time_grid;

    fn params() -> SystemParams {
        SystemParams::new(1.0, 1.0, 20.0).unwrap()
    }

    fn orbit() -> State {
        State::from([1.0, -1.0, -1.0, 1.0, 1.0, 1.0, -1.0, -1.0])
    }

    #[test]
    fn staggered_step_advances_one_coordinate_at_a_time() {
        let p = SystemParams::new(1.0, 2.0, 1.0).unwrap();
        let s0 = State::from([1.0, 0.0, 0.0, 0.0, 0.0, 0.5, 0.0, -0.25]);
        let dt = 0.1;

        // Replay the per-coordinate kick-drift-kick by hand.
        let mut s = s0;
        for (dof, pos) in [X1, X2, Y1, Y2].into_iter().enumerate() {
            let vh = s[pos + 1] + accelerations(&s, &p)[dof] * dt / 2.0;
            s[pos] += vh * dt;
            s[pos + 1] = vh + accelerations(&s, &p)[dof] * dt / 2.0;
        }
        assert_eq!(Leapfrog::staggered_step(&s0, &p, dt), s);

        // x2 saw the already-moved x1.
        let mut x1_only = s0;
        x1_only[X1] = s[X1];
        let a_x2 = accelerations(&x1_only, &p)[1];
        let expected_x2 = s0[X2] + (s0[VX2] + a_x2 * dt / 2.0) * dt;
        assert_eq!(s[X2], expected_x2);
    }

    #[test]
    fn synchronized_step_matches_velocity_verlet() {
        let p = SystemParams::new(1.0, 2.0, 1.0).unwrap();
        let s0 = State::from([1.0, 0.1, 0.0, 0.0, 0.0, 0.5, 0.0, -0.25]);
        let dt = 0.05;
        let a0 = accelerations(&s0, &p);
        let (s1, a1) = Leapfrog::synchronized_step(&s0, &a0, &p, dt);

        // x(t+dt) = x + v dt + a dt^2 / 2
        for (dof, pos) in [X1, X2, Y1, Y2].into_iter().enumerate() {
            let expected = s0[pos] + s0[pos + 1] * dt + 0.5 * a0[dof] * dt * dt;
            assert!((s1[pos] - expected).abs() < 1e-15);
        }
        assert_eq!(a1, accelerations(&s1, &p));
        let expected_vx1 = s0[VX1] + 0.5 * (a0[0] + a1[0]) * dt;
        assert!((s1[VX1] - expected_vx1).abs() < 1e-15);
    }

    #[test]
    fn output_matches_grid() {
        let times = time_grid(0.0, 1.0, 0.01).unwrap();
        for scheme in [LeapfrogScheme::Staggered, LeapfrogScheme::Synchronized] {
            let traj = integrate_leapfrog(&params(), &times, &orbit(), scheme).unwrap();
            assert_eq!(traj.len(), times.len());
            assert_eq!(traj.times(), times.as_slice());
            assert_eq!(traj.state(0), Some(orbit()));
        }
    }

    #[test]
    fn synchronized_scheme_conserves_momentum() {
        let times = time_grid(0.0, 10.0, 0.01).unwrap();
        let traj =
            integrate_leapfrog(&params(), &times, &orbit(), LeapfrogScheme::Synchronized).unwrap();
        for (_, s) in traj.iter() {
            assert!((s[VX1] + s[VX2]).abs() < 1e-12);
            assert!((s[VY1] + s[VY2]).abs() < 1e-12);
        }
    }

    #[test]
    fn stats_count_work() {
        let times = time_grid(0.0, 1.0, 0.1).unwrap();
        let sync = Leapfrog::new(LeapfrogScheme::Synchronized)
            .integrate(&params(), &times, &orbit())
            .unwrap();
        let stag = Leapfrog::new(LeapfrogScheme::Staggered)
            .integrate(&params(), &times, &orbit())
            .unwrap();
        assert_eq!(sync.stats.accepted_steps, 10);
        assert_eq!(sync.stats.rhs_evals, 11);
        assert_eq!(stag.stats.rhs_evals, 81);
        assert_eq!(stag.stats.rejected_steps, 0);
    }

    #[test]
    fn single_step_evaluates_field_twice() {
        let s0 = orbit();
        let solution = Leapfrog::new(LeapfrogScheme::Synchronized)
            .integrate(&params(), &[0.0, 0.01], &s0)
            .unwrap();
        assert_eq!(solution.stats.rhs_evals, 2);

        let (expected, _) =
            Leapfrog::synchronized_step(&s0, &accelerations(&s0, &params()), &params(), 0.01);
        assert_eq!(solution.trajectory.state(1), Some(expected));
    }

    #[test]
    fn non_uniform_grid_is_rejected() {
        let err = integrate_leapfrog(
            &params(),
            &[0.0, 0.01, 0.02, 0.04],
            &orbit(),
            LeapfrogScheme::Synchronized,
        )
        .unwrap_err();
        assert!(matches!(err, SimError::InvalidConfiguration { .. }));
    }

    #[test]
    fn collapsing_separation_is_surfaced() {
        let p = SystemParams::new(1.0, 1.0, 1.0).unwrap();
        let s0 = State::from([1.0, 0.0, -1.0, 0.0, 0.0, 0.0, 0.0, 0.0]);
        let times = time_grid(0.0, 3.0, 0.01).unwrap();
        let lf = Leapfrog { min_separation: 0.5, ..Leapfrog::default() };

        let err = lf.integrate(&p, &times, &s0).unwrap_err();
        match err {
            SimError::NumericalSingularity { t, index, separation } => {
                assert!(separation <= 0.5);
                assert!(index > 0 && t < 2.23, "t={t}");
            }
            other => panic!("unexpected error {other:?}"),
        }

        let coincident = State::from([1.0, 0.0, 1.0, 0.0, 2.0, 0.0, 2.0, 0.0]);
        let err = integrate_leapfrog(&p, &times, &coincident, LeapfrogScheme::Staggered)
            .unwrap_err();
        assert!(matches!(err, SimError::NumericalSingularity { index: 0, .. }));
    }
}
