use tracing::{debug, warn};

use crate::dynamics::state::{State, SystemParams, Trajectory};
use crate::error::{SimError, SimResult};
use crate::physics::gravity::{checked_derivatives, derivatives, separation};
use super::grid::{validate_initial_state, validate_time_points};
use super::integrator::{IntegrationStats, Integrator, Solution};

// ---------------------------------------------------------------------------
// Dormand-Prince 5(4) tableau
// ---------------------------------------------------------------------------

const C2: f64 = 1.0 / 5.0;
const C3: f64 = 3.0 / 10.0;
const C4: f64 = 4.0 / 5.0;
const C5: f64 = 8.0 / 9.0;

const A21: f64 = 1.0 / 5.0;
const A31: f64 = 3.0 / 40.0;
const A32: f64 = 9.0 / 40.0;
const A41: f64 = 44.0 / 45.0;
const A42: f64 = -56.0 / 15.0;
const A43: f64 = 32.0 / 9.0;
const A51: f64 = 19372.0 / 6561.0;
const A52: f64 = -25360.0 / 2187.0;
const A53: f64 = 64448.0 / 6561.0;
const A54: f64 = -212.0 / 729.0;
const A61: f64 = 9017.0 / 3168.0;
const A62: f64 = -355.0 / 33.0;
const A63: f64 = 46732.0 / 5247.0;
const A64: f64 = 49.0 / 176.0;
const A65: f64 = -5103.0 / 18656.0;

// 5th-order weights; also row 7 of A (first same as last)
const B1: f64 = 35.0 / 384.0;
const B3: f64 = 500.0 / 1113.0;
const B4: f64 = 125.0 / 192.0;
const B5: f64 = -2187.0 / 6784.0;
const B6: f64 = 11.0 / 84.0;

// b - b_hat, where b_hat are the embedded 4th-order weights
const E1: f64 = 71.0 / 57600.0;
const E3: f64 = -71.0 / 16695.0;
const E4: f64 = 71.0 / 1920.0;
const E5: f64 = -17253.0 / 339200.0;
const E6: f64 = 22.0 / 525.0;
const E7: f64 = -1.0 / 40.0;

// ---------------------------------------------------------------------------
// Step-size control
// ---------------------------------------------------------------------------

/// I-controller: h_new = safety * h * err^(-1/5), clamped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepController {
    pub safety: f64,
    pub min_factor: f64,
    pub max_factor: f64,
}

impl Default for StepController {
    fn default() -> Self {
        Self {
            safety: 0.9,
            min_factor: 0.2,
            max_factor: 5.0,
        }
    }
}

impl StepController {
    const EXPONENT: f64 = 1.0 / 5.0; // 1 / (order of the error estimate + 1)

    /// Requires 0 < min_factor <= max_factor, both finite, and a finite
    /// positive safety factor.
    pub fn validate(&self) -> SimResult<()> {
        if !self.safety.is_finite() || self.safety <= 0.0 {
            return Err(SimError::invalid("controller safety must be positive and finite"));
        }
        if !self.min_factor.is_finite() || self.min_factor <= 0.0 {
            return Err(SimError::invalid("controller min_factor must be positive and finite"));
        }
        if !self.max_factor.is_finite() || self.max_factor < self.min_factor {
            return Err(SimError::invalid(
                "controller max_factor must be finite and not below min_factor",
            ));
        }
        Ok(())
    }

    pub fn factor(&self, error: f64) -> f64 {
        if error == 0.0 {
            return self.max_factor;
        }
        if !error.is_finite() {
            return self.min_factor;
        }
        (self.safety * error.powf(-Self::EXPONENT)).clamp(self.min_factor, self.max_factor)
    }
}

// ---------------------------------------------------------------------------
// Options
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AdaptiveOptions {
    pub atol: f64,
    pub rtol: f64,
    /// First trial step; defaults to the first grid spacing.
    pub initial_step: Option<f64>,
    pub min_step: f64,
    pub max_step: f64,
    /// Budget of attempted steps (accepted + rejected) for the whole run.
    pub max_steps: u64,
    /// Separation at or below which the run fails as singular.
    pub min_separation: f64,
    pub controller: StepController,
}

impl Default for AdaptiveOptions {
    fn default() -> Self {
        Self {
            atol: 1e-8,
            rtol: 1e-8,
            initial_step: None,
            min_step: 1e-14,
            max_step: f64::INFINITY,
            max_steps: 10_000_000,
            min_separation: 1e-12,
            controller: StepController::default(),
        }
    }
}

impl AdaptiveOptions {
    pub fn with_tolerances(atol: f64, rtol: f64) -> Self {
        Self { atol, rtol, ..Self::default() }
    }

    pub fn validate(&self) -> SimResult<()> {
        if !self.atol.is_finite() || self.atol <= 0.0 {
            return Err(SimError::invalid("atol must be positive and finite"));
        }
        if !self.rtol.is_finite() || self.rtol < 0.0 {
            return Err(SimError::invalid("rtol must be non-negative and finite"));
        }
        if let Some(h0) = self.initial_step {
            if !h0.is_finite() || h0 <= 0.0 {
                return Err(SimError::invalid("initial_step must be positive and finite"));
            }
        }
        if !self.min_step.is_finite() || self.min_step <= 0.0 {
            return Err(SimError::invalid("min_step must be positive and finite"));
        }
        if !(self.max_step >= self.min_step) {
            return Err(SimError::invalid("max_step must not be below min_step"));
        }
        if self.max_steps == 0 {
            return Err(SimError::invalid("max_steps must be non-zero"));
        }
        if !(self.min_separation >= 0.0) {
            return Err(SimError::invalid("min_separation must be non-negative"));
        }
        self.controller.validate()
    }
}

// ---------------------------------------------------------------------------
// Integrator
// ---------------------------------------------------------------------------

/// Result of one trial step.
struct Trial {
    y: State,
    /// Derivative at the new point, reused as the next first stage.
    dy: State,
    error: f64,
}

/// Adaptive Dormand-Prince 5(4) integrator with exact landing on every
/// requested time point.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdaptiveIntegrator {
    pub options: AdaptiveOptions,
}

impl AdaptiveIntegrator {
    pub fn new(options: AdaptiveOptions) -> Self {
        Self { options }
    }

    fn trial_step(&self, params: &SystemParams, t: f64, y: &State, k1: &State, h: f64) -> Trial {
        let k2 = derivatives(t + C2 * h, &(y + k1 * (h * A21)), params);
        let k3 = derivatives(t + C3 * h, &(y + (k1 * A31 + k2 * A32) * h), params);
        let k4 = derivatives(t + C4 * h, &(y + (k1 * A41 + k2 * A42 + k3 * A43) * h), params);
        let k5 = derivatives(
            t + C5 * h,
            &(y + (k1 * A51 + k2 * A52 + k3 * A53 + k4 * A54) * h),
            params,
        );
        let k6 = derivatives(
            t + h,
            &(y + (k1 * A61 + k2 * A62 + k3 * A63 + k4 * A64 + k5 * A65) * h),
            params,
        );
        let y_new = y + (k1 * B1 + k3 * B3 + k4 * B4 + k5 * B5 + k6 * B6) * h;
        let k7 = derivatives(t + h, &y_new, params);

        let err = (k1 * E1 + k3 * E3 + k4 * E4 + k5 * E5 + k6 * E6 + k7 * E7) * h;
        let error = self.error_norm(y, &y_new, &err);

        Trial { y: y_new, dy: k7, error }
    }

    /// max_i |err_i| / (atol + rtol * max(|y_i|, |y_new_i|)); NaN counts as
    /// an infinitely bad step.
    fn error_norm(&self, y: &State, y_new: &State, err: &State) -> f64 {
        let mut max_err: f64 = 0.0;
        for ((e, a), b) in err.iter().zip(y.iter()).zip(y_new.iter()) {
            let scale = self.options.atol + self.options.rtol * a.abs().max(b.abs());
            let scaled = e.abs() / scale;
            if scaled.is_nan() {
                return f64::INFINITY;
            }
            max_err = max_err.max(scaled);
        }
        max_err
    }
}

impl Integrator for AdaptiveIntegrator {
    fn integrate(
        &self,
        params: &SystemParams,
        times: &[f64],
        initial: &State,
    ) -> SimResult<Solution> {
        params.validate()?;
        self.options.validate()?;
        validate_time_points(times)?;
        validate_initial_state(initial)?;

        let opts = &self.options;
        debug!(
            points = times.len(),
            t0 = times[0],
            t_end = times[times.len() - 1],
            atol = opts.atol,
            rtol = opts.rtol,
            "adaptive integration started"
        );

        let mut stats = IntegrationStats::default();
        let mut trajectory = Trajectory::with_capacity(times.len());

        let mut t = times[0];
        let mut y = *initial;
        trajectory.push(t, &y);

        let mut k1 = checked_derivatives(t, &y, params, opts.min_separation, 0)?;
        stats.rhs_evals += 1;

        let mut h = opts
            .initial_step
            .unwrap_or(times[1] - times[0])
            .clamp(opts.min_step, opts.max_step);

        for (index, &target) in times.iter().enumerate().skip(1) {
            while t < target {
                let remaining = target - t;
                let landing = h >= remaining;
                let step = if landing { remaining } else { h };
                let t_next = if landing { target } else { t + step };
                if t_next <= t {
                    warn!(t, index, step, "step size below time resolution");
                    return Err(SimError::ToleranceFailure { t, index, step });
                }

                if stats.accepted_steps + stats.rejected_steps >= opts.max_steps {
                    warn!(t, index, max_steps = opts.max_steps, "adaptive step budget exhausted");
                    return Err(SimError::ToleranceFailure { t, index, step });
                }

                let trial = self.trial_step(params, t, &y, &k1, step);
                stats.rhs_evals += 6;
                let factor = opts.controller.factor(trial.error);

                if trial.error <= 1.0 {
                    stats.accepted_steps += 1;
                    t = t_next;
                    y = trial.y;
                    k1 = trial.dy;

                    if !y.iter().all(|v| v.is_finite()) {
                        warn!(t, index, "non-finite state in adaptive integration");
                        return Err(SimError::NonFiniteState { t, index });
                    }
                    let r = separation(&y);
                    if !(r > opts.min_separation) || !k1.iter().all(|v| v.is_finite()) {
                        warn!(t, index, separation = r, "bodies collided");
                        return Err(SimError::NumericalSingularity { t, index, separation: r });
                    }

                    // A step clipped to land on the grid says nothing about
                    // how large the next one may be.
                    let proposed = step * factor;
                    h = if landing { h.max(proposed) } else { proposed };
                    h = h.clamp(opts.min_step, opts.max_step);
                } else {
                    stats.rejected_steps += 1;
                    if step <= opts.min_step {
                        warn!(t, index, step, error = trial.error, "step size underflow");
                        return Err(SimError::ToleranceFailure { t, index, step });
                    }
                    h = (step * factor).clamp(opts.min_step, opts.max_step);
                }
            }
            trajectory.push(target, &y);
        }

        debug!(
            accepted = stats.accepted_steps,
            rejected = stats.rejected_steps,
            rhs_evals = stats.rhs_evals,
            "adaptive integration finished"
        );
        Ok(Solution { trajectory, stats })
    }
}

/// Integrate with the adaptive solver and return the sampled trajectory.
pub fn integrate_adaptive(
    params: &SystemParams,
    times: &[f64],
    initial: &State,
    options: &AdaptiveOptions,
) -> SimResult<Trajectory> {
    AdaptiveIntegrator::new(options.clone())
        .integrate(params, times, initial)
        .map(|solution| solution.trajectory)
}
