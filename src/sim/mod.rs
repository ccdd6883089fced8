pub mod adaptive;
pub mod grid;
pub mod integrator;
pub mod leapfrog;

pub use adaptive::{integrate_adaptive, AdaptiveIntegrator, AdaptiveOptions, StepController};
pub use grid::{time_grid, uniform_step, validate_time_points};
pub use integrator::{IntegrationStats, Integrator, Solution};
pub use leapfrog::{integrate_leapfrog, Leapfrog, LeapfrogScheme};
