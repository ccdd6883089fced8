use two_body_sim::orbital::diagnostics::{angular_momentum, max_relative_energy_error, total_energy};
use two_body_sim::physics::gravity::separation;
use two_body_sim::sim::{
    time_grid, AdaptiveIntegrator, AdaptiveOptions, Integrator, Leapfrog, LeapfrogScheme,
};
use two_body_sim::types::{State, SystemParams, X1, X2, Y1, Y2};
use two_body_sim::SimResult;

fn main() -> SimResult<()> {
    tracing_subscriber::fmt::init();

    // -----------------------------------------------------------------------
    // Scenario: equal masses, point-reflected start, k = 20
    // -----------------------------------------------------------------------
    let params = SystemParams::new(1.0, 1.0, 20.0)?;
    // (x1, vx1, x2, vx2, y1, vy1, y2, vy2)
    let initial = State::from([1.0, -1.0, -1.0, 1.0, 1.0, 1.0, -1.0, -1.0]);
    let times = time_grid(0.0, 50.0, 0.01)?;

    let runs: [(&str, Box<dyn Integrator>); 3] = [
        (
            "Dormand-Prince 5(4)",
            Box::new(AdaptiveIntegrator::new(AdaptiveOptions::with_tolerances(1e-8, 1e-8))),
        ),
        ("Leapfrog (sync)", Box::new(Leapfrog::new(LeapfrogScheme::Synchronized))),
        ("Leapfrog (stag)", Box::new(Leapfrog::new(LeapfrogScheme::Staggered))),
    ];

    println!();
    println!("====================================================================");
    println!("  TWO-BODY ORBIT — m1={} m2={} k={}", params.m1, params.m2, params.k);
    println!("====================================================================");
    println!();
    println!(
        "  Initial energy: {:>10.6}    Angular momentum: {:>8.4}",
        total_energy(&initial, &params),
        angular_momentum(&initial, &params)
    );
    println!("  Samples:        {:>10}    dt: {}", times.len(), times[1] - times[0]);
    println!();

    for (name, integrator) in &runs {
        let solution = integrator.integrate(&params, &times, &initial)?;
        let traj = &solution.trajectory;

        println!("  {name}");
        println!("  ──────────────────────────────────────────────────────────────────");
        println!(
            "  steps: {}  rejected: {}  rhs evals: {}  max |dE/E0|: {:.2e}",
            solution.stats.accepted_steps,
            solution.stats.rejected_steps,
            solution.stats.rhs_evals,
            max_relative_energy_error(traj, &params).unwrap_or(f64::NAN),
        );
        println!(
            "  {:>7}  {:>9}  {:>9}  {:>9}  {:>9}  {:>8}",
            "t", "x1", "y1", "x2", "y2", "r"
        );

        let sample_interval = (traj.len() / 10).max(1);
        for (i, (t, s)) in traj.iter().enumerate() {
            if i % sample_interval != 0 && i != traj.len() - 1 {
                continue;
            }
            println!(
                "  {:>7.2}  {:>9.4}  {:>9.4}  {:>9.4}  {:>9.4}  {:>8.4}",
                t,
                s[X1],
                s[Y1],
                s[X2],
                s[Y2],
                separation(&s)
            );
        }
        println!();
    }

    println!("====================================================================");
    Ok(())
}
