use nalgebra::DVector;
use phase_flow::sim::{Adams, AdamsOptions, FixedStep, Integrator};
use phase_flow::{FnField, TimeGrid};

/// Damped pendulum, integrated with all three methods on the same grid.
fn main() {
    let pendulum = FnField::new(2, |_t, y: &DVector<f64>| {
        DVector::from_vec(vec![y[1], -0.2 * y[1] - 9.81 * y[0].sin()])
    });
    let y0 = DVector::from_vec(vec![1.0, 0.0]);
    let grid = TimeGrid::linspace(0.0, 10.0, 101);

    let reference = Adams::new(AdamsOptions {
        rtol: 1e-10,
        ..Default::default()
    })
    .integrate(&pendulum, &y0, &grid)
    .expect("valid inputs");
    let (_, theta_ref) = reference.last().expect("non-empty trajectory");

    let methods: Vec<Box<dyn Integrator>> = vec![
        Box::new(FixedStep::euler().with_substeps(100)),
        Box::new(FixedStep::rk4()),
        Box::new(Adams::default()),
    ];
    for method in &methods {
        let traj = method.integrate(&pendulum, &y0, &grid).expect("valid inputs");
        let (t, state) = traj.last().expect("non-empty trajectory");
        println!(
            "{:>6}: theta({t}) = {:+.6}  (error {:.2e})",
            method.name(),
            state[0],
            (state[0] - theta_ref[0]).abs()
        );
    }
}
