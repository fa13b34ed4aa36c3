use nalgebra::Vector2;
use phase_flow::sim::Adams;
use phase_flow::{LotkaVolterra, LotkaVolterraConfig, TimeGrid, VectorField};

fn main() {
    let cfg = LotkaVolterraConfig::default();
    let field = LotkaVolterra::new(cfg.params);
    let grid = TimeGrid::linspace(0.0, 15.0, 1000);
    let solver = Adams::new(cfg.solver.clone());

    // A few initial populations around the equilibrium.
    let eq = field.equilibrium();
    println!("Equilibrium: prey={:.3}, predator={:.3}", eq.x, eq.y);

    for start in [[2.0, 2.0], [1.0, 2.0], [5.0, 1.0], [3.0, 4.0]] {
        let y0 = nalgebra::DVector::from_column_slice(&start);
        let (traj, stats) = solver
            .integrate_with_stats(&field, &y0, &grid)
            .expect("valid grid and initial state");

        let v0 = field.first_integral(&Vector2::new(start[0], start[1]));
        let drift = traj
            .states()
            .iter()
            .map(|s| (field.first_integral(&Vector2::new(s[0], s[1])) - v0).abs())
            .fold(0.0_f64, f64::max);

        println!(
            "  start {:?}: {} prey peaks, {} steps ({} rejected, order <= {}), {} field evals, max drift {:.2e}",
            start,
            traj.local_maxima(0).len(),
            stats.accepted,
            stats.rejected,
            stats.highest_order,
            stats.fn_evals,
            drift,
        );
    }

    println!("Components: {:?}", field.labels());
}
