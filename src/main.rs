use std::process::ExitCode;

use phase_flow::io::SummaryRenderer;
use phase_flow::sim::Trajectory;
use phase_flow::{OdeResult, Pipeline, SimConfig};
use tracing::error;

fn main() -> ExitCode {
    tracing_subscriber::fmt::init();

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run() -> OdeResult<()> {
    // Optional single argument: path to a JSON config overriding the defaults.
    let config = match std::env::args().nth(1) {
        Some(path) => SimConfig::from_json_file(path)?,
        None => SimConfig::default(),
    };

    let mut summaries = SummaryRenderer::new();

    let lorenz = Pipeline::lorenz(&config.lorenz);
    let lorenz_traj = lorenz.run_into(&mut summaries)?;

    let lv = Pipeline::lotka_volterra(&config.lotka_volterra);
    let lv_traj = lv.run_into(&mut summaries)?;

    println!();
    println!("====================================================================");
    println!("  PHASE FLOW");
    println!("====================================================================");

    let p = config.lorenz.params;
    print_table(
        &format!(
            "{}  (sigma={}, rho={}, beta={:.4}, dt={}, {:?})",
            lorenz.name(),
            p.sigma,
            p.rho,
            p.beta,
            config.lorenz.dt,
            config.lorenz.method
        ),
        &lorenz.field().labels(),
        &lorenz_traj,
    );

    let q = config.lotka_volterra.params;
    print_table(
        &format!(
            "{}  (a={}, alpha={}, c={}, gamma={}, rtol={:e})",
            lv.name(),
            q.a,
            q.alpha,
            q.c,
            q.gamma,
            config.lotka_volterra.solver.rtol
        ),
        &lv.field().labels(),
        &lv_traj,
    );

    println!("  Summary");
    println!("  ──────────────────────────────────────────────────────────────────");
    summaries.write_json(&mut std::io::stdout().lock())?;
    println!();
    Ok(())
}

/// Print roughly 20 evenly spaced samples of a trajectory.
fn print_table(title: &str, labels: &[String], traj: &Trajectory) {
    println!();
    println!("  {title}");
    println!("  ──────────────────────────────────────────────────────────────────");
    print!("  {:>9}", "t");
    for label in labels {
        print!("  {label:>12}");
    }
    println!();
    println!("  {}", "─".repeat(11 + 14 * labels.len()));

    let sample_interval = (traj.len() / 20).max(1);
    for (i, (t, state)) in traj.iter().enumerate() {
        if i % sample_interval != 0 && i != traj.len() - 1 {
            continue;
        }
        print!("  {t:>9.3}");
        for v in state.iter() {
            print!("  {v:>12.5}");
        }
        println!();
    }

    match traj.first_non_finite() {
        Some(i) => println!("  !! non-finite values from sample {i} (t={})", traj.times()[i]),
        None => println!("  {} samples, all finite", traj.len()),
    }
    println!();
}
