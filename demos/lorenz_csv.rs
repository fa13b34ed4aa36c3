use phase_flow::io::csv;
use phase_flow::io::json::{self, TrajectorySummary};
use phase_flow::{LorenzConfig, Pipeline};

fn main() {
    let pipeline = Pipeline::lorenz(&LorenzConfig::default());

    println!("Integrating {} ...", pipeline.name());
    let trajectory = pipeline.run().expect("canonical Lorenz run is well-formed");

    let labels = pipeline.field().labels();
    let summary = TrajectorySummary::from_trajectory(pipeline.name(), &labels, &trajectory);
    for c in &summary.components {
        println!("  {:>2}: [{:>8.3}, {:>8.3}]", c.label, c.min, c.max);
    }

    csv::write_trajectory_file("lorenz_trajectory.csv", &labels, &trajectory)
        .expect("Failed to write CSV");
    json::write_summaries_file("lorenz_summary.json", &[summary]).expect("Failed to write JSON");

    println!("Exported: lorenz_trajectory.csv, lorenz_summary.json");
}
