use eframe::egui;
use egui_plot::{Legend, Line, Plot, PlotPoints};

use phase_flow::sim::Trajectory;
use phase_flow::{OdeResult, Pipeline, Renderer, SimConfig};

fn main() -> eframe::Result {
    tracing_subscriber::fmt::init();

    let config = match std::env::args().nth(1) {
        Some(path) => SimConfig::from_json_file(&path).unwrap_or_else(|e| {
            tracing::warn!("could not load {path}: {e}; using defaults");
            SimConfig::default()
        }),
        None => SimConfig::default(),
    };

    let mut app = PhaseViz::default();
    let pipelines = [
        Pipeline::lorenz(&config.lorenz),
        Pipeline::lotka_volterra(&config.lotka_volterra),
    ];
    for pipeline in pipelines {
        if let Err(e) = pipeline.run_into(&mut app) {
            tracing::error!(pipeline = pipeline.name(), "integration failed: {e}");
        }
    }

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default().with_inner_size([1200.0, 800.0]),
        ..Default::default()
    };
    eframe::run_native("Phase Flow", options, Box::new(|_| Ok(Box::new(app))))
}

struct Panel {
    title: String,
    labels: Vec<String>,
    trajectory: Trajectory,
}

/// Renderer that keeps every trajectory it receives and plots them with egui.
#[derive(Default)]
struct PhaseViz {
    panels: Vec<Panel>,
}

impl Renderer for PhaseViz {
    fn render(&mut self, title: &str, labels: &[String], trajectory: &Trajectory) -> OdeResult<()> {
        self.panels.push(Panel {
            title: title.to_string(),
            labels: labels.to_vec(),
            trajectory: trajectory.clone(),
        });
        Ok(())
    }
}

/// `(component a, component b)` pairs, skipping non-finite samples.
fn phase_points(traj: &Trajectory, a: usize, b: usize, stride: usize) -> Vec<[f64; 2]> {
    traj.states()
        .iter()
        .step_by(stride)
        .filter(|s| s[a].is_finite() && s[b].is_finite())
        .map(|s| [s[a], s[b]])
        .collect()
}

fn time_points(traj: &Trajectory, c: usize, stride: usize) -> Vec<[f64; 2]> {
    traj.iter()
        .step_by(stride)
        .filter(|(_, s)| s[c].is_finite())
        .map(|(t, s)| [t, s[c]])
        .collect()
}

impl eframe::App for PhaseViz {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.heading("Phase Flow");
            let status: Vec<String> = self
                .panels
                .iter()
                .map(|p| match p.trajectory.first_non_finite() {
                    Some(i) => format!("{}: non-finite from sample {i}", p.title),
                    None => format!("{}: {} samples", p.title, p.trajectory.len()),
                })
                .collect();
            ui.label(status.join("  |  "));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            let available = ui.available_size();
            let rows = self.panels.len().max(1) as f32;
            let half_w = available.x / 2.0 - 8.0;
            let row_h = available.y / rows - 24.0;

            for (row, panel) in self.panels.iter().enumerate() {
                let traj = &panel.trajectory;
                let stride = (traj.len() / 4000).max(1);

                ui.horizontal(|ui| {
                    // Phase portrait: first vs last component (x-z for Lorenz).
                    ui.vertical(|ui| {
                        let (a, b) = (0, traj.dim() - 1);
                        let (x_label, y_label) = (&panel.labels[a], &panel.labels[b]);
                        ui.label(format!("{} ({y_label} vs {x_label})", panel.title));
                        Plot::new(("phase", row))
                            .width(half_w)
                            .height(row_h)
                            .x_axis_label(panel.labels[a].clone())
                            .show(ui, |plot_ui| {
                                let points: PlotPoints =
                                    phase_points(traj, a, b, stride).into_iter().collect();
                                plot_ui.line(Line::new(panel.title.clone(), points));
                            });
                    });

                    // Every component against time.
                    ui.vertical(|ui| {
                        ui.label(format!("{} over time", panel.title));
                        Plot::new(("series", row))
                            .width(half_w)
                            .height(row_h)
                            .x_axis_label("Time")
                            .legend(Legend::default())
                            .show(ui, |plot_ui| {
                                for (c, label) in panel.labels.iter().enumerate() {
                                    let points: PlotPoints =
                                        time_points(traj, c, stride).into_iter().collect();
                                    plot_ui.line(Line::new(label.clone(), points));
                                }
                            });
                    });
                });
            }
        });
    }
}
