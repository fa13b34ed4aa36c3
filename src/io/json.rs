use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::Renderer;
use crate::error::OdeResult;
use crate::sim::Trajectory;

/// Per-component extremes of a trajectory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComponentSummary {
    pub label: String,
    pub min: f64,
    pub max: f64,
    pub final_value: f64,
    /// Oscillation peaks, as counted by `Trajectory::local_maxima`.
    pub peaks: usize,
}

/// Summary statistics computed from a trajectory. Non-finite values are
/// skipped by `min`/`max` and serialize as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrajectorySummary {
    pub title: String,
    pub samples: usize,
    pub t_start: f64,
    pub t_end: f64,
    pub components: Vec<ComponentSummary>,
    pub first_non_finite: Option<usize>,
}

impl TrajectorySummary {
    pub fn from_trajectory(title: &str, labels: &[String], trajectory: &Trajectory) -> Self {
        let components = (0..trajectory.dim())
            .map(|i| {
                let values = trajectory.component(i);
                ComponentSummary {
                    label: labels.get(i).cloned().unwrap_or_else(|| format!("y{i}")),
                    min: values.iter().copied().fold(f64::INFINITY, f64::min),
                    max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
                    final_value: values.last().copied().unwrap_or(f64::NAN),
                    peaks: trajectory.local_maxima(i).len(),
                }
            })
            .collect();

        TrajectorySummary {
            title: title.to_string(),
            samples: trajectory.len(),
            t_start: trajectory.first().map_or(f64::NAN, |(t, _)| t),
            t_end: trajectory.last().map_or(f64::NAN, |(t, _)| t),
            components,
            first_non_finite: trajectory.first_non_finite(),
        }
    }

    pub fn component(&self, label: &str) -> Option<&ComponentSummary> {
        self.components.iter().find(|c| c.label == label)
    }
}

/// Write summaries as pretty-printed JSON.
pub fn write_summaries<W: Write>(writer: &mut W, summaries: &[TrajectorySummary]) -> OdeResult<()> {
    serde_json::to_writer_pretty(&mut *writer, summaries)?;
    writeln!(writer)?;
    Ok(())
}

pub fn write_summaries_file(
    path: impl AsRef<Path>,
    summaries: &[TrajectorySummary],
) -> OdeResult<()> {
    let mut file = std::fs::File::create(path)?;
    write_summaries(&mut file, summaries)
}

/// Collects a [`TrajectorySummary`] for every trajectory rendered into it.
#[derive(Debug, Default)]
pub struct SummaryRenderer {
    pub summaries: Vec<TrajectorySummary>,
}

impl SummaryRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_json<W: Write>(&self, writer: &mut W) -> OdeResult<()> {
        write_summaries(writer, &self.summaries)
    }
}

impl Renderer for SummaryRenderer {
    fn render(&mut self, title: &str, labels: &[String], trajectory: &Trajectory) -> OdeResult<()> {
        self.summaries
            .push(TrajectorySummary::from_trajectory(title, labels, trajectory));
        Ok(())
    }
}
