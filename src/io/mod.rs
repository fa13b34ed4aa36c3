//! Renderer boundary: anything that consumes a finished trajectory.

pub mod csv;
pub mod json;

use crate::error::OdeResult;
use crate::sim::Trajectory;

pub use self::csv::CsvRenderer;
pub use self::json::{SummaryRenderer, TrajectorySummary};

/// Consumes a complete trajectory, e.g. to plot or export it.
///
/// `labels` names each state component in order (`["x", "y", "z"]`).
pub trait Renderer {
    fn render(&mut self, title: &str, labels: &[String], trajectory: &Trajectory) -> OdeResult<()>;
}
