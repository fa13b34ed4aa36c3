use std::io::{self, Write};
use std::path::Path;

use super::Renderer;
use crate::error::OdeResult;
use crate::sim::Trajectory;

/// Write a trajectory as CSV: a `t,<labels...>` header, then one row per sample.
/// Values use Rust's shortest round-trip float formatting.
pub fn write_trajectory<W: Write>(
    writer: &mut W,
    labels: &[String],
    trajectory: &Trajectory,
) -> io::Result<()> {
    writeln!(writer, "t,{}", labels.join(","))?;

    for (t, state) in trajectory.iter() {
        write!(writer, "{t}")?;
        for v in state.iter() {
            write!(writer, ",{v}")?;
        }
        writeln!(writer)?;
    }

    Ok(())
}

/// Write a trajectory to a CSV file at the given path.
pub fn write_trajectory_file(
    path: impl AsRef<Path>,
    labels: &[String],
    trajectory: &Trajectory,
) -> io::Result<()> {
    let mut file = io::BufWriter::new(std::fs::File::create(path)?);
    write_trajectory(&mut file, labels, trajectory)?;
    file.flush()
}

/// Streams each rendered trajectory into a writer as one CSV table.
pub struct CsvRenderer<W: Write> {
    writer: W,
}

impl<W: Write> CsvRenderer<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W: Write> Renderer for CsvRenderer<W> {
    fn render(
        &mut self,
        _title: &str,
        labels: &[String],
        trajectory: &Trajectory,
    ) -> OdeResult<()> {
        write_trajectory(&mut self.writer, labels, trajectory)?;
        Ok(())
    }
}
