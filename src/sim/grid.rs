use serde::{Deserialize, Serialize};

use crate::error::{OdeError, OdeResult};

// ---------------------------------------------------------------------------
// Output time grid
// ---------------------------------------------------------------------------

/// Times at which a trajectory is sampled. Always strictly increasing once
/// validated; sample 0 carries the initial condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TimeGrid {
    /// `steps + 1` samples at `t0 + i * dt`.
    Uniform { t0: f64, dt: f64, steps: usize },
    /// Caller-chosen sample times.
    Explicit { times: Vec<f64> },
}

impl TimeGrid {
    pub fn uniform(t0: f64, dt: f64, steps: usize) -> Self {
        TimeGrid::Uniform { t0, dt, steps }
    }

    pub fn explicit(times: Vec<f64>) -> Self {
        TimeGrid::Explicit { times }
    }

    /// `n` evenly spaced samples over `[start, stop]`, both endpoints included.
    pub fn linspace(start: f64, stop: f64, n: usize) -> Self {
        let times = match n {
            0 => Vec::new(),
            1 => vec![start],
            _ => {
                let step = (stop - start) / (n - 1) as f64;
                let mut times: Vec<f64> = (0..n).map(|i| start + i as f64 * step).collect();
                times[n - 1] = stop;
                times
            }
        };
        TimeGrid::Explicit { times }
    }

    /// Number of samples (equals the length of the trajectory it produces).
    pub fn len(&self) -> usize {
        match self {
            TimeGrid::Uniform { steps, .. } => steps + 1,
            TimeGrid::Explicit { times } => times.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Time of sample `i`. Uniform grids multiply rather than accumulate, so
    /// late samples carry no summation drift.
    pub fn time(&self, i: usize) -> f64 {
        match self {
            TimeGrid::Uniform { t0, dt, .. } => t0 + i as f64 * dt,
            TimeGrid::Explicit { times } => times[i],
        }
    }

    /// Width of interval `i` (from sample `i` to `i + 1`).
    pub fn step_size(&self, i: usize) -> f64 {
        match self {
            TimeGrid::Uniform { dt, .. } => *dt,
            TimeGrid::Explicit { times } => times[i + 1] - times[i],
        }
    }

    pub fn first(&self) -> Option<f64> {
        (!self.is_empty()).then(|| self.time(0))
    }

    pub fn last(&self) -> Option<f64> {
        (!self.is_empty()).then(|| self.time(self.len() - 1))
    }

    pub fn iter(&self) -> impl Iterator<Item = f64> + '_ {
        (0..self.len()).map(move |i| self.time(i))
    }

    /// Reject grids an integrator cannot start from.
    pub fn validate(&self) -> OdeResult<()> {
        match self {
            TimeGrid::Uniform { t0, dt, .. } => {
                if !t0.is_finite() {
                    return Err(OdeError::NonFiniteTime {
                        index: 0,
                        value: *t0,
                    });
                }
                if !dt.is_finite() || *dt <= 0.0 {
                    return Err(OdeError::InvalidStep { dt: *dt });
                }
                // Rounding can collapse or overflow generated times.
                let mut prev = *t0;
                for index in 1..self.len() {
                    let next = self.time(index);
                    if !next.is_finite() {
                        return Err(OdeError::NonFiniteTime { index, value: next });
                    }
                    if next <= prev {
                        return Err(OdeError::NonIncreasingTime { index, prev, next });
                    }
                    prev = next;
                }
            }
            TimeGrid::Explicit { times } => {
                if times.is_empty() {
                    return Err(OdeError::EmptyTimeGrid);
                }
                if let Some((index, &value)) =
                    times.iter().enumerate().find(|(_, t)| !t.is_finite())
                {
                    return Err(OdeError::NonFiniteTime { index, value });
                }
                for (i, pair) in times.windows(2).enumerate() {
                    if pair[1] <= pair[0] {
                        return Err(OdeError::NonIncreasingTime {
                            index: i + 1,
                            prev: pair[0],
                            next: pair[1],
                        });
                    }
                }
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
