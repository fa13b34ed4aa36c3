//! Error types for integration runs, renderers and configuration loading.

use thiserror::Error;

/// Errors reported by integrators, renderers and config loading.
///
/// Non-finite states are deliberately absent: they are carried inside the
/// returned [`Trajectory`](crate::sim::Trajectory) instead.
#[derive(Error, Debug)]
pub enum OdeError {
    #[error("Time grid is empty: the initial condition needs a starting time")]
    EmptyTimeGrid,

    #[error("Time grid is not strictly increasing at index {index}: {prev} -> {next}")]
    NonIncreasingTime { index: usize, prev: f64, next: f64 },

    #[error("Non-finite time value at index {index}: {value}")]
    NonFiniteTime { index: usize, value: f64 },

    #[error("Invalid step size: {dt} (must be finite and > 0)")]
    InvalidStep { dt: f64 },

    #[error("Dimension mismatch: field expects {expected} components, initial state has {got}")]
    DimensionMismatch { expected: usize, got: usize },

    #[error("Invalid option: {what}")]
    InvalidOption { what: &'static str },

    #[error("Step size underflow at t={t}: h={h}")]
    StepSizeUnderflow { t: f64, h: f64 },

    #[error("Exceeded {max_steps} internal steps before reaching t={t}")]
    MaxStepsExceeded { max_steps: usize, t: f64 },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl OdeError {
    /// True for malformed inputs the caller can fix (grid, dimensions, options).
    pub fn is_usage(&self) -> bool {
        matches!(
            self,
            OdeError::EmptyTimeGrid
                | OdeError::NonIncreasingTime { .. }
                | OdeError::NonFiniteTime { .. }
                | OdeError::InvalidStep { .. }
                | OdeError::DimensionMismatch { .. }
                | OdeError::InvalidOption { .. }
        )
    }
}

pub type OdeResult<T> = Result<T, OdeError>;
