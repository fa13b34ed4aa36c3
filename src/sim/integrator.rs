use nalgebra::DVector;
use tracing::{debug, warn};

use super::grid::TimeGrid;
use super::trajectory::Trajectory;
use crate::dynamics::VectorField;
use crate::error::{OdeError, OdeResult};

// ---------------------------------------------------------------------------
// Integrator abstraction
// ---------------------------------------------------------------------------

/// Produces a trajectory sampled on `grid`, starting from `y0` at `grid.time(0)`.
///
/// The returned trajectory always has exactly `grid.len()` samples, and the
/// integrator keeps nothing once it returns.
pub trait Integrator {
    fn name(&self) -> &'static str;

    fn integrate(
        &self,
        field: &dyn VectorField,
        y0: &DVector<f64>,
        grid: &TimeGrid,
    ) -> OdeResult<Trajectory>;
}

/// Usage checks shared by every integrator.
pub(crate) fn check_inputs(
    field: &dyn VectorField,
    y0: &DVector<f64>,
    grid: &TimeGrid,
) -> OdeResult<()> {
    if y0.len() != field.dim() {
        return Err(OdeError::DimensionMismatch {
            expected: field.dim(),
            got: y0.len(),
        });
    }
    grid.validate()
}

/// Log a run's outcome; non-finite samples only earn a warning.
pub(crate) fn report_run(method: &str, traj: &Trajectory) {
    if let Some(index) = traj.first_non_finite() {
        warn!(
            method,
            index,
            t = traj.times()[index],
            "trajectory degenerated to non-finite values"
        );
    }
    debug!(method, samples = traj.len(), dim = traj.dim(), "integration finished");
}

// ---------------------------------------------------------------------------
// Single-step methods
// ---------------------------------------------------------------------------

/// One explicit step of a fixed-step method.
pub trait Stepper {
    fn name(&self) -> &'static str;

    /// Advance `y` from `t` to `t + h`.
    fn step(&self, field: &dyn VectorField, t: f64, y: &DVector<f64>, h: f64) -> DVector<f64>;
}

/// Explicit Euler: `y + h f(t, y)`. Local error O(h^2), global O(h).
#[derive(Debug, Clone, Copy, Default)]
pub struct ForwardEuler;

impl Stepper for ForwardEuler {
    fn name(&self) -> &'static str {
        "euler"
    }

    fn step(&self, field: &dyn VectorField, t: f64, y: &DVector<f64>, h: f64) -> DVector<f64> {
        y + field.eval(t, y) * h
    }
}

/// Classical 4th-order Runge-Kutta.
#[derive(Debug, Clone, Copy, Default)]
pub struct Rk4;

impl Stepper for Rk4 {
    fn name(&self) -> &'static str {
        "rk4"
    }

    fn step(&self, field: &dyn VectorField, t: f64, y: &DVector<f64>, h: f64) -> DVector<f64> {
        let k1 = field.eval(t, y);
        let k2 = field.eval(t + h * 0.5, &(y + &k1 * (h * 0.5)));
        let k3 = field.eval(t + h * 0.5, &(y + &k2 * (h * 0.5)));
        let k4 = field.eval(t + h, &(y + &k3 * h));

        y + (k1 + k2 * 2.0 + k3 * 2.0 + k4) * (h / 6.0)
    }
}

// ---------------------------------------------------------------------------
// Fixed-step driver
// ---------------------------------------------------------------------------

/// Runs a [`Stepper`] across every grid interval, optionally splitting each
/// interval into `substeps` equal steps. No error estimate, no adaptation.
#[derive(Debug, Clone)]
pub struct FixedStep<S> {
    pub stepper: S,
    pub substeps: usize,
}

impl<S: Stepper> FixedStep<S> {
    pub fn new(stepper: S) -> Self {
        Self {
            stepper,
            substeps: 1,
        }
    }

    pub fn with_substeps(mut self, substeps: usize) -> Self {
        self.substeps = substeps;
        self
    }
}

impl FixedStep<ForwardEuler> {
    pub fn euler() -> Self {
        Self::new(ForwardEuler)
    }
}

impl FixedStep<Rk4> {
    pub fn rk4() -> Self {
        Self::new(Rk4)
    }
}

impl<S: Stepper> Integrator for FixedStep<S> {
    fn name(&self) -> &'static str {
        self.stepper.name()
    }

    fn integrate(
        &self,
        field: &dyn VectorField,
        y0: &DVector<f64>,
        grid: &TimeGrid,
    ) -> OdeResult<Trajectory> {
        check_inputs(field, y0, grid)?;
        if self.substeps == 0 {
            return Err(OdeError::InvalidOption {
                what: "substeps must be >= 1",
            });
        }

        let n = grid.len();
        let mut traj = Trajectory::with_capacity(field.dim(), n);
        let mut y = y0.clone();
        traj.push(grid.time(0), y.clone());

        for i in 0..n - 1 {
            let t_start = grid.time(i);
            let h = grid.step_size(i) / self.substeps as f64;
            for k in 0..self.substeps {
                y = self.stepper.step(field, t_start + k as f64 * h, &y, h);
            }
            traj.push(grid.time(i + 1), y.clone());
        }

        report_run(self.name(), &traj);
        Ok(traj)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dynamics::{FnField, Lorenz};

    fn decay() -> FnField<impl Fn(f64, &DVector<f64>) -> DVector<f64>> {
        FnField::new(1, |_t, y: &DVector<f64>| -y)
    }

    #[test]
    fn euler_step_matches_formula() {
        let y = DVector::from_vec(vec![1.0, 1.0, 1.0]);
        let next = ForwardEuler.step(&Lorenz::default(), 0.0, &y, 0.01);
        assert_eq!(next[0], 1.0);
        assert_eq!(next[1], 1.0 + 26.0 * 0.01);
        assert_eq!(next[2], 1.0 + (1.0 - 8.0 / 3.0) * 0.01);
    }

    #[test]
    fn euler_first_order_convergence() {
        // y' = -y, y(1) = e^-1. Halving h roughly halves the error.
        let field = decay();
        let y0 = DVector::from_vec(vec![1.0]);
        let exact = (-1.0_f64).exp();
        let err = |steps: usize| {
            let grid = TimeGrid::uniform(0.0, 1.0 / steps as f64, steps);
            let traj = FixedStep::euler().integrate(&field, &y0, &grid).unwrap();
            (traj.last().unwrap().1[0] - exact).abs()
        };
        let ratio = err(100) / err(200);
        assert!((ratio - 2.0).abs() < 0.1, "ratio = {ratio}");
    }

    #[test]
    fn rk4_fourth_order_convergence() {
        let field = decay();
        let y0 = DVector::from_vec(vec![1.0]);
        let exact = (-1.0_f64).exp();
        let err = |steps: usize| {
            let grid = TimeGrid::uniform(0.0, 1.0 / steps as f64, steps);
            let traj = FixedStep::rk4().integrate(&field, &y0, &grid).unwrap();
            (traj.last().unwrap().1[0] - exact).abs()
        };
        let ratio = err(10) / err(20);
        assert!((ratio - 16.0).abs() < 1.5, "ratio = {ratio}");
    }

    #[test]
    fn substeps_refine_explicit_grid() {
        let field = decay();
        let y0 = DVector::from_vec(vec![1.0]);
        let grid = TimeGrid::explicit(vec![0.0, 0.5, 1.0]);
        let coarse = FixedStep::euler().integrate(&field, &y0, &grid).unwrap();
        let fine = FixedStep::euler()
            .with_substeps(50)
            .integrate(&field, &y0, &grid)
            .unwrap();
        let exact = (-1.0_f64).exp();
        assert_eq!(fine.len(), 3);
        let fine_err = (fine.last().unwrap().1[0] - exact).abs();
        let coarse_err = (coarse.last().unwrap().1[0] - exact).abs();
        assert!(fine_err < coarse_err);
    }

    #[test]
    fn single_sample_grid_returns_initial_condition() {
        let y0 = DVector::from_vec(vec![1.0, 1.0, 1.0]);
        let traj = FixedStep::euler()
            .integrate(&Lorenz::default(), &y0, &TimeGrid::uniform(0.0, 0.01, 0))
            .unwrap();
        assert_eq!(traj.len(), 1);
        assert_eq!(traj.first().unwrap().1, &y0);
    }

    #[test]
    fn dimension_mismatch_is_usage_error() {
        let y0 = DVector::from_vec(vec![1.0, 1.0]);
        let err = FixedStep::euler()
            .integrate(&Lorenz::default(), &y0, &TimeGrid::uniform(0.0, 0.01, 10))
            .unwrap_err();
        assert!(matches!(err, OdeError::DimensionMismatch { expected: 3, got: 2 }));
    }

    #[test]
    fn zero_substeps_rejected() {
        let y0 = DVector::from_vec(vec![1.0]);
        let err = FixedStep::euler()
            .with_substeps(0)
            .integrate(&decay(), &y0, &TimeGrid::uniform(0.0, 0.1, 3))
            .unwrap_err();
        assert!(err.is_usage());
    }

    #[test]
    fn nan_initial_state_propagates() {
        let y0 = DVector::from_vec(vec![f64::NAN, 1.0, 1.0]);
        let traj = FixedStep::euler()
            .integrate(&Lorenz::default(), &y0, &TimeGrid::uniform(0.0, 0.01, 5))
            .unwrap();
        assert_eq!(traj.len(), 6);
        assert!(traj.states()[5].iter().all(|v| v.is_nan()));
    }
}
