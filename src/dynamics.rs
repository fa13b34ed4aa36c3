pub mod lorenz;
pub mod lotka_volterra;

use nalgebra::DVector;

pub use lorenz::{Lorenz, LorenzParams};
pub use lotka_volterra::{LotkaVolterra, LotkaVolterraParams};

// ---------------------------------------------------------------------------
// Vector field abstraction
// ---------------------------------------------------------------------------

/// Right-hand side of an autonomous or time-dependent ODE system `y' = f(t, y)`.
///
/// Implementations are pure: no internal state, no error conditions. Non-finite
/// inputs produce non-finite outputs.
pub trait VectorField {
    /// Number of state components.
    fn dim(&self) -> usize;

    /// Instantaneous derivative at `(t, y)`. `y.len()` equals `self.dim()`.
    fn eval(&self, t: f64, y: &DVector<f64>) -> DVector<f64>;

    /// Component labels, used by renderers for column and axis names.
    fn labels(&self) -> Vec<String> {
        (0..self.dim()).map(|i| format!("y{i}")).collect()
    }
}

/// Adapter turning a closure into a [`VectorField`].
pub struct FnField<F> {
    dim: usize,
    f: F,
}

impl<F> FnField<F>
where
    F: Fn(f64, &DVector<f64>) -> DVector<f64>,
{
    pub fn new(dim: usize, f: F) -> Self {
        Self { dim, f }
    }
}

impl<F> VectorField for FnField<F>
where
    F: Fn(f64, &DVector<f64>) -> DVector<f64>,
{
    fn dim(&self) -> usize {
        self.dim
    }

    fn eval(&self, t: f64, y: &DVector<f64>) -> DVector<f64> {
        (self.f)(t, y)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
