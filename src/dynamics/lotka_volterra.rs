use nalgebra::{DVector, Vector2};
use serde::{Deserialize, Serialize};

use super::VectorField;

// ---------------------------------------------------------------------------
// Lotka-Volterra predator-prey system
// ---------------------------------------------------------------------------

/// Predator-prey rates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LotkaVolterraParams {
    pub a: f64,     // prey growth rate
    pub alpha: f64, // prey loss per predator encounter
    pub c: f64,     // predator death rate
    pub gamma: f64, // predator gain per prey encounter
}

impl Default for LotkaVolterraParams {
    fn default() -> Self {
        Self {
            a: 1.0,
            alpha: 0.5,
            c: 0.75,
            gamma: 0.25,
        }
    }
}

/// The Lotka-Volterra field over `[prey, predator]`:
///
///   prey'     =  a prey - alpha prey predator
///   predator' = -c predator + gamma prey predator
#[derive(Debug, Clone, Copy, Default)]
pub struct LotkaVolterra {
    pub params: LotkaVolterraParams,
}

impl LotkaVolterra {
    pub fn new(params: LotkaVolterraParams) -> Self {
        Self { params }
    }

    pub fn derivatives(&self, s: &Vector2<f64>) -> Vector2<f64> {
        let LotkaVolterraParams { a, alpha, c, gamma } = self.params;
        let (prey, predator) = (s.x, s.y);
        Vector2::new(
            a * prey - alpha * prey * predator,
            -c * predator + gamma * prey * predator,
        )
    }

    /// Coexistence equilibrium `(c / gamma, a / alpha)`.
    pub fn equilibrium(&self) -> Vector2<f64> {
        let p = self.params;
        Vector2::new(p.c / p.gamma, p.a / p.alpha)
    }

    /// Conserved quantity `gamma x - c ln x + alpha y - a ln y`.
    /// Only defined for strictly positive populations; NaN otherwise.
    pub fn first_integral(&self, s: &Vector2<f64>) -> f64 {
        let LotkaVolterraParams { a, alpha, c, gamma } = self.params;
        gamma * s.x - c * s.x.ln() + alpha * s.y - a * s.y.ln()
    }
}

impl VectorField for LotkaVolterra {
    fn dim(&self) -> usize {
        2
    }

    fn eval(&self, _t: f64, y: &DVector<f64>) -> DVector<f64> {
        let d = self.derivatives(&Vector2::new(y[0], y[1]));
        DVector::from_column_slice(d.as_slice())
    }

    fn labels(&self) -> Vec<String> {
        vec!["prey".into(), "predator".into()]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
