use nalgebra::{DVector, Vector3};
use serde::{Deserialize, Serialize};

use super::VectorField;

// ---------------------------------------------------------------------------
// Lorenz system
// ---------------------------------------------------------------------------

/// Lorenz parameters. Classical chaotic regime: sigma=10, rho=28, beta=8/3.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LorenzParams {
    pub sigma: f64, // Prandtl number
    pub rho: f64,   // Rayleigh number
    pub beta: f64,  // geometric factor
}

impl Default for LorenzParams {
    fn default() -> Self {
        Self {
            sigma: 10.0,
            rho: 28.0,
            beta: 8.0 / 3.0,
        }
    }
}

/// The Lorenz field:
///
///   dx/dt = sigma (y - x)
///   dy/dt = x (rho - z) - y
///   dz/dt = x y - beta z
#[derive(Debug, Clone, Copy, Default)]
pub struct Lorenz {
    pub params: LorenzParams,
}

impl Lorenz {
    pub fn new(params: LorenzParams) -> Self {
        Self { params }
    }

    /// Derivative of a single (x, y, z) point.
    pub fn derivatives(&self, s: &Vector3<f64>) -> Vector3<f64> {
        let LorenzParams { sigma, rho, beta } = self.params;
        Vector3::new(
            sigma * (s.y - s.x),
            s.x * (rho - s.z) - s.y,
            s.x * s.y - beta * s.z,
        )
    }

    /// Equilibria: the origin, plus C+ and C- when rho > 1.
    pub fn fixed_points(&self) -> Vec<Vector3<f64>> {
        let LorenzParams { rho, beta, .. } = self.params;
        if rho <= 1.0 {
            return vec![Vector3::zeros()];
        }
        let c = (beta * (rho - 1.0)).sqrt();
        vec![
            Vector3::zeros(),
            Vector3::new(c, c, rho - 1.0),
            Vector3::new(-c, -c, rho - 1.0),
        ]
    }

    /// Divergence of the flow, constant everywhere: -(sigma + 1 + beta).
    /// Negative means phase-space volumes contract.
    pub fn divergence(&self) -> f64 {
        -(self.params.sigma + 1.0 + self.params.beta)
    }
}

impl VectorField for Lorenz {
    fn dim(&self) -> usize {
        3
    }

    fn eval(&self, _t: f64, y: &DVector<f64>) -> DVector<f64> {
        let d = self.derivatives(&Vector3::new(y[0], y[1], y[2]));
        DVector::from_column_slice(d.as_slice())
    }

    fn labels(&self) -> Vec<String> {
        vec!["x".into(), "y".into(), "z".into()]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn origin_is_stationary_for_any_params() {
        for params in [
            LorenzParams::default(),
            LorenzParams {
                sigma: 3.5,
                rho: 0.2,
                beta: 11.0,
            },
            LorenzParams {
                sigma: -1.0,
                rho: 99.0,
                beta: 0.0,
            },
        ] {
            let d = Lorenz::new(params).derivatives(&Vector3::zeros());
            assert_eq!(d, Vector3::zeros());
        }
    }

    #[test]
    fn matches_hand_computed_derivative() {
        let l = Lorenz::default();
        let d = l.derivatives(&Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(d.x, 0.0);
        assert_eq!(d.y, 26.0);
        assert!((d.z - (1.0 - 8.0 / 3.0)).abs() < 1e-15);
    }

    #[test]
    fn nontrivial_fixed_points_are_stationary() {
        let l = Lorenz::default();
        let fps = l.fixed_points();
        assert_eq!(fps.len(), 3);
        for p in &fps {
            assert!(l.derivatives(p).norm() < 1e-12, "not stationary: {p:?}");
        }
        assert!((fps[1].x + fps[2].x).abs() < 1e-12);
    }

    #[test]
    fn only_origin_below_critical_rho() {
        let l = Lorenz::new(LorenzParams {
            rho: 0.5,
            ..Default::default()
        });
        assert_eq!(l.fixed_points().len(), 1);
    }

    #[test]
    fn flow_contracts_volume() {
        assert!(Lorenz::default().divergence() < 0.0);
    }

    #[test]
    fn eval_agrees_with_typed_derivative() {
        let l = Lorenz::default();
        let y = DVector::from_vec(vec![-3.0, 2.5, 17.0]);
        let d = l.eval(0.0, &y);
        let typed = l.derivatives(&Vector3::new(-3.0, 2.5, 17.0));
        assert_eq!(d.as_slice(), typed.as_slice());
    }

    #[test]
    fn nan_propagates() {
        let d = Lorenz::default().derivatives(&Vector3::new(f64::NAN, 1.0, 1.0));
        assert!(d.x.is_nan() && d.y.is_nan() && d.z.is_nan());
    }
}
