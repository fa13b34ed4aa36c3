use nalgebra::DVector;
use tracing::info_span;

use super::adams::Adams;
use super::grid::TimeGrid;
use super::integrator::{FixedStep, Integrator};
use super::trajectory::Trajectory;
use crate::config::{FixedMethod, LorenzConfig, LotkaVolterraConfig};
use crate::dynamics::{Lorenz, LotkaVolterra, VectorField};
use crate::error::OdeResult;
use crate::io::Renderer;

// ---------------------------------------------------------------------------
// Field + integrator + initial condition + grid, bound at construction
// ---------------------------------------------------------------------------

/// A complete integration setup. Nothing in it changes between runs, so
/// repeated calls to [`Pipeline::run`] produce identical trajectories.
pub struct Pipeline {
    name: String,
    field: Box<dyn VectorField>,
    integrator: Box<dyn Integrator>,
    initial: DVector<f64>,
    grid: TimeGrid,
}

impl Pipeline {
    pub fn new(
        name: impl Into<String>,
        field: impl VectorField + 'static,
        integrator: impl Integrator + 'static,
        initial: DVector<f64>,
        grid: TimeGrid,
    ) -> Self {
        Self {
            name: name.into(),
            field: Box::new(field),
            integrator: Box::new(integrator),
            initial,
            grid,
        }
    }

    /// Lorenz attractor on a uniform grid with a fixed-step method
    /// (explicit Euler unless configured otherwise).
    pub fn lorenz(cfg: &LorenzConfig) -> Self {
        let field = Lorenz::new(cfg.params);
        let initial = DVector::from_column_slice(&cfg.initial);
        match cfg.method {
            FixedMethod::Euler => {
                Self::new("Lorenz Attractor", field, FixedStep::euler(), initial, cfg.grid())
            }
            FixedMethod::Rk4 => {
                Self::new("Lorenz Attractor", field, FixedStep::rk4(), initial, cfg.grid())
            }
        }
    }

    /// Predator-prey populations sampled on an explicit grid by the adaptive
    /// Adams solver.
    pub fn lotka_volterra(cfg: &LotkaVolterraConfig) -> Self {
        Self::new(
            "Lotka-Volterra",
            LotkaVolterra::new(cfg.params),
            Adams::new(cfg.solver.clone()),
            DVector::from_column_slice(&cfg.initial),
            cfg.grid(),
        )
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn field(&self) -> &dyn VectorField {
        self.field.as_ref()
    }

    pub fn integrator(&self) -> &dyn Integrator {
        self.integrator.as_ref()
    }

    pub fn initial(&self) -> &DVector<f64> {
        &self.initial
    }

    pub fn grid(&self) -> &TimeGrid {
        &self.grid
    }

    pub fn run(&self) -> OdeResult<Trajectory> {
        let _span = info_span!(
            "pipeline",
            name = %self.name,
            method = self.integrator.name(),
            samples = self.grid.len()
        )
        .entered();
        self.integrator
            .integrate(self.field.as_ref(), &self.initial, &self.grid)
    }

    /// Run, hand the trajectory to `renderer`, and give it back to the caller.
    pub fn run_into(&self, renderer: &mut dyn Renderer) -> OdeResult<Trajectory> {
        let traj = self.run()?;
        renderer.render(&self.name, &self.field.labels(), &traj)?;
        Ok(traj)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
