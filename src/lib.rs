//! Numerical integration of the Lorenz attractor and the Lotka-Volterra
//! predator-prey model.
//!
//! Each system is a [`VectorField`](dynamics::VectorField); an
//! [`Integrator`](sim::Integrator) turns it into a [`Trajectory`](sim::Trajectory)
//! sampled on a [`TimeGrid`](sim::TimeGrid), and a [`Renderer`](io::Renderer)
//! consumes the result.

pub mod config;
pub mod dynamics;
pub mod error;
pub mod io;
pub mod sim;

pub use config::{FixedMethod, LorenzConfig, LotkaVolterraConfig, SimConfig};
pub use dynamics::{FnField, Lorenz, LorenzParams, LotkaVolterra, LotkaVolterraParams, VectorField};
pub use error::{OdeError, OdeResult};
pub use io::Renderer;
pub use sim::{Adams, AdamsOptions, FixedStep, Integrator, Pipeline, TimeGrid, Trajectory};
