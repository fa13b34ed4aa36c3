pub mod adams;
pub mod grid;
pub mod integrator;
pub mod runner;
pub mod trajectory;

pub use adams::{Adams, AdamsOptions, AdamsStats};
pub use grid::TimeGrid;
pub use integrator::{FixedStep, ForwardEuler, Integrator, Rk4, Stepper};
pub use runner::Pipeline;
pub use trajectory::Trajectory;
