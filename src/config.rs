//! Serializable run configuration. Defaults reproduce the two canonical
//! scenarios: a 5000-step Euler Lorenz run and a 1000-sample predator-prey run.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::dynamics::{LorenzParams, LotkaVolterraParams};
use crate::error::OdeResult;
use crate::sim::{AdamsOptions, TimeGrid};

/// Fixed-step method used by the Lorenz pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FixedMethod {
    #[default]
    Euler,
    Rk4,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LorenzConfig {
    pub params: LorenzParams,
    pub initial: [f64; 3],
    pub t0: f64,
    pub dt: f64,
    pub steps: usize,
    pub method: FixedMethod,
}

impl Default for LorenzConfig {
    fn default() -> Self {
        Self {
            params: LorenzParams::default(),
            initial: [1.0, 1.0, 1.0],
            t0: 0.0,
            dt: 0.01,
            steps: 5000,
            method: FixedMethod::Euler,
        }
    }
}

impl LorenzConfig {
    pub fn grid(&self) -> TimeGrid {
        TimeGrid::uniform(self.t0, self.dt, self.steps)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LotkaVolterraConfig {
    pub params: LotkaVolterraParams,
    /// `[prey, predator]` at the first sample time.
    pub initial: [f64; 2],
    pub t_start: f64,
    pub t_stop: f64,
    pub samples: usize,
    /// Explicit sample times; overrides `t_start`/`t_stop`/`samples` when set.
    pub times: Option<Vec<f64>>,
    pub solver: AdamsOptions,
}

impl Default for LotkaVolterraConfig {
    fn default() -> Self {
        Self {
            params: LotkaVolterraParams::default(),
            initial: [2.0, 2.0],
            t_start: 0.0,
            t_stop: 15.0,
            samples: 1000,
            times: None,
            solver: AdamsOptions::default(),
        }
    }
}

impl LotkaVolterraConfig {
    pub fn grid(&self) -> TimeGrid {
        match &self.times {
            Some(times) => TimeGrid::explicit(times.clone()),
            None => TimeGrid::linspace(self.t_start, self.t_stop, self.samples),
        }
    }
}

/// Both pipelines' settings, as loaded by the `phase-flow` binary.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    pub lorenz: LorenzConfig,
    pub lotka_volterra: LotkaVolterraConfig,
}

impl SimConfig {
    pub fn from_json_str(json: &str) -> OdeResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file(path: impl AsRef<Path>) -> OdeResult<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
