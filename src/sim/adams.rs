//! Variable-step, variable-order Adams predictor-corrector.
//!
//! Each step of order `k` predicts with Adams-Bashforth over the last `k`
//! derivative samples, evaluates the field at the prediction, then corrects
//! with Adams-Moulton over those samples plus the new one (PECE). The
//! difference between corrector and predictor is the local error estimate
//! that drives both step-size and order selection; the corrected value is
//! carried forward.
//!
//! Samples live at arbitrary, non-uniform times, so the integration weights
//! are recomputed every step by integrating the Lagrange basis through
//! Gauss-Legendre quadrature. The corrector polynomial also serves as dense
//! output, which is how requested grid times between internal steps are
//! filled without forcing the solver onto the grid.

use std::collections::VecDeque;

use nalgebra::DVector;
use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use super::grid::TimeGrid;
use super::integrator::{check_inputs, report_run, Integrator};
use super::trajectory::Trajectory;
use crate::dynamics::VectorField;
use crate::error::{OdeError, OdeResult};

/// Highest order supported (Adams-Bashforth predictor order).
pub const MAX_ORDER: usize = 12;

const SAFETY: f64 = 0.9;
const MAX_GROWTH: f64 = 2.0;
const MIN_SHRINK: f64 = 0.2;

// 8-point Gauss-Legendre rule on [-1, 1]; exact for polynomials of degree <= 15,
// enough for the degree-12 corrector basis at MAX_ORDER.
const GAUSS_NODES: [f64; 8] = [
    -0.960_289_856_497_536_3,
    -0.796_666_477_413_626_7,
    -0.525_532_409_916_329_0,
    -0.183_434_642_495_649_8,
    0.183_434_642_495_649_8,
    0.525_532_409_916_329_0,
    0.796_666_477_413_626_7,
    0.960_289_856_497_536_3,
];
const GAUSS_WEIGHTS: [f64; 8] = [
    0.101_228_536_290_376_3,
    0.222_381_034_453_374_5,
    0.313_706_645_877_887_3,
    0.362_683_783_378_362_0,
    0.362_683_783_378_362_0,
    0.313_706_645_877_887_3,
    0.222_381_034_453_374_5,
    0.101_228_536_290_376_3,
];

// ---------------------------------------------------------------------------
// Options and statistics
// ---------------------------------------------------------------------------

/// Error-control settings. Defaults: rtol 1e-6, atol 1e-12.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AdamsOptions {
    pub rtol: f64,
    /// Absolute floor of the per-component error scale; must be positive.
    pub atol: f64,
    pub max_order: usize,
    /// Initial step; estimated from the field when `None`.
    pub first_step: Option<f64>,
    /// Upper bound on internal steps; the whole span when `None`.
    pub max_step: Option<f64>,
    /// Budget of attempted internal steps (accepted + rejected) per run.
    pub max_steps: usize,
}

impl Default for AdamsOptions {
    fn default() -> Self {
        Self {
            rtol: 1e-6,
            atol: 1e-12,
            max_order: MAX_ORDER,
            first_step: None,
            max_step: None,
            max_steps: 100_000,
        }
    }
}

impl AdamsOptions {
    pub fn validate(&self) -> OdeResult<()> {
        if !self.rtol.is_finite() || self.rtol < 0.0 {
            return Err(OdeError::InvalidOption {
                what: "rtol must be finite and >= 0",
            });
        }
        // A zero error scale turns an exactly-zero component into 0/0.
        if !self.atol.is_finite() || self.atol <= 0.0 {
            return Err(OdeError::InvalidOption {
                what: "atol must be finite and > 0",
            });
        }
        if !(1..=MAX_ORDER).contains(&self.max_order) {
            return Err(OdeError::InvalidOption {
                what: "max_order must be in 1..=12",
            });
        }
        let valid_step = |h: Option<f64>| h.map_or(true, |h| h.is_finite() && h > 0.0);
        if !valid_step(self.first_step) || !valid_step(self.max_step) {
            return Err(OdeError::InvalidOption {
                what: "step bounds must be finite and > 0",
            });
        }
        if self.max_steps == 0 {
            return Err(OdeError::InvalidOption {
                what: "max_steps must be >= 1",
            });
        }
        Ok(())
    }
}

/// Work counters for one run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdamsStats {
    pub fn_evals: usize,
    pub accepted: usize,
    pub rejected: usize,
    pub highest_order: usize,
}

// ---------------------------------------------------------------------------
// Quadrature helpers
// ---------------------------------------------------------------------------

/// Weights `w` with `sum_j w[j] p(nodes[j]) == integral of p over [a, b]`
/// for every polynomial `p` of degree `< nodes.len()`.
fn lagrange_weights(nodes: &[f64], a: f64, b: f64) -> Vec<f64> {
    let half = 0.5 * (b - a);
    let mid = 0.5 * (a + b);
    let mut w = vec![0.0; nodes.len()];
    for (x, gw) in GAUSS_NODES.iter().zip(GAUSS_WEIGHTS.iter()) {
        let s = mid + half * x;
        for (j, wj) in w.iter_mut().enumerate() {
            let basis: f64 = nodes
                .iter()
                .enumerate()
                .filter(|&(m, _)| m != j)
                .map(|(_, &tm)| (s - tm) / (nodes[j] - tm))
                .product();
            *wj += half * gw * basis;
        }
    }
    w
}

/// `base + sum_j w[j] * values[j]`.
fn combine<'a>(
    base: &DVector<f64>,
    weights: &[f64],
    values: impl Iterator<Item = &'a DVector<f64>>,
) -> DVector<f64> {
    let mut out = base.clone();
    for (w, v) in weights.iter().zip(values) {
        out.axpy(*w, v, 1.0);
    }
    out
}

/// Weighted RMS norm of `diff`, scaled per component by
/// `atol + rtol * max(|a_i|, |b_i|)`.
fn error_norm(diff: &DVector<f64>, a: &DVector<f64>, b: &DVector<f64>, opts: &AdamsOptions) -> f64 {
    let n = diff.len().max(1) as f64;
    let sum: f64 = diff
        .iter()
        .zip(a.iter().zip(b.iter()))
        .map(|(d, (ai, bi))| {
            let scale = opts.atol + opts.rtol * ai.abs().max(bi.abs());
            (d / scale).powi(2)
        })
        .sum();
    (sum / n).sqrt()
}

/// Step-size multiplier suggested by an error estimate of a method of `order`.
fn step_factor(err: f64, order: usize) -> f64 {
    if err == 0.0 {
        return MAX_GROWTH;
    }
    SAFETY * err.powf(-1.0 / (order as f64 + 1.0))
}

// ---------------------------------------------------------------------------
// Solver
// ---------------------------------------------------------------------------

/// Accepted solution point kept in the back-difference history.
struct Node {
    t: f64,
    y: DVector<f64>,
    f: DVector<f64>,
}

/// Adaptive Adams solver. Output samples come from dense interpolation, so
/// the grid only decides where states are recorded, not where steps land
/// (except the final grid time, which is hit exactly).
#[derive(Debug, Clone, Default)]
pub struct Adams {
    pub options: AdamsOptions,
}

impl Adams {
    pub fn new(options: AdamsOptions) -> Self {
        Self { options }
    }

    /// Starting step, following Hairer, Norsett & Wanner's `hinit` for an
    /// order-1 method.
    fn initial_step(
        &self,
        field: &dyn VectorField,
        t0: f64,
        y0: &DVector<f64>,
        f0: &DVector<f64>,
        stats: &mut AdamsStats,
    ) -> f64 {
        let d0 = error_norm(y0, y0, y0, &self.options);
        let d1 = error_norm(f0, y0, y0, &self.options);
        let h0 = if d0 < 1e-5 || d1 < 1e-5 { 1e-6 } else { 0.01 * d0 / d1 };

        let y1 = y0 + f0 * h0;
        let f1 = field.eval(t0 + h0, &y1);
        stats.fn_evals += 1;
        let d2 = error_norm(&(f1 - f0), y0, y0, &self.options) / h0;

        let dmax = d1.max(d2);
        let h1 = if dmax <= 1e-15 {
            (h0 * 1e-3).max(1e-6)
        } else {
            (0.01 / dmax).sqrt()
        };
        let h = (100.0 * h0).min(h1);
        if h.is_finite() && h > 0.0 {
            h
        } else {
            1e-6
        }
    }

    /// Integrate and also return the work counters.
    pub fn integrate_with_stats(
        &self,
        field: &dyn VectorField,
        y0: &DVector<f64>,
        grid: &TimeGrid,
    ) -> OdeResult<(Trajectory, AdamsStats)> {
        check_inputs(field, y0, grid)?;
        self.options.validate()?;
        let opts = &self.options;

        let n_out = grid.len();
        let dim = field.dim();
        let mut traj = Trajectory::with_capacity(dim, n_out);
        let mut stats = AdamsStats::default();

        let t0 = grid.time(0);
        traj.push(t0, y0.clone());
        if n_out == 1 {
            return Ok((traj, stats));
        }

        let t_end = grid.time(n_out - 1);
        let span = t_end - t0;
        let max_step = opts.max_step.map_or(span, |h| h.min(span));

        let f0 = field.eval(t0, y0);
        stats.fn_evals += 1;
        let mut next_out = 1;

        if y0.iter().chain(f0.iter()).any(|v| !v.is_finite()) {
            poison_remaining(&mut traj, grid, next_out, dim);
            report_run(self.name(), &traj);
            return Ok((traj, stats));
        }

        let mut h = match opts.first_step {
            Some(h) => h,
            None => self.initial_step(field, t0, y0, &f0, &mut stats),
        }
        .min(max_step);

        let mut history: VecDeque<Node> = VecDeque::with_capacity(opts.max_order + 2);
        history.push_front(Node {
            t: t0,
            y: y0.clone(),
            f: f0,
        });

        let mut order = 1;
        let mut steps_at_order = 0;
        let mut consecutive_rejects = 0;

        loop {
            if stats.accepted + stats.rejected >= opts.max_steps {
                return Err(OdeError::MaxStepsExceeded {
                    max_steps: opts.max_steps,
                    t: history[0].t,
                });
            }

            let t = history[0].t;
            let h_min = 16.0 * f64::EPSILON * t.abs().max(t_end.abs()).max(span);
            let last = t + h >= t_end;
            let t_new = if last { t_end } else { t + h };
            let h_step = t_new - t;

            let k = order.min(history.len());
            let current = &history[0];

            // Predict (Adams-Bashforth, k samples).
            let pred_nodes: Vec<f64> = history.iter().take(k).map(|n| n.t).collect();
            let w_pred = lagrange_weights(&pred_nodes, t, t_new);
            let y_pred = combine(&current.y, &w_pred, history.iter().map(|n| &n.f));
            let f_pred = field.eval(t_new, &y_pred);
            stats.fn_evals += 1;

            // Correct (Adams-Moulton, new sample plus k old ones).
            let mut corr_nodes = Vec::with_capacity(k + 1);
            corr_nodes.push(t_new);
            corr_nodes.extend_from_slice(&pred_nodes);
            let w_corr = lagrange_weights(&corr_nodes, t, t_new);
            let corr_values = || std::iter::once(&f_pred).chain(history.iter().map(|n| &n.f));
            let y_corr = combine(&current.y, &w_corr, corr_values());

            let err = error_norm(&(&y_corr - &y_pred), &current.y, &y_corr, opts);

            if !err.is_finite() {
                if h_step * MIN_SHRINK >= h_min {
                    stats.rejected += 1;
                    trace!(t, h = h_step, "non-finite error estimate, shrinking step");
                    h = h_step * MIN_SHRINK;
                    continue;
                }
                warn!(t, "step cannot shrink further; poisoning remaining samples");
                poison_remaining(&mut traj, grid, next_out, dim);
                break;
            }

            if err > 1.0 {
                stats.rejected += 1;
                consecutive_rejects += 1;
                trace!(t, h = h_step, order = k, err, "step rejected");
                h = h_step * step_factor(err, k).max(MIN_SHRINK);
                if consecutive_rejects >= 2 && order > 1 {
                    order -= 1;
                    steps_at_order = 0;
                }
                if h < h_min {
                    return Err(OdeError::StepSizeUnderflow { t, h });
                }
                continue;
            }

            // Accepted: record any grid samples in (t, t_new] from the
            // corrector polynomial, then pick the next order and step.
            stats.accepted += 1;
            consecutive_rejects = 0;
            stats.highest_order = stats.highest_order.max(k);

            while next_out < n_out && grid.time(next_out) <= t_new {
                let t_out = grid.time(next_out);
                let y_out = if t_out == t_new {
                    y_corr.clone()
                } else {
                    let w = lagrange_weights(&corr_nodes, t, t_out);
                    combine(&current.y, &w, corr_values())
                };
                traj.push(t_out, y_out);
                next_out += 1;
            }

            if last || next_out == n_out {
                break;
            }

            let mut best_order = k;
            let mut best_factor = step_factor(err, k);
            if k > 1 {
                let w = lagrange_weights(&pred_nodes[..k - 1], t, t_new);
                let y_low = combine(&current.y, &w, history.iter().map(|n| &n.f));
                let err_low = error_norm(&(&y_corr - &y_low), &current.y, &y_corr, opts);
                let factor = step_factor(err_low, k - 1);
                if factor > best_factor {
                    best_order = k - 1;
                    best_factor = factor;
                }
            }
            if k < opts.max_order && steps_at_order + 1 >= k + 1 && history.len() > k {
                let high_nodes: Vec<f64> = history.iter().take(k + 1).map(|n| n.t).collect();
                let w = lagrange_weights(&high_nodes, t, t_new);
                let y_high = combine(&current.y, &w, history.iter().map(|n| &n.f));
                let err_high = error_norm(&(&y_corr - &y_high), &current.y, &y_corr, opts);
                let factor = step_factor(err_high, k + 1);
                if factor > best_factor {
                    best_order = k + 1;
                    best_factor = factor;
                }
            }

            let f_new = field.eval(t_new, &y_corr);
            stats.fn_evals += 1;
            history.push_front(Node {
                t: t_new,
                y: y_corr,
                f: f_new,
            });
            history.truncate(opts.max_order + 1);

            if best_order != order {
                order = best_order;
                steps_at_order = 0;
            } else {
                steps_at_order += 1;
            }
            h = (h_step * best_factor.clamp(MIN_SHRINK, MAX_GROWTH)).min(max_step);
        }

        debug!(
            fn_evals = stats.fn_evals,
            accepted = stats.accepted,
            rejected = stats.rejected,
            highest_order = stats.highest_order,
            "adams run statistics"
        );
        report_run(self.name(), &traj);
        Ok((traj, stats))
    }
}

/// Fill every sample from `from` onwards with NaN states.
fn poison_remaining(traj: &mut Trajectory, grid: &TimeGrid, from: usize, dim: usize) {
    for i in from..grid.len() {
        traj.push(grid.time(i), DVector::from_element(dim, f64::NAN));
    }
}

impl Integrator for Adams {
    fn name(&self) -> &'static str {
        "adams"
    }

    fn integrate(
        &self,
        field: &dyn VectorField,
        y0: &DVector<f64>,
        grid: &TimeGrid,
    ) -> OdeResult<Trajectory> {
        self.integrate_with_stats(field, y0, grid).map(|(traj, _)| traj)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
