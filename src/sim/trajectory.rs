use nalgebra::DVector;

// ---------------------------------------------------------------------------
// Trajectory buffer
// ---------------------------------------------------------------------------

/// Ordered `(time, state)` samples produced by an integrator.
///
/// Every state has the same dimension. Non-finite values are stored as-is;
/// use [`Trajectory::first_non_finite`] to find where a run degenerated.
#[derive(Debug, Clone, PartialEq)]
pub struct Trajectory {
    dim: usize,
    times: Vec<f64>,
    states: Vec<DVector<f64>>,
}

impl Trajectory {
    pub fn new(dim: usize) -> Self {
        Self::with_capacity(dim, 0)
    }

    /// Pre-sized buffer, for when the sample count is known upfront.
    pub fn with_capacity(dim: usize, capacity: usize) -> Self {
        Self {
            dim,
            times: Vec::with_capacity(capacity),
            states: Vec::with_capacity(capacity),
        }
    }

    pub(crate) fn push(&mut self, t: f64, state: DVector<f64>) {
        debug_assert_eq!(state.len(), self.dim, "state dimension changed mid-trajectory");
        debug_assert!(
            self.times.last().map_or(true, |&last| t > last || t.is_nan()),
            "trajectory times must increase"
        );
        self.times.push(t);
        self.states.push(state);
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.times.len()
    }

    pub fn is_empty(&self) -> bool {
        self.times.is_empty()
    }

    pub fn times(&self) -> &[f64] {
        &self.times
    }

    pub fn states(&self) -> &[DVector<f64>] {
        &self.states
    }

    pub fn get(&self, i: usize) -> Option<(f64, &DVector<f64>)> {
        Some((*self.times.get(i)?, self.states.get(i)?))
    }

    pub fn first(&self) -> Option<(f64, &DVector<f64>)> {
        self.get(0)
    }

    pub fn last(&self) -> Option<(f64, &DVector<f64>)> {
        self.len().checked_sub(1).and_then(|i| self.get(i))
    }

    pub fn iter(&self) -> impl Iterator<Item = (f64, &DVector<f64>)> + '_ {
        self.times.iter().copied().zip(self.states.iter())
    }

    /// One component across all samples (e.g. every `x` of a Lorenz run).
    pub fn component(&self, index: usize) -> Vec<f64> {
        assert!(index < self.dim, "component {index} out of range for dim {}", self.dim);
        self.states.iter().map(|s| s[index]).collect()
    }

    /// Index of the first sample holding a NaN or infinite component.
    pub fn first_non_finite(&self) -> Option<usize> {
        self.states
            .iter()
            .position(|s| s.iter().any(|v| !v.is_finite()))
    }

    pub fn is_finite(&self) -> bool {
        self.first_non_finite().is_none()
    }

    /// Interior sample indices where `component` rises strictly into a value
    /// that the next sample does not exceed. A flat-topped peak is reported
    /// once, at its leading edge.
    pub fn local_maxima(&self, component: usize) -> Vec<usize> {
        let values = self.component(component);
        values
            .windows(3)
            .enumerate()
            .filter(|(_, w)| w[1] > w[0] && w[1] >= w[2])
            .map(|(i, _)| i + 1)
            .collect()
    }

    pub fn into_parts(self) -> (Vec<f64>, Vec<DVector<f64>>) {
        (self.times, self.states)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
