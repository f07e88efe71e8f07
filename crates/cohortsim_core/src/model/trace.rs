//! Cohort trace and its numerical diagnostics

use serde::{Deserialize, Serialize};

use super::states::{StateId, StateSpace};
use crate::error::{ModelError, Result};

/// Default tolerance on per-cycle probability mass
pub const DEFAULT_MASS_TOLERANCE: f64 = 1e-9;

/// What to do when a cycle's probability mass leaves `1 ± tolerance`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DriftPolicy {
    /// Record the cycle in the [`DriftReport`] and keep going
    #[default]
    Report,
    /// Abort with [`ModelError::NumericalDrift`]
    Fail,
}

/// Options for cohort propagation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceOptions {
    pub tolerance: f64,
    pub drift_policy: DriftPolicy,
}

impl Default for TraceOptions {
    fn default() -> Self {
        Self {
            tolerance: DEFAULT_MASS_TOLERANCE,
            drift_policy: DriftPolicy::Report,
        }
    }
}

impl TraceOptions {
    /// Options that treat any drift as fatal
    #[must_use]
    pub fn strict() -> Self {
        Self {
            drift_policy: DriftPolicy::Fail,
            ..Self::default()
        }
    }
}

/// A cycle whose total probability mass left tolerance
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftEvent {
    pub cycle: usize,
    pub mass: f64,
}

/// Per-trace record of probability-mass conservation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DriftReport {
    pub tolerance: f64,
    /// Largest `|mass - 1|` over all cycles
    pub max_deviation: f64,
    pub events: Vec<DriftEvent>,
}

impl DriftReport {
    pub(crate) fn new(tolerance: f64) -> Self {
        Self {
            tolerance,
            max_deviation: 0.0,
            events: Vec::new(),
        }
    }

    /// Record the mass of one cycle; returns the event if it is out of tolerance.
    pub(crate) fn observe(&mut self, cycle: usize, mass: f64) -> Option<DriftEvent> {
        let deviation = (mass - 1.0).abs();
        if deviation > self.max_deviation || deviation.is_nan() {
            self.max_deviation = deviation;
        }
        if deviation > self.tolerance || deviation.is_nan() {
            let event = DriftEvent { cycle, mass };
            self.events.push(event);
            Some(event)
        } else {
            None
        }
    }

    pub fn is_clean(&self) -> bool {
        self.events.is_empty()
    }

    /// Convert to an error at the first drifting cycle, if any.
    pub fn check(&self) -> Result<()> {
        match self.events.first() {
            Some(e) => Err(ModelError::NumericalDrift {
                cycle: e.cycle,
                mass: e.mass,
            }),
            None => Ok(()),
        }
    }
}

/// One row of the long-format trace table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRow {
    pub cycle: usize,
    pub state: String,
    pub probability: f64,
}

/// State-occupancy distributions for cycles `0..=N`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CohortTrace {
    width: usize,
    /// Row-major, `(N + 1) * width` entries
    data: Vec<f64>,
    drift: DriftReport,
}

impl CohortTrace {
    pub(crate) fn new(width: usize, data: Vec<f64>, drift: DriftReport) -> Self {
        debug_assert!(width > 0 && data.len() % width == 0);
        Self { width, data, drift }
    }

    /// Number of propagated cycles `N`
    pub fn cycles(&self) -> usize {
        self.len() - 1
    }

    /// Number of distributions, `N + 1`
    pub fn len(&self) -> usize {
        self.data.len() / self.width
    }

    /// Always false; cycle 0 is always present.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Number of states
    pub fn width(&self) -> usize {
        self.width
    }

    pub fn distribution(&self, cycle: usize) -> Option<&[f64]> {
        let start = cycle.checked_mul(self.width)?;
        self.data.get(start..start + self.width)
    }

    pub fn initial(&self) -> &[f64] {
        &self.data[..self.width]
    }

    pub fn last(&self) -> &[f64] {
        &self.data[self.data.len() - self.width..]
    }

    pub fn iter(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.width)
    }

    /// Occupancy of one state at every cycle
    pub fn state_series(&self, state: StateId) -> Vec<f64> {
        self.iter().map(|d| d[state.0]).collect()
    }

    pub fn drift(&self) -> &DriftReport {
        &self.drift
    }

    /// Long-format `(cycle, state, probability)` table for plotting.
    pub fn long_table(&self, space: &StateSpace) -> Result<Vec<TraceRow>> {
        if space.len() != self.width {
            return Err(ModelError::DimensionMismatch {
                what: "state space",
                expected: self.width,
                found: space.len(),
            });
        }
        Ok(self
            .iter()
            .enumerate()
            .flat_map(|(cycle, dist)| {
                space.names().iter().zip(dist).map(move |(name, &p)| TraceRow {
                    cycle,
                    state: name.clone(),
                    probability: p,
                })
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drift_report_observe() {
        let mut report = DriftReport::new(1e-9);
        assert!(report.observe(1, 1.0 + 1e-12).is_none());
        assert!(report.observe(2, 1.0 - 1e-6).is_some());
        assert!(!report.is_clean());
        assert!((report.max_deviation - 1e-6).abs() < 1e-12);
        assert!(matches!(
            report.check(),
            Err(ModelError::NumericalDrift { cycle: 2, .. })
        ));
    }

    #[test]
    fn test_long_table() {
        let trace = CohortTrace::new(
            3,
            vec![1.0, 0.0, 0.0, 0.93, 0.05, 0.02],
            DriftReport::new(1e-9),
        );
        let table = trace.long_table(&StateSpace::canonical()).unwrap();
        assert_eq!(table.len(), 6);
        assert_eq!(table[4].cycle, 1);
        assert_eq!(table[4].state, "Sick");
        assert_eq!(table[4].probability, 0.05);
        assert_eq!(trace.state_series(StateId(2)), vec![0.0, 0.02]);
    }

    #[test]
    fn test_long_table_checks_width() {
        let trace = CohortTrace::new(2, vec![1.0, 0.0], DriftReport::new(1e-9));
        assert!(trace.long_table(&StateSpace::canonical()).is_err());
    }
}
