//! Tornado table: one row per sensitivity target

use serde::{Deserialize, Serialize};

use crate::model::Parameter;

use super::OutcomeMetric;

/// Outcome of a single target at its low, base and high values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TornadoRow {
    pub parameter: Parameter,
    pub low_value: f64,
    pub base_value: f64,
    pub high_value: f64,
    pub low_outcome: f64,
    pub base_outcome: f64,
    pub high_outcome: f64,
}

impl TornadoRow {
    /// Width of the bar: `|high_outcome - low_outcome|`
    #[must_use]
    pub fn swing(&self) -> f64 {
        (self.high_outcome - self.low_outcome).abs()
    }

    /// Smallest and largest outcome across the three levels
    #[must_use]
    pub fn outcome_span(&self) -> (f64, f64) {
        let lo = self.low_outcome.min(self.base_outcome).min(self.high_outcome);
        let hi = self.low_outcome.max(self.base_outcome).max(self.high_outcome);
        (lo, hi)
    }
}

/// Mass-conservation record over every evaluation of an analysis
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SensitivityDrift {
    /// Evaluations (base case included) whose trace left tolerance
    pub drifted_evaluations: usize,
    /// Largest `|mass - 1|` seen in any trace
    pub max_deviation: f64,
}

impl SensitivityDrift {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.drifted_evaluations == 0
    }
}

/// Result of a one-way sensitivity analysis
///
/// Rows are kept in the order the targets were supplied; use
/// [`TornadoTable::sorted_by_swing`] for the usual chart ordering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TornadoTable {
    pub metric: OutcomeMetric,
    pub base_outcome: f64,
    pub rows: Vec<TornadoRow>,
    #[serde(default)]
    pub drift: SensitivityDrift,
}

impl TornadoTable {
    #[must_use]
    pub fn rows(&self) -> &[TornadoRow] {
        &self.rows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// First row for `parameter`, if it was a target
    #[must_use]
    pub fn get(&self, parameter: Parameter) -> Option<&TornadoRow> {
        self.rows.iter().find(|r| r.parameter == parameter)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TornadoRow> {
        self.rows.iter()
    }

    /// Rows by descending swing; ties keep input order.
    #[must_use]
    pub fn sorted_by_swing(&self) -> Vec<TornadoRow> {
        let mut rows = self.rows.clone();
        rows.sort_by(|a, b| b.swing().total_cmp(&a.swing()));
        rows
    }
}
