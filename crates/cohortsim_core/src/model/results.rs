//! Outcome types produced by aggregation
//!
//! Contains the scalar summary of one model evaluation and the per-cycle
//! series that the reporting layer plots against cycle index.

use serde::{Deserialize, Serialize};

/// Discounted totals and life expectancy of one evaluation
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OutcomeSummary {
    pub discounted_cost: f64,
    /// Discounted QALYs
    pub discounted_utility: f64,
    /// Expected cycles survived, undiscounted
    pub life_expectancy: f64,
    pub undiscounted_cost: f64,
    pub undiscounted_utility: f64,
    pub cycles: usize,
}

/// `(cycle, value)` point of a per-cycle series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub cycle: usize,
    pub value: f64,
}

/// Prevalence point; `None` once no one is left alive
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PrevalencePoint {
    pub cycle: usize,
    pub value: Option<f64>,
}

/// Per-cycle series, all of length `N + 1`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutcomeSeries {
    pub expected_cost: Vec<f64>,
    pub expected_utility: Vec<f64>,
    /// Probability of not being in the death state
    pub survival: Vec<f64>,
    /// Share of survivors in the sick state; NaN where survival is zero
    pub prevalence: Vec<f64>,
}

impl OutcomeSeries {
    pub fn len(&self) -> usize {
        self.survival.len()
    }

    pub fn is_empty(&self) -> bool {
        self.survival.is_empty()
    }

    pub fn survival_table(&self) -> Vec<SeriesPoint> {
        series_table(&self.survival)
    }

    pub fn expected_cost_table(&self) -> Vec<SeriesPoint> {
        series_table(&self.expected_cost)
    }

    pub fn expected_utility_table(&self) -> Vec<SeriesPoint> {
        series_table(&self.expected_utility)
    }

    /// Prevalence with undefined cycles mapped to `None`
    pub fn prevalence_table(&self) -> Vec<PrevalencePoint> {
        self.prevalence
            .iter()
            .enumerate()
            .map(|(cycle, &v)| PrevalencePoint {
                cycle,
                value: (!v.is_nan()).then_some(v),
            })
            .collect()
    }
}

fn series_table(values: &[f64]) -> Vec<SeriesPoint> {
    values
        .iter()
        .enumerate()
        .map(|(cycle, &value)| SeriesPoint { cycle, value })
        .collect()
}

/// Everything the aggregator derives from one trace
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelOutcomes {
    pub summary: OutcomeSummary,
    pub series: OutcomeSeries,
}
