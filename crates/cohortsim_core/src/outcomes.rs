//! Outcome aggregation: rewards, discounting, survival and prevalence

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::model::{
    CohortTrace, ModelOutcomes, OutcomeSeries, OutcomeSummary, StateSpace, StateVector,
};

/// Per-cycle present-value factors, `weight[t] = 1 / (1 + rate)^t` for `t` in `0..=N`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscountWeights {
    rate: f64,
    weights: Vec<f64>,
}

impl DiscountWeights {
    pub fn new(rate: f64, cycles: usize) -> Result<Self> {
        if !rate.is_finite() || rate < 0.0 {
            return Err(ModelError::invalid(
                "discount rate",
                rate,
                "discount rate must be finite and non-negative",
            ));
        }
        let base = 1.0 + rate;
        let weights = (0..=cycles).map(|t| base.powf(t as f64).recip()).collect();
        Ok(Self { rate, weights })
    }

    pub fn rate(&self) -> f64 {
        self.rate
    }

    pub fn len(&self) -> usize {
        self.weights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weights.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.weights
    }

    pub fn get(&self, cycle: usize) -> Option<f64> {
        self.weights.get(cycle).copied()
    }
}

/// Map a trace to expected rewards, discounted totals and survival series.
///
/// Overall survival is `1 - P(death state)`. Without a designated death
/// state every cycle has survival 1; without a designated sick state the
/// prevalence series is all NaN.
pub fn aggregate(
    space: &StateSpace,
    trace: &CohortTrace,
    costs: &StateVector,
    utilities: &StateVector,
    weights: &DiscountWeights,
) -> Result<ModelOutcomes> {
    let n = space.len();
    for (what, found) in [
        ("cohort trace", trace.width()),
        ("cost vector", costs.len()),
        ("utility vector", utilities.len()),
    ] {
        if found != n {
            return Err(ModelError::DimensionMismatch {
                what,
                expected: n,
                found,
            });
        }
    }
    if weights.len() != trace.len() {
        return Err(ModelError::DimensionMismatch {
            what: "discount weights",
            expected: trace.len(),
            found: weights.len(),
        });
    }

    let len = trace.len();
    let mut series = OutcomeSeries {
        expected_cost: Vec::with_capacity(len),
        expected_utility: Vec::with_capacity(len),
        survival: Vec::with_capacity(len),
        prevalence: Vec::with_capacity(len),
    };

    let mut discounted_cost = 0.0;
    let mut discounted_utility = 0.0;
    let mut undiscounted_cost = 0.0;
    let mut undiscounted_utility = 0.0;

    for (dist, &w) in trace.iter().zip(weights.as_slice()) {
        let cost = costs.dot(dist);
        let utility = utilities.dot(dist);
        discounted_cost += cost * w;
        discounted_utility += utility * w;
        undiscounted_cost += cost;
        undiscounted_utility += utility;

        let survival = space.death_state().map_or(1.0, |d| 1.0 - dist[d.0]);
        let prevalence = match space.sick_state() {
            Some(s) if survival > 0.0 => dist[s.0] / survival,
            _ => f64::NAN,
        };

        series.expected_cost.push(cost);
        series.expected_utility.push(utility);
        series.survival.push(survival);
        series.prevalence.push(prevalence);
    }

    let life_expectancy = series.survival.iter().sum();

    Ok(ModelOutcomes {
        summary: OutcomeSummary {
            discounted_cost,
            discounted_utility,
            life_expectancy,
            undiscounted_cost,
            undiscounted_utility,
            cycles: trace.cycles(),
        },
        series,
    })
}
