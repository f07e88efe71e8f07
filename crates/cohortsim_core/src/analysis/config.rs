//! Configuration types for one-way sensitivity analysis.

use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};
use crate::model::{OutcomeSummary, Parameter, TraceOptions};

/// Scalar outcome recorded for each sensitivity variant
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutcomeMetric {
    /// Discounted total cost
    #[default]
    DiscountedCost,
    /// Discounted total utility (QALYs)
    DiscountedUtility,
    /// Undiscounted expected cycles survived
    LifeExpectancy,
    UndiscountedCost,
    UndiscountedUtility,
}

impl OutcomeMetric {
    /// Get a display label for the metric
    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::DiscountedCost => "Discounted Cost",
            Self::DiscountedUtility => "Discounted QALYs",
            Self::LifeExpectancy => "Life Expectancy",
            Self::UndiscountedCost => "Undiscounted Cost",
            Self::UndiscountedUtility => "Undiscounted QALYs",
        }
    }

    /// Get a short label suitable for chart axes
    #[must_use]
    pub fn short_label(&self) -> &'static str {
        match self {
            Self::DiscountedCost => "Cost",
            Self::DiscountedUtility => "QALYs",
            Self::LifeExpectancy => "LE",
            Self::UndiscountedCost => "Cost (undisc.)",
            Self::UndiscountedUtility => "QALYs (undisc.)",
        }
    }

    /// Pick this metric out of a summary
    #[must_use]
    pub fn value(&self, summary: &OutcomeSummary) -> f64 {
        match self {
            Self::DiscountedCost => summary.discounted_cost,
            Self::DiscountedUtility => summary.discounted_utility,
            Self::LifeExpectancy => summary.life_expectancy,
            Self::UndiscountedCost => summary.undiscounted_cost,
            Self::UndiscountedUtility => summary.undiscounted_utility,
        }
    }
}

/// Which end of a range a variant uses
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    Low,
    BaseCase,
    High,
}

/// Low/High bounds for one target parameter
///
/// `parameter` is a symbol (`p.SD`) or field name (`p_sd`); it is resolved
/// when the analysis runs. The base-case value always comes from the base
/// parameters; `base_case` is informational and a disagreeing value is
/// logged and ignored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensitivityRange {
    pub parameter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_case: Option<f64>,
    pub low: f64,
    pub high: f64,
}

impl SensitivityRange {
    #[must_use]
    pub fn new(parameter: Parameter, low: f64, high: f64) -> Self {
        Self {
            parameter: parameter.symbol().to_string(),
            base_case: None,
            low,
            high,
        }
    }

    /// Resolve the target name to a parameter
    pub fn resolve(&self) -> Result<Parameter> {
        self.parameter.parse()
    }

    pub(crate) fn check_bounds(&self) -> Result<()> {
        for (which, value) in [("low", self.low), ("high", self.high)] {
            if !value.is_finite() {
                return Err(ModelError::invalid(
                    format!("{} {which}", self.parameter),
                    value,
                    "sensitivity bound must be finite",
                ));
            }
        }
        Ok(())
    }
}

/// Configuration for a one-way sensitivity analysis
///
/// Every field has a default, so a partial block in a scenario file keeps
/// the reference ranges. Trace options are not read from files; a scenario
/// supplies its own through [`crate::config::ScenarioConfig::sensitivity_config`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SensitivityConfig {
    /// Targets, in output row order
    pub ranges: Vec<SensitivityRange>,
    pub metric: OutcomeMetric,
    /// Evaluate variants on the rayon pool (requires the `parallel` feature)
    pub parallel: bool,
    #[serde(skip)]
    pub trace: TraceOptions,
}

fn default_parallel() -> bool {
    cfg!(feature = "parallel")
}

impl Default for SensitivityConfig {
    fn default() -> Self {
        Self {
            ranges: default_ranges(),
            metric: OutcomeMetric::default(),
            parallel: default_parallel(),
            trace: TraceOptions::default(),
        }
    }
}

/// The reference analysis: the three transition probabilities, each halved
/// and doubled around the reference base case.
#[must_use]
pub fn default_ranges() -> Vec<SensitivityRange> {
    vec![
        SensitivityRange::new(Parameter::HealthyToDead, 0.01, 0.04),
        SensitivityRange::new(Parameter::HealthyToSick, 0.025, 0.1),
        SensitivityRange::new(Parameter::SickToDead, 0.05, 0.2),
    ]
}

impl SensitivityConfig {
    #[must_use]
    pub fn new(ranges: Vec<SensitivityRange>) -> Self {
        Self {
            ranges,
            ..Default::default()
        }
    }

    #[must_use]
    pub fn with_metric(mut self, metric: OutcomeMetric) -> Self {
        self.metric = metric;
        self
    }

    #[must_use]
    pub fn sequential(mut self) -> Self {
        self.parallel = false;
        self
    }

    /// Base case plus a low and a high run per target
    #[must_use]
    pub fn total_evaluations(&self) -> usize {
        1 + 2 * self.ranges.len()
    }

    /// Get labels for all targets
    #[must_use]
    pub fn labels(&self) -> Vec<String> {
        self.ranges.iter().map(|r| r.parameter.clone()).collect()
    }
}
