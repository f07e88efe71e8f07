//! One-way sensitivity evaluator - re-runs the model with one parameter moved.
//!
//! Each target produces two variants of the base parameters, one at its low
//! and one at its high value, with every other field left untouched. The base
//! case is evaluated once and shared by all rows. Variants are independent,
//! so with the `parallel` feature they are evaluated on the rayon pool.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

use crate::error::{ModelError, Result};
use crate::model::{ModelParameters, Parameter};
use crate::simulation::evaluate_with_options;

use super::{
    Level, SensitivityConfig, SensitivityDrift, SensitivityRange, TornadoRow, TornadoTable,
};

/// Shared progress and cancellation handle for a sensitivity run
///
/// Clones share the same counters, so a caller can keep one clone to poll
/// or cancel while another is passed to [`one_way_sensitivity`]. Counts are
/// in model evaluations: the base case plus two per target.
#[derive(Debug, Clone, Default)]
pub struct SensitivityProgress {
    state: Arc<ProgressState>,
}

#[derive(Debug, Default)]
struct ProgressState {
    completed: AtomicUsize,
    total: AtomicUsize,
    cancelled: AtomicBool,
}

impl SensitivityProgress {
    #[must_use]
    pub fn new(total: usize) -> Self {
        let progress = Self::default();
        progress.state.total.store(total, Ordering::Relaxed);
        progress
    }

    #[must_use]
    pub fn completed(&self) -> usize {
        self.state.completed.load(Ordering::Relaxed)
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.state.total.load(Ordering::Relaxed)
    }

    /// Completed share in `[0, 1]`; 0 before a run has set its total.
    #[must_use]
    pub fn fraction(&self) -> f64 {
        match self.total() {
            0 => 0.0,
            total => (self.completed() as f64 / total as f64).min(1.0),
        }
    }

    pub(crate) fn start(&self, total: usize) {
        self.state.completed.store(0, Ordering::Relaxed);
        self.state.total.store(total, Ordering::Relaxed);
    }

    pub(crate) fn record(&self) {
        self.state.completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Request cancellation; evaluations not yet started are skipped.
    pub fn cancel(&self) {
        self.state.cancelled.store(true, Ordering::Relaxed);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.state.cancelled.load(Ordering::Relaxed)
    }
}

/// A copy of the base parameters with one field moved to a range end
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterVariant {
    /// Index of the range this variant belongs to
    pub row: usize,
    pub parameter: Parameter,
    pub level: Level,
    pub value: f64,
    pub parameters: ModelParameters,
}

/// Derive the low and high variants for every range, in range order.
///
/// Fails on the first target that does not name a parameter or has a
/// non-finite bound. Variants are not validated here; an inadmissible
/// variant fails when it is evaluated.
pub fn variants(
    base: &ModelParameters,
    ranges: &[SensitivityRange],
) -> Result<Vec<ParameterVariant>> {
    let mut out = Vec::with_capacity(2 * ranges.len());
    for (row, range) in ranges.iter().enumerate() {
        let parameter = range.resolve()?;
        range.check_bounds()?;

        let base_value = base.get(parameter);
        if let Some(stated) = range.base_case
            && stated != base_value
        {
            tracing::warn!(
                parameter = parameter.symbol(),
                stated,
                actual = base_value,
                "Range base case disagrees with base parameters; using base parameters"
            );
        }

        for (level, value) in [(Level::Low, range.low), (Level::High, range.high)] {
            out.push(ParameterVariant {
                row,
                parameter,
                level,
                value,
                parameters: base.with_value(parameter, value),
            });
        }
    }
    Ok(out)
}

/// Run a one-way sensitivity analysis and collect a tornado table.
///
/// # Errors
/// Any error from resolving targets or evaluating a variant (the first one
/// in variant order when running sequentially), or [`ModelError::Cancelled`]
/// if `progress` is cancelled before the analysis finishes.
pub fn one_way_sensitivity(
    base: &ModelParameters,
    config: &SensitivityConfig,
    progress: Option<&SensitivityProgress>,
) -> Result<TornadoTable> {
    let variants = variants(base, &config.ranges)?;
    let total = config.total_evaluations();
    if let Some(p) = progress {
        p.start(total);
    }

    tracing::info!(
        targets = config.ranges.len(),
        total_evaluations = total,
        metric = config.metric.label(),
        parallel = config.parallel,
        "Starting one-way sensitivity analysis"
    );

    let evaluate_one = |params: &ModelParameters| -> Result<Evaluated> {
        if let Some(p) = progress
            && p.is_cancelled()
        {
            return Err(ModelError::Cancelled);
        }
        let eval = evaluate_with_options(params, &config.trace)?;
        if let Some(p) = progress {
            p.record();
        }
        Ok(Evaluated {
            outcome: config.metric.value(&eval.summary),
            max_deviation: eval.drift().max_deviation,
            drifted: !eval.drift().is_clean(),
        })
    };

    let base_eval = evaluate_one(base)?;
    let evaluated = evaluate_variants(&variants, config.parallel, &evaluate_one)?;

    let mut drift = SensitivityDrift::default();
    for e in std::iter::once(&base_eval).chain(&evaluated) {
        drift.absorb(e);
    }
    if drift.drifted_evaluations > 0 {
        tracing::warn!(
            drifted_evaluations = drift.drifted_evaluations,
            max_deviation = drift.max_deviation,
            "Probability mass drifted in sensitivity evaluations"
        );
    }

    let base_outcome = base_eval.outcome;
    let rows: Vec<TornadoRow> = variants
        .chunks_exact(2)
        .zip(evaluated.chunks_exact(2))
        .map(|(pair, outcome)| TornadoRow {
            parameter: pair[0].parameter,
            low_value: pair[0].value,
            base_value: base.get(pair[0].parameter),
            high_value: pair[1].value,
            low_outcome: outcome[0].outcome,
            base_outcome,
            high_outcome: outcome[1].outcome,
        })
        .collect();

    tracing::info!(
        rows = rows.len(),
        base_outcome,
        "One-way sensitivity analysis complete"
    );

    Ok(TornadoTable {
        metric: config.metric,
        base_outcome,
        rows,
        drift,
    })
}

/// What one evaluation contributes to the table
#[derive(Debug, Clone, Copy)]
struct Evaluated {
    outcome: f64,
    max_deviation: f64,
    drifted: bool,
}

impl SensitivityDrift {
    fn absorb(&mut self, e: &Evaluated) {
        if e.drifted {
            self.drifted_evaluations += 1;
        }
        if e.max_deviation > self.max_deviation || e.max_deviation.is_nan() {
            self.max_deviation = e.max_deviation;
        }
    }
}

#[cfg(feature = "parallel")]
fn evaluate_variants<F>(
    variants: &[ParameterVariant],
    parallel: bool,
    f: &F,
) -> Result<Vec<Evaluated>>
where
    F: Fn(&ModelParameters) -> Result<Evaluated> + Sync,
{
    if parallel {
        variants.par_iter().map(|v| f(&v.parameters)).collect()
    } else {
        variants.iter().map(|v| f(&v.parameters)).collect()
    }
}

#[cfg(not(feature = "parallel"))]
fn evaluate_variants<F>(
    variants: &[ParameterVariant],
    _parallel: bool,
    f: &F,
) -> Result<Vec<Evaluated>>
where
    F: Fn(&ModelParameters) -> Result<Evaluated>,
{
    variants.iter().map(|v| f(&v.parameters)).collect()
}
