//! Transition matrix construction
//!
//! Only off-diagonal transitions are specified. Each row's diagonal entry
//! is the remainder `1 - Σ exits`, so rows are stochastic by construction
//! and an unparameterized state is absorbing.

use crate::error::{ModelError, Result, check_probability};
use crate::model::{
    DEAD_NAME, HEALTHY_NAME, ModelParameters, Parameter, ROW_EXCESS_TOLERANCE, SICK_NAME,
    StateSpace, TransitionMatrix,
};

#[derive(Debug, Clone)]
struct PendingTransition {
    from: String,
    to: String,
    probability: f64,
}

/// Builds a [`TransitionMatrix`] over a [`StateSpace`] by state name
///
/// ```ignore
/// let space = StateSpace::canonical();
/// let matrix = TransitionMatrixBuilder::new(&space)
///     .transition("Healthy", "Sick", 0.05)
///     .transition("Healthy", "Dead", 0.02)
///     .transition("Sick", "Dead", 0.1)
///     .build()?;
/// ```
#[derive(Debug, Clone)]
pub struct TransitionMatrixBuilder<'a> {
    space: &'a StateSpace,
    pending: Vec<PendingTransition>,
}

impl<'a> TransitionMatrixBuilder<'a> {
    #[must_use]
    pub fn new(space: &'a StateSpace) -> Self {
        Self {
            space,
            pending: Vec::new(),
        }
    }

    /// Add an off-diagonal transition. Names are resolved in `build`; a later
    /// entry for the same pair replaces an earlier one.
    #[must_use]
    pub fn transition(mut self, from: &str, to: &str, probability: f64) -> Self {
        self.pending.push(PendingTransition {
            from: from.to_string(),
            to: to.to_string(),
            probability,
        });
        self
    }

    pub fn build(self) -> Result<TransitionMatrix> {
        let n = self.space.len();
        let mut data = vec![0.0; n * n];

        for t in &self.pending {
            let from = self.space.id(&t.from)?;
            let to = self.space.id(&t.to)?;
            let name = format!("P({}->{})", t.from, t.to);
            if from == to {
                return Err(ModelError::invalid(
                    name,
                    t.probability,
                    "self-transitions are the row remainder and cannot be set",
                ));
            }
            check_probability(&name, t.probability)?;
            data[from.0 * n + to.0] = t.probability;
        }

        for (i, row) in data.chunks_exact_mut(n).enumerate() {
            let exits: f64 = row.iter().sum();
            if exits > 1.0 + ROW_EXCESS_TOLERANCE {
                return Err(ModelError::invalid(
                    format!("exits from {}", self.space.names()[i]),
                    exits,
                    "transition probabilities leaving a state exceed 1",
                ));
            }
            row[i] = (1.0 - exits).max(0.0);
        }

        Ok(TransitionMatrix::from_raw(n, data))
    }
}

/// Canonical Healthy / Sick / Dead matrix from model parameters.
///
/// Healthy -> {Healthy, Sick, Dead}, Sick -> {Sick, Dead}, Dead absorbing.
pub fn build_transition_matrix(params: &ModelParameters) -> Result<TransitionMatrix> {
    for p in Parameter::TRANSITIONS {
        check_probability(p.symbol(), params.get(p))?;
    }
    let healthy_exits = params.p_hd + params.p_hs;
    if healthy_exits > 1.0 + ROW_EXCESS_TOLERANCE {
        return Err(ModelError::invalid(
            "p.HD + p.HS",
            healthy_exits,
            "transition probabilities leaving a state exceed 1",
        ));
    }

    let space = StateSpace::canonical();
    TransitionMatrixBuilder::new(&space)
        .transition(HEALTHY_NAME, SICK_NAME, params.p_hs)
        .transition(HEALTHY_NAME, DEAD_NAME, params.p_hd)
        .transition(SICK_NAME, DEAD_NAME, params.p_sd)
        .build()
}
