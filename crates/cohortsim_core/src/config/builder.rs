//! Model Builder
//!
//! The ModelBuilder provides a fluent API for assembling a cohort model over
//! any set of states, with name-based references resolved at build time.
//!
//! # Example
//!
//! ```ignore
//! use cohortsim_core::config::ModelBuilder;
//!
//! let model = ModelBuilder::new()
//!     .states(["Well", "Mild", "Severe", "Dead"])
//!     .death_state("Dead")
//!     .sick_state("Severe")
//!
//!     // Off-diagonal transitions; diagonals take the remainder
//!     .transition("Well", "Mild", 0.10)
//!     .transition("Mild", "Severe", 0.05)
//!     .transition("Mild", "Well", 0.20)
//!     .transition("Severe", "Dead", 0.30)
//!
//!     // Per-cycle rewards
//!     .cost("Mild", 250.0)
//!     .cost("Severe", 4_000.0)
//!     .utility("Well", 1.0)
//!     .utility("Mild", 0.8)
//!     .utility("Severe", 0.4)
//!
//!     .discount_rate(0.035)
//!     .cycles(40)
//!     .build()?;
//! ```

use crate::error::{ModelError, Result};
use crate::model::{StateId, StateSpace, StateVector};
use crate::transition::TransitionMatrixBuilder;

use super::CohortModel;

/// Builder for cohort models with name-based state references
#[derive(Debug, Clone)]
pub struct ModelBuilder {
    states: Vec<String>,
    death_state: Option<String>,
    sick_state: Option<String>,
    transitions: Vec<(String, String, f64)>,
    costs: Vec<(String, f64)>,
    utilities: Vec<(String, f64)>,
    initial: Vec<(String, f64)>,
    discount_rate: f64,
    cycles: usize,
}

impl Default for ModelBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            states: Vec::new(),
            death_state: None,
            sick_state: None,
            transitions: Vec::new(),
            costs: Vec::new(),
            utilities: Vec::new(),
            initial: Vec::new(),
            discount_rate: 0.0,
            cycles: 0,
        }
    }

    // =========================================================================
    // States
    // =========================================================================

    /// Append a state; order of calls is the state order
    #[must_use]
    pub fn state(mut self, name: &str) -> Self {
        self.states.push(name.to_string());
        self
    }

    #[must_use]
    pub fn states<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.states.extend(names.into_iter().map(Into::into));
        self
    }

    /// Absorbing state used for overall survival
    #[must_use]
    pub fn death_state(mut self, name: &str) -> Self {
        self.death_state = Some(name.to_string());
        self
    }

    /// State reported as prevalence among survivors
    #[must_use]
    pub fn sick_state(mut self, name: &str) -> Self {
        self.sick_state = Some(name.to_string());
        self
    }

    // =========================================================================
    // Dynamics and rewards
    // =========================================================================

    #[must_use]
    pub fn transition(mut self, from: &str, to: &str, probability: f64) -> Self {
        self.transitions
            .push((from.to_string(), to.to_string(), probability));
        self
    }

    /// Per-cycle cost of a state (unset states cost 0)
    #[must_use]
    pub fn cost(mut self, state: &str, value: f64) -> Self {
        self.costs.push((state.to_string(), value));
        self
    }

    /// Per-cycle utility of a state (unset states have utility 0)
    #[must_use]
    pub fn utility(mut self, state: &str, value: f64) -> Self {
        self.utilities.push((state.to_string(), value));
        self
    }

    /// Starting share of the cohort in a state. If never called, the whole
    /// cohort starts in the first state.
    #[must_use]
    pub fn initial(mut self, state: &str, share: f64) -> Self {
        self.initial.push((state.to_string(), share));
        self
    }

    #[must_use]
    pub fn discount_rate(mut self, rate: f64) -> Self {
        self.discount_rate = rate;
        self
    }

    #[must_use]
    pub fn cycles(mut self, cycles: usize) -> Self {
        self.cycles = cycles;
        self
    }

    // =========================================================================
    // Build
    // =========================================================================

    pub fn build(self) -> Result<CohortModel> {
        let mut space = StateSpace::new(self.states)?;
        if let Some(name) = &self.death_state {
            space = space.with_death_state(name)?;
        }
        if let Some(name) = &self.sick_state {
            space = space.with_sick_state(name)?;
        }

        let matrix = self
            .transitions
            .iter()
            .fold(TransitionMatrixBuilder::new(&space), |b, (from, to, p)| {
                b.transition(from, to, *p)
            })
            .build()?;

        for (state, value) in &self.costs {
            if !value.is_finite() || *value < 0.0 {
                return Err(ModelError::invalid(
                    format!("cost of {state}"),
                    *value,
                    "cost must be finite and non-negative",
                ));
            }
        }
        for (state, value) in &self.utilities {
            if !value.is_finite() {
                return Err(ModelError::invalid(
                    format!("utility of {state}"),
                    *value,
                    "utility must be finite",
                ));
            }
        }

        let costs = named_vector(&space, &self.costs)?;
        let utilities = named_vector(&space, &self.utilities)?;
        let initial = if self.initial.is_empty() {
            StateVector::point_mass(&space, StateId(0))?
        } else {
            named_vector(&space, &self.initial)?
        };

        Ok(CohortModel {
            space,
            matrix,
            initial,
            costs,
            utilities,
            discount_rate: self.discount_rate,
            cycles: self.cycles,
        })
    }
}

fn named_vector(space: &StateSpace, pairs: &[(String, f64)]) -> Result<StateVector> {
    StateVector::from_named(space, pairs.iter().map(|(name, v)| (name.as_str(), *v)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::TraceOptions;
    use crate::simulation::run_model;

    fn four_state() -> ModelBuilder {
        ModelBuilder::new()
            .states(["Well", "Mild", "Severe", "Dead"])
            .death_state("Dead")
            .sick_state("Severe")
            .transition("Well", "Mild", 0.10)
            .transition("Mild", "Severe", 0.05)
            .transition("Mild", "Well", 0.20)
            .transition("Severe", "Dead", 0.30)
            .transition("Well", "Dead", 0.01)
            .cost("Mild", 250.0)
            .cost("Severe", 4_000.0)
            .utility("Well", 1.0)
            .utility("Mild", 0.8)
            .utility("Severe", 0.4)
            .discount_rate(0.035)
            .cycles(40)
    }

    #[test]
    fn test_build_four_state_model() {
        let model = four_state().build().unwrap();
        assert_eq!(model.space.len(), 4);
        assert_eq!(model.initial.as_slice(), &[1.0, 0.0, 0.0, 0.0]);
        assert_eq!(model.costs.as_slice(), &[0.0, 250.0, 4_000.0, 0.0]);
        assert_eq!(model.space.sick_state(), Some(StateId(2)));
        assert!(model.matrix.is_absorbing(StateId(3)));
    }

    #[test]
    fn test_four_state_model_runs() {
        let model = four_state().build().unwrap();
        let eval = run_model(&model, &TraceOptions::strict()).unwrap();
        assert_eq!(eval.trace.len(), 41);
        for dist in eval.trace.iter() {
            let mass: f64 = dist.iter().sum();
            assert!((mass - 1.0).abs() < 1e-9);
        }
        assert!(eval.summary.life_expectancy > 0.0 && eval.summary.life_expectancy < 41.0);
    }

    #[test]
    fn test_explicit_initial_distribution() {
        let model = four_state()
            .initial("Well", 0.6)
            .initial("Mild", 0.4)
            .build()
            .unwrap();
        assert_eq!(model.initial.as_slice(), &[0.6, 0.4, 0.0, 0.0]);
    }

    #[test]
    fn test_build_errors() {
        assert!(matches!(
            ModelBuilder::new().build(),
            Err(ModelError::InvalidParameter { .. })
        ));
        assert_eq!(
            four_state().death_state("Gone").build().unwrap_err(),
            ModelError::UnknownState("Gone".into())
        );
        assert!(matches!(
            four_state().cost("Mild", -1.0).build(),
            Err(ModelError::InvalidParameter { .. })
        ));
        assert!(matches!(
            four_state().transition("Well", "Severe", 0.95).build(),
            Err(ModelError::InvalidParameter { .. })
        ));
    }
}
