//! Model configuration
//!
//! A [`CohortModel`] is everything one evaluation needs: the state space,
//! a transition matrix over it, the starting distribution, reward vectors,
//! discount rate and horizon. The canonical three-state model is derived
//! from [`ModelParameters`]; other state spaces are assembled with
//! [`ModelBuilder`]. [`ScenarioConfig`] is the serialisable top-level input.

mod builder;
mod scenario;

pub use builder::ModelBuilder;
pub use scenario::ScenarioConfig;

use serde::Serialize;

use crate::error::Result;
use crate::model::{HEALTHY, ModelParameters, StateSpace, StateVector, TransitionMatrix};
use crate::transition::build_transition_matrix;

/// A fully specified cohort model
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CohortModel {
    pub space: StateSpace,
    pub matrix: TransitionMatrix,
    pub initial: StateVector,
    pub costs: StateVector,
    pub utilities: StateVector,
    pub discount_rate: f64,
    pub cycles: usize,
}

impl CohortModel {
    /// Canonical model; the whole cohort starts Healthy.
    pub fn from_parameters(params: &ModelParameters) -> Result<Self> {
        params.validate()?;
        let space = StateSpace::canonical();
        let initial = StateVector::point_mass(&space, HEALTHY)?;
        Ok(Self {
            matrix: build_transition_matrix(params)?,
            initial,
            costs: params.cost_vector(),
            utilities: params.utility_vector(),
            discount_rate: params.discount_rate,
            cycles: params.cycles,
            space,
        })
    }
}
