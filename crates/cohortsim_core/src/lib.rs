//! Markov cohort simulation library
//!
//! This crate evaluates discrete-time Markov cohort models of the kind used in
//! health-economic evaluation. It supports:
//! - Transition matrices built from off-diagonal probabilities, with the
//!   diagonal taking the remainder of each row
//! - Deterministic cohort traces with probability-mass drift reporting
//! - Discounted and undiscounted costs and QALYs, survival and prevalence
//! - One-way sensitivity analysis summarised as a tornado table
//!
//! # Quick start
//!
//! ```ignore
//! use cohortsim_core::{ModelParameters, evaluate};
//!
//! let eval = evaluate(&ModelParameters::default())?;
//! println!("Discounted cost: {:.2}", eval.summary.discounted_cost);
//! println!("Life expectancy: {:.2} cycles", eval.summary.life_expectancy);
//! ```
//!
//! Models over other state spaces are assembled with
//! [`config::ModelBuilder`] and evaluated with [`simulation::run_model`].

#![warn(clippy::all)]

// ============================================================================
// Core modules
// ============================================================================

pub mod analysis;
pub mod error;
pub mod outcomes;
pub mod simulation;
pub mod transition;

// ============================================================================
// Type definition modules
// ============================================================================

pub mod config;
pub mod model;

// ============================================================================
// Test modules
// ============================================================================

#[cfg(test)]
mod tests;

// ============================================================================
// Public re-exports for convenience
// ============================================================================

pub use analysis::{
    OutcomeMetric, SensitivityConfig, SensitivityProgress, SensitivityRange, TornadoRow,
    TornadoTable, one_way_sensitivity,
};
pub use config::{CohortModel, ModelBuilder, ScenarioConfig};
pub use error::{ModelError, Result};
pub use model::{CohortTrace, ModelParameters, OutcomeSummary, Parameter, TraceOptions};
pub use simulation::{ModelEvaluation, evaluate, evaluate_with_options, run_model, simulate_trace};
pub use transition::build_transition_matrix;
