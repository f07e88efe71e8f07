//! Command-line driver for the cohort model
//!
//! Loads a scenario, evaluates it with `cohortsim_core` and renders the
//! results as plain-text tables or JSON.

pub mod logging;
pub mod report;
pub mod scenario;

pub use logging::init_logging;
pub use report::{OutputFormat, RunReport, render_run, render_tornado};
pub use scenario::{load_scenario, load_scenario_or_default, scenario_to_yaml};
