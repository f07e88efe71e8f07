//! One-way sensitivity analysis.
//!
//! Each target parameter is moved to the low and then the high end of its
//! range while every other parameter stays at its base-case value. The
//! chosen outcome metric is recorded for each run and collected into a
//! [`TornadoTable`].
//!
//! ```ignore
//! use cohortsim_core::analysis::{OutcomeMetric, SensitivityConfig, one_way_sensitivity};
//! use cohortsim_core::model::ModelParameters;
//!
//! let config = SensitivityConfig::default().with_metric(OutcomeMetric::DiscountedCost);
//! let table = one_way_sensitivity(&ModelParameters::default(), &config, None)?;
//!
//! for row in table.sorted_by_swing() {
//!     println!("{}: {:.2} .. {:.2}", row.parameter, row.low_outcome, row.high_outcome);
//! }
//! ```

mod config;
mod evaluator;
mod tornado;

pub use config::{Level, OutcomeMetric, SensitivityConfig, SensitivityRange, default_ranges};
pub use evaluator::{ParameterVariant, SensitivityProgress, one_way_sensitivity, variants};
pub use tornado::{SensitivityDrift, TornadoRow, TornadoTable};
