//! Integration tests for the cohort model pipeline
//!
//! Tests are organized by topic:
//! - `pipeline` - End-to-end evaluation of the reference scenario
//! - `properties` - Conservation, monotonicity and boundary behaviour
//! - `sensitivity` - One-way sensitivity analysis and tornado output

mod pipeline;
