//! Tests for end-to-end evaluation of the reference scenario
//!
//! These tests verify:
//! - The first propagation step of the canonical model
//! - Totals are finite and within their natural bounds
//! - Repeated evaluation is bit-for-bit identical
//! - Tabular views line up with the trace

use crate::config::{CohortModel, ScenarioConfig};
use crate::model::{DEAD, HEALTHY, ModelParameters, SICK, StateSpace};
use crate::simulation::{evaluate, run_model};

#[test]
fn test_canonical_first_cycle() {
    let eval = evaluate(&ModelParameters::default()).unwrap();
    let d1 = eval.trace.distribution(1).unwrap();

    assert!((d1[HEALTHY.0] - 0.93).abs() < 1e-12, "Healthy after one cycle");
    assert!((d1[SICK.0] - 0.05).abs() < 1e-12, "Sick after one cycle");
    assert!((d1[DEAD.0] - 0.02).abs() < 1e-12, "Dead after one cycle");
}

#[test]
fn test_canonical_totals_within_bounds() {
    let params = ModelParameters::default();
    let eval = evaluate(&params).unwrap();
    let s = eval.summary;
    let upper = (params.cycles + 1) as f64;

    assert!(s.discounted_cost.is_finite() && s.discounted_cost > 0.0);
    assert!(
        s.discounted_utility > 0.0 && s.discounted_utility < upper,
        "Discounted utility {} should be in (0, N+1)",
        s.discounted_utility
    );
    assert!(
        s.life_expectancy > 0.0 && s.life_expectancy < upper,
        "Life expectancy {} should be in (0, N+1)",
        s.life_expectancy
    );
    assert!(
        s.discounted_cost < s.undiscounted_cost,
        "Discounting should reduce a positive cost stream"
    );
    assert_eq!(s.cycles, params.cycles);
    assert!(eval.drift().is_clean(), "Reference scenario should not drift");
}

#[test]
fn test_pipeline_is_idempotent() {
    let params = ModelParameters::default();
    let a = evaluate(&params).unwrap();
    let b = evaluate(&params).unwrap();

    assert_eq!(a, b);
    assert_eq!(
        a.summary.discounted_cost.to_bits(),
        b.summary.discounted_cost.to_bits()
    );
}

#[test]
fn test_run_model_matches_evaluate() {
    let params = ModelParameters::default();
    let model = CohortModel::from_parameters(&params).unwrap();
    let via_model = run_model(&model, &Default::default()).unwrap();
    assert_eq!(via_model, evaluate(&params).unwrap());
}

#[test]
fn test_tables_follow_trace() {
    let params = ModelParameters::default().with_cycles(4);
    let eval = evaluate(&params).unwrap();
    let space = StateSpace::canonical();

    let long = eval.trace.long_table(&space).unwrap();
    assert_eq!(long.len(), 5 * 3, "One row per (cycle, state)");
    assert_eq!(long[0].state, "Healthy");
    assert_eq!(long[0].probability, 1.0);
    assert_eq!(long[5].cycle, 1);
    assert_eq!(long[5].state, "Dead");

    let survival = eval.series.survival_table();
    assert_eq!(survival.len(), 5);
    assert_eq!(survival[0].value, 1.0);
    for (point, dist) in survival.iter().zip(eval.trace.iter()) {
        assert_eq!(point.value, 1.0 - dist[DEAD.0]);
    }

    let prevalence = eval.series.prevalence_table();
    assert_eq!(prevalence[0].value, Some(0.0));
    let expected = 0.05 / 0.98;
    assert!((prevalence[1].value.unwrap() - expected).abs() < 1e-12);
}

#[test]
fn test_scenario_drives_pipeline() {
    let mut scenario = ScenarioConfig::default();
    scenario.parameters.cycles = 10;
    scenario.validate().unwrap();

    let eval = evaluate(&scenario.parameters).unwrap();
    assert_eq!(eval.trace.len(), 11);
}

#[test]
fn test_evaluation_serializes() {
    let eval = evaluate(&ModelParameters::default().with_cycles(3)).unwrap();
    let json = serde_json::to_string(&eval.summary).unwrap();
    assert!(json.contains("discounted_cost"));
    assert!(json.contains("life_expectancy"));
}
