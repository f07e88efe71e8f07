//! Plain-text and JSON rendering of model results

use std::fmt::Write;

use clap::ValueEnum;
use cohortsim_core::model::{DriftReport, PrevalencePoint, SeriesPoint, StateSpace, TraceRow};
use cohortsim_core::analysis::SensitivityDrift;
use cohortsim_core::{ModelEvaluation, OutcomeSummary, ScenarioConfig, TornadoRow, TornadoTable};
use color_eyre::eyre::Result;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Everything `cohortsim run` prints
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub scenario: String,
    pub summary: OutcomeSummary,
    pub drift: DriftReport,
    pub survival: Vec<SeriesPoint>,
    pub prevalence: Vec<PrevalencePoint>,
    pub expected_cost: Vec<SeriesPoint>,
    pub expected_utility: Vec<SeriesPoint>,
    pub trace: Vec<TraceRow>,
}

impl RunReport {
    pub fn new(scenario: &ScenarioConfig, eval: &ModelEvaluation) -> Result<Self> {
        let space = StateSpace::canonical();
        Ok(Self {
            scenario: scenario.name.clone(),
            summary: eval.summary,
            drift: eval.drift().clone(),
            survival: eval.series.survival_table(),
            prevalence: eval.series.prevalence_table(),
            expected_cost: eval.series.expected_cost_table(),
            expected_utility: eval.series.expected_utility_table(),
            trace: eval.trace.long_table(&space)?,
        })
    }
}

pub fn render_run(report: &RunReport, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => Ok(serde_json::to_string_pretty(report)?),
        OutputFormat::Text => run_text(report),
    }
}

fn run_text(report: &RunReport) -> Result<String> {
    let mut out = String::new();
    let s = &report.summary;

    writeln!(out, "Scenario: {}", report.scenario)?;
    writeln!(out, "Cycles:   {}", s.cycles)?;
    writeln!(out)?;
    writeln!(out, "{:<22} {:>14}", "Outcome", "Value")?;
    writeln!(out, "{:-<22} {:->14}", "", "")?;
    for (label, value) in [
        ("Discounted cost", s.discounted_cost),
        ("Discounted QALYs", s.discounted_utility),
        ("Undiscounted cost", s.undiscounted_cost),
        ("Undiscounted QALYs", s.undiscounted_utility),
        ("Life expectancy", s.life_expectancy),
    ] {
        writeln!(out, "{label:<22} {value:>14.4}")?;
    }

    if !report.drift.is_clean() {
        writeln!(out)?;
        writeln!(
            out,
            "Warning: probability mass drifted at {} cycle(s), max deviation {:.3e}",
            report.drift.events.len(),
            report.drift.max_deviation
        )?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "{:>5} {:>10} {:>10} {:>10} {:>10} {:>10} {:>12}",
        "Cycle", "Healthy", "Sick", "Dead", "Survival", "Prevalence", "Cost"
    )?;
    let width = report.trace.len() / report.survival.len().max(1);
    for (cycle, rows) in report.trace.chunks(width.max(1)).enumerate() {
        write!(out, "{cycle:>5}")?;
        for row in rows {
            write!(out, " {:>10.6}", row.probability)?;
        }
        let survival = report.survival.get(cycle).map_or(f64::NAN, |p| p.value);
        let prevalence = match report.prevalence.get(cycle).and_then(|p| p.value) {
            Some(v) => format!("{v:.6}"),
            None => "-".to_string(),
        };
        let cost = report.expected_cost.get(cycle).map_or(f64::NAN, |p| p.value);
        writeln!(out, " {survival:>10.6} {prevalence:>10} {cost:>12.4}")?;
    }
    Ok(out)
}

/// Render a tornado table; `sorted` orders rows by descending swing.
pub fn render_tornado(table: &TornadoTable, format: OutputFormat, sorted: bool) -> Result<String> {
    let rows = if sorted {
        table.sorted_by_swing()
    } else {
        table.rows().to_vec()
    };

    if format == OutputFormat::Json {
        #[derive(Serialize)]
        struct Output<'a> {
            metric: &'a str,
            base_outcome: f64,
            rows: &'a [TornadoRow],
            drift: SensitivityDrift,
        }
        let output = Output {
            metric: table.metric.label(),
            base_outcome: table.base_outcome,
            rows: &rows,
            drift: table.drift,
        };
        return Ok(serde_json::to_string_pretty(&output)?);
    }

    let mut out = String::new();
    writeln!(
        out,
        "One-way sensitivity: {} (base case {:.4})",
        table.metric.label(),
        table.base_outcome
    )?;
    writeln!(out)?;
    writeln!(
        out,
        "{:<10} {:>10} {:>10} {:>14} {:>14} {:>14} {:>12}",
        "Parameter", "Low", "High", "Low outcome", "Base outcome", "High outcome", "Swing"
    )?;
    for row in &rows {
        writeln!(
            out,
            "{:<10} {:>10.4} {:>10.4} {:>14.4} {:>14.4} {:>14.4} {:>12.4}",
            row.parameter.symbol(),
            row.low_value,
            row.high_value,
            row.low_outcome,
            row.base_outcome,
            row.high_outcome,
            row.swing()
        )?;
    }
    if !table.drift.is_clean() {
        writeln!(out)?;
        writeln!(
            out,
            "Warning: probability mass drifted in {} evaluation(s), max deviation {:.3e}",
            table.drift.drifted_evaluations, table.drift.max_deviation
        )?;
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use cohortsim_core::{
        ModelParameters, OutcomeMetric, SensitivityConfig, evaluate, one_way_sensitivity,
    };

    use super::*;

    fn short_scenario() -> ScenarioConfig {
        let mut scenario = ScenarioConfig::default();
        scenario.parameters.cycles = 3;
        scenario
    }

    #[test]
    fn test_run_text_lists_every_cycle() {
        let scenario = short_scenario();
        let eval = evaluate(&scenario.parameters).unwrap();
        let report = RunReport::new(&scenario, &eval).unwrap();
        let text = render_run(&report, OutputFormat::Text).unwrap();

        assert!(text.contains("Scenario: Healthy-Sick-Dead"));
        assert!(text.contains("Life expectancy"));
        assert!(text.contains("0.930000"), "Healthy share after one cycle");
        assert!(!text.contains("Warning"));
        assert_eq!(report.trace.len(), 4 * 3);
    }

    #[test]
    fn test_run_json_is_parseable() {
        let scenario = short_scenario();
        let eval = evaluate(&scenario.parameters).unwrap();
        let report = RunReport::new(&scenario, &eval).unwrap();
        let json = render_run(&report, OutputFormat::Json).unwrap();

        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["summary"]["cycles"], 3);
        assert_eq!(value["survival"].as_array().unwrap().len(), 4);
        assert_eq!(value["trace"][0]["state"], "Healthy");
    }

    #[test]
    fn test_tornado_sorted_and_unsorted() {
        let config = SensitivityConfig::default().with_metric(OutcomeMetric::DiscountedCost);
        let table = one_way_sensitivity(&ModelParameters::default(), &config, None).unwrap();

        let text = render_tornado(&table, OutputFormat::Text, false).unwrap();
        let hd = text.find("p.HD").unwrap();
        let sd = text.find("p.SD").unwrap();
        assert!(hd < sd, "Unsorted output keeps caller order");

        let json = render_tornado(&table, OutputFormat::Json, true).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        let rows = value["rows"].as_array().unwrap();
        assert_eq!(rows.len(), 3);
        let swing = |r: &serde_json::Value| {
            (r["high_outcome"].as_f64().unwrap() - r["low_outcome"].as_f64().unwrap()).abs()
        };
        assert!(swing(&rows[0]) >= swing(&rows[1]));
        assert!(swing(&rows[1]) >= swing(&rows[2]));
        assert_eq!(value["metric"], "Discounted Cost");
        assert_eq!(value["drift"]["drifted_evaluations"], 0);
        assert!(!text.contains("Warning"));
    }
}
