//! Scenario files
//!
//! Scenarios are YAML documents deserialised into [`ScenarioConfig`]. Any
//! field left out takes its value from the reference scenario, so an empty
//! file is a valid scenario.

use std::fs;
use std::path::Path;

use cohortsim_core::ScenarioConfig;
use color_eyre::eyre::{Result, WrapErr};

/// Read, parse and validate a scenario file.
pub fn load_scenario(path: &Path) -> Result<ScenarioConfig> {
    let content = fs::read_to_string(path)
        .wrap_err_with(|| format!("Failed to read scenario {}", path.display()))?;
    let scenario = parse_scenario(&content)
        .wrap_err_with(|| format!("Invalid scenario {}", path.display()))?;

    tracing::info!(
        path = %path.display(),
        name = %scenario.name,
        cycles = scenario.parameters.cycles,
        "Loaded scenario"
    );
    Ok(scenario)
}

/// The reference scenario unless a path is given.
pub fn load_scenario_or_default(path: Option<&Path>) -> Result<ScenarioConfig> {
    match path {
        Some(path) => load_scenario(path),
        None => {
            tracing::info!("No scenario file given; using the reference scenario");
            Ok(ScenarioConfig::default())
        }
    }
}

pub fn parse_scenario(yaml: &str) -> Result<ScenarioConfig> {
    let scenario: ScenarioConfig = if yaml.trim().is_empty() {
        ScenarioConfig::default()
    } else {
        serde_saphyr::from_str(yaml).wrap_err("Failed to parse scenario YAML")?
    };
    scenario.validate()?;
    Ok(scenario)
}

pub fn scenario_to_yaml(scenario: &ScenarioConfig) -> Result<String> {
    serde_saphyr::to_string(scenario).wrap_err("Failed to serialize scenario")
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use cohortsim_core::{OutcomeMetric, Parameter};
    use tempfile::NamedTempFile;

    use super::*;

    #[test]
    fn test_empty_file_is_reference_scenario() {
        let file = NamedTempFile::new().unwrap();
        let scenario = load_scenario(file.path()).unwrap();
        assert_eq!(scenario, ScenarioConfig::default());
    }

    #[test]
    fn test_partial_scenario_fills_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            "name: Faster progression
parameters:
  p_hs: 0.08
  cycles: 30
sensitivity:
  metric: life_expectancy
  ranges:
    - parameter: p.HS
      base_case: 0.08
      low: 0.04
      high: 0.16
    - parameter: c_s
      low: 50.0
      high: 200.0"
        )
        .unwrap();

        let scenario = load_scenario(file.path()).unwrap();
        assert_eq!(scenario.name, "Faster progression");
        assert_eq!(scenario.parameters.p_hs, 0.08);
        assert_eq!(scenario.parameters.p_hd, 0.02, "Unset fields keep defaults");
        assert_eq!(scenario.parameters.cycles, 30);
        assert_eq!(scenario.sensitivity.metric, OutcomeMetric::LifeExpectancy);
        assert_eq!(scenario.sensitivity.ranges.len(), 2);
        assert_eq!(
            scenario.sensitivity.ranges[1].resolve().unwrap(),
            Parameter::CostSick
        );
    }

    #[test]
    fn test_metric_only_sensitivity_block() {
        let scenario = parse_scenario("sensitivity:\n  metric: life_expectancy\n").unwrap();
        assert_eq!(scenario.sensitivity.metric, OutcomeMetric::LifeExpectancy);
        assert_eq!(
            scenario.sensitivity.ranges,
            cohortsim_core::analysis::default_ranges()
        );
    }

    #[test]
    fn test_invalid_scenario_is_rejected() {
        let err = parse_scenario("parameters:\n  p_hd: 1.5\n").unwrap_err();
        assert!(format!("{err:?}").contains("p.HD"));

        let err = parse_scenario(
            "sensitivity:\n  ranges:\n    - parameter: p.XY\n      low: 0.0\n      high: 1.0\n",
        )
        .unwrap_err();
        assert!(format!("{err:?}").contains("p.XY"));
    }

    #[test]
    fn test_missing_file_has_context() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.yaml");
        let err = load_scenario(&path).unwrap_err();
        assert!(format!("{err}").contains("Failed to read scenario"));
    }

    #[test]
    fn test_yaml_round_trip() {
        let scenario = ScenarioConfig::default();
        let yaml = scenario_to_yaml(&scenario).unwrap();
        assert_eq!(parse_scenario(&yaml).unwrap(), scenario);
    }

    #[test]
    fn test_default_when_no_path() {
        assert_eq!(
            load_scenario_or_default(None).unwrap(),
            ScenarioConfig::default()
        );
    }
}
