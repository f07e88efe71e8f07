//! Serialisable scenario: base-case parameters plus run and sensitivity options

use serde::{Deserialize, Serialize};

use crate::analysis::SensitivityConfig;
use crate::error::Result;
use crate::model::{ModelParameters, TraceOptions};

/// Top-level input of a model run
///
/// Every field has a default, so a scenario file only needs to list what
/// differs from the reference Healthy / Sick / Dead scenario.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub name: String,
    pub parameters: ModelParameters,
    pub trace: TraceOptions,
    pub sensitivity: SensitivityConfig,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self {
            name: "Healthy-Sick-Dead".to_string(),
            parameters: ModelParameters::default(),
            trace: TraceOptions::default(),
            sensitivity: SensitivityConfig::default(),
        }
    }
}

impl ScenarioConfig {
    /// Validate the base case and every sensitivity target name.
    pub fn validate(&self) -> Result<()> {
        self.parameters.validate()?;
        for range in &self.sensitivity.ranges {
            range.resolve()?;
        }
        Ok(())
    }

    /// Sensitivity settings with this scenario's trace options, so a base
    /// case run and its variants share one drift policy.
    #[must_use]
    pub fn sensitivity_config(&self) -> SensitivityConfig {
        SensitivityConfig {
            trace: self.trace,
            ..self.sensitivity.clone()
        }
    }
}
