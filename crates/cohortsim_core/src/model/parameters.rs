//! Typed model parameters for the canonical three-state model
//!
//! [`ModelParameters`] is a plain value. Sensitivity analysis derives
//! variants from it with [`ModelParameters::with_value`], which copies the
//! record and replaces exactly one field.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::states::StateVector;
use crate::error::{ModelError, Result, check_probability};

/// Tolerance when checking that a row's explicit exits do not exceed 1
pub const ROW_EXCESS_TOLERANCE: f64 = 1e-12;

/// What a parameter measures, used for validation and display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ParameterKind {
    Probability,
    Cost,
    Utility,
    DiscountRate,
}

/// Named scalar parameter of [`ModelParameters`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Parameter {
    #[serde(rename = "p.HD")]
    HealthyToDead,
    #[serde(rename = "p.HS")]
    HealthyToSick,
    #[serde(rename = "p.SD")]
    SickToDead,
    #[serde(rename = "c.H")]
    CostHealthy,
    #[serde(rename = "c.S")]
    CostSick,
    #[serde(rename = "c.D")]
    CostDead,
    #[serde(rename = "u.H")]
    UtilityHealthy,
    #[serde(rename = "u.S")]
    UtilitySick,
    #[serde(rename = "u.D")]
    UtilityDead,
    #[serde(rename = "d.r")]
    DiscountRate,
}

impl Parameter {
    pub const ALL: [Parameter; 10] = [
        Parameter::HealthyToDead,
        Parameter::HealthyToSick,
        Parameter::SickToDead,
        Parameter::CostHealthy,
        Parameter::CostSick,
        Parameter::CostDead,
        Parameter::UtilityHealthy,
        Parameter::UtilitySick,
        Parameter::UtilityDead,
        Parameter::DiscountRate,
    ];

    /// The transition probabilities, the default sensitivity targets
    pub const TRANSITIONS: [Parameter; 3] = [
        Parameter::HealthyToDead,
        Parameter::HealthyToSick,
        Parameter::SickToDead,
    ];

    /// Short symbol, e.g. `p.HD`
    #[must_use]
    pub fn symbol(self) -> &'static str {
        match self {
            Parameter::HealthyToDead => "p.HD",
            Parameter::HealthyToSick => "p.HS",
            Parameter::SickToDead => "p.SD",
            Parameter::CostHealthy => "c.H",
            Parameter::CostSick => "c.S",
            Parameter::CostDead => "c.D",
            Parameter::UtilityHealthy => "u.H",
            Parameter::UtilitySick => "u.S",
            Parameter::UtilityDead => "u.D",
            Parameter::DiscountRate => "d.r",
        }
    }

    /// Field name in [`ModelParameters`]
    #[must_use]
    pub fn field_name(self) -> &'static str {
        match self {
            Parameter::HealthyToDead => "p_hd",
            Parameter::HealthyToSick => "p_hs",
            Parameter::SickToDead => "p_sd",
            Parameter::CostHealthy => "c_h",
            Parameter::CostSick => "c_s",
            Parameter::CostDead => "c_d",
            Parameter::UtilityHealthy => "u_h",
            Parameter::UtilitySick => "u_s",
            Parameter::UtilityDead => "u_d",
            Parameter::DiscountRate => "discount_rate",
        }
    }

    #[must_use]
    pub fn kind(self) -> ParameterKind {
        match self {
            Parameter::HealthyToDead | Parameter::HealthyToSick | Parameter::SickToDead => {
                ParameterKind::Probability
            }
            Parameter::CostHealthy | Parameter::CostSick | Parameter::CostDead => {
                ParameterKind::Cost
            }
            Parameter::UtilityHealthy | Parameter::UtilitySick | Parameter::UtilityDead => {
                ParameterKind::Utility
            }
            Parameter::DiscountRate => ParameterKind::DiscountRate,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Parameter {
    type Err = ModelError;

    /// Accepts either the symbol (`p.SD`) or the field name (`p_sd`).
    fn from_str(s: &str) -> Result<Self> {
        Parameter::ALL
            .into_iter()
            .find(|p| p.symbol() == s || p.field_name() == s)
            .ok_or_else(|| ModelError::UnknownParameter(s.to_string()))
    }
}

/// Inputs of the canonical Healthy / Sick / Dead model
///
/// Defaults are the reference scenario: 60 annual cycles at a 3% discount
/// rate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelParameters {
    /// Healthy -> Dead per cycle
    pub p_hd: f64,
    /// Healthy -> Sick per cycle
    pub p_hs: f64,
    /// Sick -> Dead per cycle
    pub p_sd: f64,
    pub c_h: f64,
    pub c_s: f64,
    pub c_d: f64,
    pub u_h: f64,
    pub u_s: f64,
    pub u_d: f64,
    pub discount_rate: f64,
    pub cycles: usize,
}

impl Default for ModelParameters {
    fn default() -> Self {
        Self {
            p_hd: 0.02,
            p_hs: 0.05,
            p_sd: 0.1,
            c_h: 400.0,
            c_s: 100.0,
            c_d: 0.0,
            u_h: 0.8,
            u_s: 0.5,
            u_d: 0.0,
            discount_rate: 0.03,
            cycles: 60,
        }
    }
}

impl ModelParameters {
    /// Read a parameter by name
    #[must_use]
    pub fn get(&self, parameter: Parameter) -> f64 {
        match parameter {
            Parameter::HealthyToDead => self.p_hd,
            Parameter::HealthyToSick => self.p_hs,
            Parameter::SickToDead => self.p_sd,
            Parameter::CostHealthy => self.c_h,
            Parameter::CostSick => self.c_s,
            Parameter::CostDead => self.c_d,
            Parameter::UtilityHealthy => self.u_h,
            Parameter::UtilitySick => self.u_s,
            Parameter::UtilityDead => self.u_d,
            Parameter::DiscountRate => self.discount_rate,
        }
    }

    /// Copy of `self` with exactly one parameter replaced.
    #[must_use]
    pub fn with_value(&self, parameter: Parameter, value: f64) -> Self {
        let mut copy = self.clone();
        let slot = match parameter {
            Parameter::HealthyToDead => &mut copy.p_hd,
            Parameter::HealthyToSick => &mut copy.p_hs,
            Parameter::SickToDead => &mut copy.p_sd,
            Parameter::CostHealthy => &mut copy.c_h,
            Parameter::CostSick => &mut copy.c_s,
            Parameter::CostDead => &mut copy.c_d,
            Parameter::UtilityHealthy => &mut copy.u_h,
            Parameter::UtilitySick => &mut copy.u_s,
            Parameter::UtilityDead => &mut copy.u_d,
            Parameter::DiscountRate => &mut copy.discount_rate,
        };
        *slot = value;
        copy
    }

    #[must_use]
    pub fn with_cycles(&self, cycles: usize) -> Self {
        Self {
            cycles,
            ..self.clone()
        }
    }

    /// Check every field against its admissible range.
    pub fn validate(&self) -> Result<()> {
        for parameter in Parameter::ALL {
            let value = self.get(parameter);
            let name = parameter.symbol();
            match parameter.kind() {
                ParameterKind::Probability => check_probability(name, value)?,
                ParameterKind::Cost => {
                    if !value.is_finite() || value < 0.0 {
                        return Err(ModelError::invalid(
                            name,
                            value,
                            "cost must be finite and non-negative",
                        ));
                    }
                }
                ParameterKind::Utility => {
                    if !value.is_finite() {
                        return Err(ModelError::invalid(name, value, "utility must be finite"));
                    }
                }
                ParameterKind::DiscountRate => {
                    if !value.is_finite() || value < 0.0 {
                        return Err(ModelError::invalid(
                            name,
                            value,
                            "discount rate must be finite and non-negative",
                        ));
                    }
                }
            }
        }

        let healthy_exits = self.p_hd + self.p_hs;
        if healthy_exits > 1.0 + ROW_EXCESS_TOLERANCE {
            return Err(ModelError::invalid(
                "p.HD + p.HS",
                healthy_exits,
                "transitions leaving Healthy exceed 1",
            ));
        }
        Ok(())
    }

    /// Per-cycle cost of each canonical state
    #[must_use]
    pub fn cost_vector(&self) -> StateVector {
        canonical_vector([self.c_h, self.c_s, self.c_d])
    }

    /// Per-cycle utility of each canonical state
    #[must_use]
    pub fn utility_vector(&self) -> StateVector {
        canonical_vector([self.u_h, self.u_s, self.u_d])
    }
}

fn canonical_vector(values: [f64; 3]) -> StateVector {
    StateVector::from_values(values.to_vec())
}
