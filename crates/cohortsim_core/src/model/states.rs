//! Health states and state-indexed vectors
//!
//! A [`StateSpace`] is the single source of truth for state ordering. Every
//! matrix row/column and every vector in the pipeline is indexed in that
//! order, and [`StateVector`] ties reward vectors and distributions to it so
//! that a cost vector can never be silently applied to the wrong column.

use std::ops::Index;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use crate::error::{ModelError, Result};

/// Index of a state within its [`StateSpace`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct StateId(pub usize);

/// Canonical healthy state
pub const HEALTHY: StateId = StateId(0);
/// Canonical sick state
pub const SICK: StateId = StateId(1);
/// Canonical absorbing death state
pub const DEAD: StateId = StateId(2);

pub const HEALTHY_NAME: &str = "Healthy";
pub const SICK_NAME: &str = "Sick";
pub const DEAD_NAME: &str = "Dead";

/// Ordered, immutable set of mutually exclusive health states
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StateSpace {
    names: Vec<String>,
    #[serde(skip)]
    lookup: FxHashMap<String, StateId>,
    /// Absorbing state used to derive overall survival
    death: Option<StateId>,
    /// State whose share among survivors is reported as prevalence
    sick: Option<StateId>,
}

impl StateSpace {
    /// Create a state space from distinct names, in order.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let names: Vec<String> = names.into_iter().map(Into::into).collect();
        if names.is_empty() {
            return Err(ModelError::invalid(
                "state count",
                0.0,
                "a state space needs at least one state",
            ));
        }

        let mut lookup = FxHashMap::default();
        for (i, name) in names.iter().enumerate() {
            if lookup.insert(name.clone(), StateId(i)).is_some() {
                return Err(ModelError::invalid(
                    format!("state {name}"),
                    i as f64,
                    "state names must be distinct",
                ));
            }
        }

        Ok(Self {
            names,
            lookup,
            death: None,
            sick: None,
        })
    }

    /// The three-state Healthy / Sick / Dead space.
    #[must_use]
    pub fn canonical() -> Self {
        let names = vec![
            HEALTHY_NAME.to_string(),
            SICK_NAME.to_string(),
            DEAD_NAME.to_string(),
        ];
        let lookup = names
            .iter()
            .enumerate()
            .map(|(i, n)| (n.clone(), StateId(i)))
            .collect();
        Self {
            names,
            lookup,
            death: Some(DEAD),
            sick: Some(SICK),
        }
    }

    /// Designate the absorbing death state by name.
    pub fn with_death_state(mut self, name: &str) -> Result<Self> {
        self.death = Some(self.id(name)?);
        Ok(self)
    }

    /// Designate the state reported as prevalence by name.
    pub fn with_sick_state(mut self, name: &str) -> Result<Self> {
        self.sick = Some(self.id(name)?);
        Ok(self)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    /// Always false; a state space cannot be constructed empty.
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Name of a state. Panics if `id` is outside the space.
    pub fn name(&self, id: StateId) -> &str {
        &self.names[id.0]
    }

    /// Look up a state by name
    pub fn id(&self, name: &str) -> Result<StateId> {
        self.lookup
            .get(name)
            .copied()
            .ok_or_else(|| ModelError::UnknownState(name.to_string()))
    }

    pub fn ids(&self) -> impl Iterator<Item = StateId> + '_ {
        (0..self.names.len()).map(StateId)
    }

    pub fn death_state(&self) -> Option<StateId> {
        self.death
    }

    pub fn sick_state(&self) -> Option<StateId> {
        self.sick
    }

    pub fn contains(&self, id: StateId) -> bool {
        id.0 < self.names.len()
    }
}

/// Values indexed by the states of a [`StateSpace`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateVector<T = f64> {
    values: Vec<T>,
}

impl<T> StateVector<T> {
    /// Wrap values given in state order.
    pub fn from_vec(space: &StateSpace, values: Vec<T>) -> Result<Self> {
        if values.len() != space.len() {
            return Err(ModelError::DimensionMismatch {
                what: "state vector",
                expected: space.len(),
                found: values.len(),
            });
        }
        Ok(Self { values })
    }

    /// Caller guarantees the length matches the intended space.
    pub(crate) fn from_values(values: Vec<T>) -> Self {
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, id: StateId) -> Option<&T> {
        self.values.get(id.0)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.values
    }

    pub fn iter(&self) -> impl Iterator<Item = (StateId, &T)> {
        self.values.iter().enumerate().map(|(i, v)| (StateId(i), v))
    }
}

impl<T: Clone + Default> StateVector<T> {
    /// Build from `(state name, value)` pairs; unnamed states get `T::default()`.
    pub fn from_named<'a, I>(space: &StateSpace, pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (&'a str, T)>,
    {
        let mut values = vec![T::default(); space.len()];
        for (name, value) in pairs {
            values[space.id(name)?.0] = value;
        }
        Ok(Self { values })
    }
}

impl StateVector<f64> {
    /// Distribution with all mass in `state`.
    pub fn point_mass(space: &StateSpace, state: StateId) -> Result<Self> {
        if !space.contains(state) {
            return Err(ModelError::InvalidDimension {
                context: "initial state",
                expected: space.len(),
                found: state.0,
            });
        }
        let mut values = vec![0.0; space.len()];
        values[state.0] = 1.0;
        Ok(Self { values })
    }

    pub fn sum(&self) -> f64 {
        self.values.iter().sum()
    }

    /// Dot product with a slice of the same length.
    pub fn dot(&self, other: &[f64]) -> f64 {
        self.values.iter().zip(other).map(|(a, b)| a * b).sum()
    }
}

impl<T> Index<StateId> for StateVector<T> {
    type Output = T;

    fn index(&self, id: StateId) -> &T {
        &self.values[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_canonical_order() {
        let space = StateSpace::canonical();
        assert_eq!(space.names(), &["Healthy", "Sick", "Dead"]);
        assert_eq!(space.id("Sick").unwrap(), SICK);
        assert_eq!(space.death_state(), Some(DEAD));
        assert_eq!(space.sick_state(), Some(SICK));
    }

    #[test]
    fn test_rejects_empty_and_duplicates() {
        assert!(matches!(
            StateSpace::new(Vec::<String>::new()),
            Err(ModelError::InvalidParameter { .. })
        ));
        assert!(matches!(
            StateSpace::new(["A", "B", "A"]),
            Err(ModelError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_designations() {
        let space = StateSpace::new(["Well", "Ill", "Gone"])
            .unwrap()
            .with_death_state("Gone")
            .unwrap()
            .with_sick_state("Ill")
            .unwrap();
        assert_eq!(space.death_state(), Some(StateId(2)));
        assert_eq!(space.sick_state(), Some(StateId(1)));
        assert_eq!(
            space.clone().with_death_state("Missing"),
            Err(ModelError::UnknownState("Missing".into()))
        );
    }

    #[test]
    fn test_state_vector_from_named() {
        let space = StateSpace::canonical();
        let costs = StateVector::from_named(&space, [("Sick", 100.0), ("Healthy", 400.0)]).unwrap();
        assert_eq!(costs.as_slice(), &[400.0, 100.0, 0.0]);
        assert_eq!(costs[SICK], 100.0);
        assert!(StateVector::from_named(&space, [("Other", 1.0)]).is_err());
    }

    #[test]
    fn test_state_vector_length_checked() {
        let space = StateSpace::canonical();
        let err = StateVector::from_vec(&space, vec![1.0, 0.0]).unwrap_err();
        assert_eq!(
            err,
            ModelError::DimensionMismatch {
                what: "state vector",
                expected: 3,
                found: 2
            }
        );
    }

    #[test]
    fn test_point_mass() {
        let space = StateSpace::canonical();
        let v = StateVector::point_mass(&space, HEALTHY).unwrap();
        assert_eq!(v.as_slice(), &[1.0, 0.0, 0.0]);
        assert_eq!(v.dot(&[400.0, 100.0, 0.0]), 400.0);
        assert!(StateVector::point_mass(&space, StateId(3)).is_err());
    }
}
