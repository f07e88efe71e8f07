//! Row-stochastic transition matrix

use serde::{Deserialize, Serialize};

use super::states::StateId;
use crate::error::{ModelError, Result};

/// Tolerance for a row of a transition matrix summing to 1
pub const ROW_SUM_TOLERANCE: f64 = 1e-9;

/// Square matrix of per-cycle transition probabilities, `(from, to)` indexed
/// in state-space order.
///
/// Every row sums to 1 within [`ROW_SUM_TOLERANCE`]. The matrix is never
/// mutated after construction. Serialises as a list of rows and is
/// validated through [`TransitionMatrix::from_rows`] when deserialised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Vec<f64>>", into = "Vec<Vec<f64>>")]
pub struct TransitionMatrix {
    size: usize,
    /// Row-major, `size * size` entries
    data: Vec<f64>,
}

impl TransitionMatrix {
    /// Build from explicit rows.
    ///
    /// Fails with `InvalidDimension` for ragged or non-square input and with
    /// `InvalidParameter` when an entry is not a probability or a row does
    /// not sum to 1.
    pub fn from_rows(rows: Vec<Vec<f64>>) -> Result<Self> {
        let size = rows.len();
        if size == 0 {
            return Err(ModelError::InvalidDimension {
                context: "transition matrix",
                expected: 1,
                found: 0,
            });
        }

        let mut data = Vec::with_capacity(size * size);
        for row in &rows {
            if row.len() != size {
                return Err(ModelError::InvalidDimension {
                    context: "transition matrix row",
                    expected: size,
                    found: row.len(),
                });
            }
            data.extend_from_slice(row);
        }

        let matrix = Self { size, data };
        matrix.check_stochastic()?;
        Ok(matrix)
    }

    /// Trusted constructor for builders that already enforce the invariants.
    pub(crate) fn from_raw(size: usize, data: Vec<f64>) -> Self {
        debug_assert_eq!(data.len(), size * size);
        Self { size, data }
    }

    fn check_stochastic(&self) -> Result<()> {
        for (i, row) in self.rows().enumerate() {
            for (j, &p) in row.iter().enumerate() {
                if !p.is_finite() || !(0.0..=1.0).contains(&p) {
                    return Err(ModelError::invalid(
                        format!("P({i}->{j})"),
                        p,
                        "probability must be in [0, 1]",
                    ));
                }
            }
            let sum: f64 = row.iter().sum();
            if (sum - 1.0).abs() > ROW_SUM_TOLERANCE {
                return Err(ModelError::invalid(
                    format!("row {i}"),
                    sum,
                    "transition row must sum to 1",
                ));
            }
        }
        Ok(())
    }

    /// Number of states
    pub fn size(&self) -> usize {
        self.size
    }

    /// Probability of moving `from` -> `to` in one cycle.
    ///
    /// # Panics
    /// If either state is outside the matrix.
    pub fn get(&self, from: StateId, to: StateId) -> f64 {
        assert!(from.0 < self.size && to.0 < self.size);
        self.data[from.0 * self.size + to.0]
    }

    /// Outgoing probabilities of one state
    pub fn row(&self, from: StateId) -> &[f64] {
        let start = from.0 * self.size;
        &self.data[start..start + self.size]
    }

    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.size)
    }

    pub fn row_sums(&self) -> Vec<f64> {
        self.rows().map(|r| r.iter().sum()).collect()
    }

    /// True if no mass ever leaves `state`.
    pub fn is_absorbing(&self, state: StateId) -> bool {
        self.get(state, state) == 1.0
    }

    /// One cycle of redistribution: `out = dist · M`.
    ///
    /// Accumulation order is fixed (source state outer, target state inner)
    /// so repeated runs are bit-identical.
    pub(crate) fn propagate(&self, dist: &[f64], out: &mut [f64]) {
        out.fill(0.0);
        for (mass, row) in dist.iter().zip(self.rows()) {
            if *mass == 0.0 {
                continue;
            }
            for (o, p) in out.iter_mut().zip(row) {
                *o += mass * p;
            }
        }
    }
}

impl TryFrom<Vec<Vec<f64>>> for TransitionMatrix {
    type Error = ModelError;

    fn try_from(rows: Vec<Vec<f64>>) -> Result<Self> {
        Self::from_rows(rows)
    }
}

impl From<TransitionMatrix> for Vec<Vec<f64>> {
    fn from(matrix: TransitionMatrix) -> Self {
        matrix.rows().map(<[f64]>::to_vec).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rows_valid() {
        let m = TransitionMatrix::from_rows(vec![vec![0.9, 0.1], vec![0.0, 1.0]]).unwrap();
        assert_eq!(m.size(), 2);
        assert_eq!(m.get(StateId(0), StateId(1)), 0.1);
        assert!(m.is_absorbing(StateId(1)));
        assert!(!m.is_absorbing(StateId(0)));
    }

    #[test]
    fn test_from_rows_rejects_non_square() {
        let err = TransitionMatrix::from_rows(vec![vec![1.0, 0.0, 0.0], vec![0.0, 1.0, 0.0]])
            .unwrap_err();
        assert!(matches!(err, ModelError::InvalidDimension { .. }));
    }

    #[test]
    fn test_from_rows_rejects_bad_rows() {
        assert!(matches!(
            TransitionMatrix::from_rows(vec![vec![0.5, 0.4], vec![0.0, 1.0]]),
            Err(ModelError::InvalidParameter { .. })
        ));
        assert!(matches!(
            TransitionMatrix::from_rows(vec![vec![1.5, -0.5], vec![0.0, 1.0]]),
            Err(ModelError::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_propagate_row_vector_times_matrix() {
        let m = TransitionMatrix::from_rows(vec![vec![0.5, 0.5], vec![0.2, 0.8]]).unwrap();
        let mut out = [0.0; 2];
        m.propagate(&[0.5, 0.5], &mut out);
        assert!((out[0] - 0.35).abs() < 1e-15);
        assert!((out[1] - 0.65).abs() < 1e-15);
    }

    #[test]
    fn test_deserialize_enforces_invariants() {
        let m: TransitionMatrix = serde_json::from_str("[[0.9, 0.1], [0.0, 1.0]]").unwrap();
        assert_eq!(m.get(StateId(0), StateId(1)), 0.1);
        assert_eq!(serde_json::to_string(&m).unwrap(), "[[0.9,0.1],[0.0,1.0]]");

        // ragged
        assert!(serde_json::from_str::<TransitionMatrix>("[[1.0], [0.0, 1.0]]").is_err());
        // second row sums to 0.7
        assert!(serde_json::from_str::<TransitionMatrix>("[[1.0, 0.0], [0.5, 0.2]]").is_err());
        assert!(serde_json::from_str::<TransitionMatrix>("[]").is_err());
        // the raw field layout is not accepted either
        assert!(
            serde_json::from_str::<TransitionMatrix>(r#"{"size":2,"data":[1.0]}"#).is_err()
        );
    }
}
