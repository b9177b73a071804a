//! Coefficient structure for one distribution parameter.

use super::types::Term;
use crate::error::{Result, ScmError};

/// Canonical index of the unordered pair `(i, j)` in the flattened upper
/// triangle (diagonal included) of an `n x n` matrix.
///
/// Pairs are enumerated row-major: `(0,0), (0,1), .., (0,n-1), (1,1), ..`.
/// The arguments may be given in either order.
pub fn interaction_index(i: usize, j: usize, n: usize) -> usize {
    let (i, j) = if i <= j { (i, j) } else { (j, i) };
    debug_assert!(j < n, "pair ({}, {}) out of range for {} variables", i, j, n);
    i * (2 * n - i + 1) / 2 + (j - i)
}

/// [`interaction_index`] for untrusted input: `None` unless both `i` and `j`
/// are below `n`.
pub fn checked_interaction_index(i: usize, j: usize, n: usize) -> Option<usize> {
    (i < n && j < n).then(|| interaction_index(i, j, n))
}

/// Number of interaction slots for `n` variables.
pub fn interaction_count(n: usize) -> usize {
    n * (n + 1) / 2
}

/// Structural equation of one distribution parameter over the node's parents.
#[derive(Debug, Clone, PartialEq)]
pub struct Coefficients {
    /// Constant term
    pub bias: f64,
    /// One entry per parent, in vocabulary order
    pub linear: Vec<f64>,
    /// Pairwise and quadratic terms, indexed by [`interaction_index`]
    pub interactions: Vec<f64>,
}

impl Coefficients {
    /// All-zero coefficients for `n` parents.
    pub fn zeros(n: usize) -> Self {
        Self {
            bias: 0.0,
            linear: vec![0.0; n],
            interactions: vec![0.0; interaction_count(n)],
        }
    }

    /// Fold terms into a fresh structure.
    ///
    /// Terms must come from one equation (no two share a parent set). A term
    /// referencing a variable at or beyond `n` is rejected.
    pub fn from_terms(terms: &[Term], n: usize) -> Result<Self> {
        let mut coefs = Self::zeros(n);
        for term in terms {
            coefs.add_term(term)?;
        }
        Ok(coefs)
    }

    /// Add a term's coefficient to the slot its parents address.
    pub fn add_term(&mut self, term: &Term) -> Result<()> {
        let n = self.linear.len();
        let out_of_range = || {
            ScmError::term(
                format!("{:?}", term.parents.indices()),
                format!("parent index out of range for {} parents", n),
            )
        };
        let slot = match term.parents.indices() {
            [] => &mut self.bias,
            [i] => self.linear.get_mut(i.0).ok_or_else(out_of_range)?,
            [i, j] => {
                let index = checked_interaction_index(i.0, j.0, n).ok_or_else(out_of_range)?;
                &mut self.interactions[index]
            }
            _ => {
                return Err(ScmError::term(
                    format!("{:?}", term.parents.indices()),
                    "terms are at most second degree",
                ))
            }
        };
        *slot += term.coefficient;
        Ok(())
    }

    /// Coefficient of the pair `(i, j)`.
    pub fn interaction(&self, i: usize, j: usize) -> f64 {
        self.interactions[interaction_index(i, j, self.linear.len())]
    }

    /// True when every coefficient is zero.
    pub fn is_zero(&self) -> bool {
        self.bias == 0.0
            && self.linear.iter().all(|&c| c == 0.0)
            && self.interactions.iter().all(|&c| c == 0.0)
    }
}
