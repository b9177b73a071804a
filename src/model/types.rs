//! Core types for equation representation.

use std::collections::HashMap;
use std::fmt;

use crate::error::{Result, ScmError};

/// Position of a variable in the vocabulary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VarIndex(pub usize);

impl fmt::Display for VarIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "V{}", self.0)
    }
}

/// Ordered, duplicate-free list of variable names valid in a parsing context.
///
/// The order is authoritative: coefficient vectors are aligned with it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vocabulary {
    names: Vec<String>,
    positions: HashMap<String, VarIndex>,
}

impl Vocabulary {
    /// Build a vocabulary, rejecting duplicate or unusable names.
    pub fn new<I, S>(names: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vocab = Self::default();
        for name in names {
            let name = name.into();
            check_name(&name)?;
            if vocab.positions.contains_key(&name) {
                return Err(ScmError::InvalidVocabulary {
                    name,
                    message: "duplicate variable".to_string(),
                });
            }
            vocab
                .positions
                .insert(name.clone(), VarIndex(vocab.names.len()));
            vocab.names.push(name);
        }
        Ok(vocab)
    }

    /// An empty vocabulary (parentless node).
    pub fn empty() -> Self {
        Self::default()
    }

    /// Number of variables.
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Position of `name`, if it is part of the vocabulary.
    pub fn position(&self, name: &str) -> Option<VarIndex> {
        self.positions.get(name).copied()
    }

    /// Name at `index`.
    pub fn name(&self, index: VarIndex) -> &str {
        &self.names[index.0]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Longest variable name that `rest` starts with.
    ///
    /// Returns the variable and the matched length in bytes. Names may contain
    /// digits and underscores, so matching is done against the known names
    /// rather than a generic identifier pattern.
    pub fn longest_match(&self, rest: &str) -> Option<(VarIndex, usize)> {
        self.names
            .iter()
            .enumerate()
            .filter(|(_, name)| rest.starts_with(name.as_str()))
            .max_by_key(|(_, name)| name.len())
            .map(|(i, name)| (VarIndex(i), name.len()))
    }

    /// Whether any variable name contains `ch`.
    pub fn contains_char(&self, ch: char) -> bool {
        self.names.iter().any(|name| name.contains(ch))
    }
}

fn check_name(name: &str) -> Result<()> {
    let invalid = |message: &str| ScmError::InvalidVocabulary {
        name: name.to_string(),
        message: message.to_string(),
    };

    let first = name.chars().next().ok_or_else(|| invalid("empty name"))?;
    if first.is_ascii_digit() {
        return Err(invalid("name cannot start with a digit"));
    }
    if !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        return Err(invalid("only ASCII letters, digits and '_' are allowed"));
    }
    Ok(())
}

/// Multiset of at most two parents, stored as sorted vocabulary positions.
///
/// A quadratic term holds the same index twice. Two terms reference the same
/// parents exactly when their sets compare equal, regardless of the order the
/// variables were written in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ParentSet(Vec<VarIndex>);

impl ParentSet {
    /// The bias (no parents) set.
    pub fn bias() -> Self {
        Self(Vec::new())
    }

    /// Build from occurrences in any order.
    pub(crate) fn from_occurrences(mut occurrences: Vec<VarIndex>) -> Self {
        occurrences.sort_unstable();
        Self(occurrences)
    }

    /// Number of parent occurrences (0, 1 or 2).
    pub fn degree(&self) -> usize {
        self.0.len()
    }

    /// True when one variable is squared.
    pub fn is_quadratic(&self) -> bool {
        self.0.len() == 2 && self.0[0] == self.0[1]
    }

    pub fn indices(&self) -> &[VarIndex] {
        &self.0
    }

    /// Parent names, sorted by vocabulary position.
    pub fn names<'v>(&self, vocab: &'v Vocabulary) -> Vec<&'v str> {
        self.0.iter().map(|&i| vocab.name(i)).collect()
    }

    /// Render as `A,B` for messages.
    pub fn display(&self, vocab: &Vocabulary) -> String {
        self.names(vocab).join(",")
    }
}

/// One additive monomial of an equation.
#[derive(Debug, Clone, PartialEq)]
pub struct Term {
    /// Referenced parents
    pub parents: ParentSet,
    /// Scalar multiplier
    pub coefficient: f64,
}

impl Term {
    pub fn new(parents: ParentSet, coefficient: f64) -> Self {
        Self {
            parents,
            coefficient,
        }
    }
}
