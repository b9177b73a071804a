//! # scm_desc
//!
//! Front end for describing structural causal models.
//!
//! This library turns node description lines into validated numeric
//! configurations that a graph-sampling engine can consume:
//! - A term parser for monomials such as `-0.3AB` or `A^2`
//! - An equation parser for signed sums of terms
//! - A node parser for constants, distributions, deterministic functions,
//!   data-backed nodes and random placeholders
//!
//! ## Architecture
//!
//! - [`dsl`] - Lexer and parsers for terms, equations and node lines
//! - [`model`] - Vocabulary, terms, coefficient structures and node configurations
//! - [`resolve`] - Capability for locating externally defined functions
//! - [`error`] - Unified error type
//!
//! ## Usage
//!
//! ```
//! use scm_desc::{dsl, model::{NodeConfig, Vocabulary}, resolve::ScriptResolver};
//!
//! let parents = Vocabulary::new(["A", "B"]).unwrap();
//! let node = dsl::parse_node("bernoulli(p_=2A+B^2)", &parents, &ScriptResolver::new()).unwrap();
//!
//! if let NodeConfig::Stochastic(node) = node {
//!     let p = node.distribution.param("p_").unwrap();
//!     assert_eq!(p.linear, vec![2.0, 0.0]);
//!     assert_eq!(p.interactions, vec![0.0, 0.0, 1.0]);
//! }
//! ```
//!
//! ## Coefficient Layout
//!
//! For `n` parents, a distribution parameter is folded into a bias, `n`
//! linear coefficients in parent order, and `n(n+1)/2` interaction
//! coefficients. The interaction slot of the pair `(i, j)`, `i <= j`, is the
//! row-major position in the upper triangle including the diagonal:
//!
//! ```text
//!        A    B    C
//!   A  [ 0    1    2 ]
//!   B  [      3    4 ]
//!   C  [           5 ]
//! ```
//!
//! Diagonal slots hold quadratic coefficients.

pub mod dsl;
pub mod error;
pub mod model;
pub mod resolve;

// WASM bindings
#[cfg(feature = "wasm")]
mod wasm;

// Re-export main types for convenience
pub use dsl::{parse_equation, parse_node, parse_term, NodeParser};
pub use error::{ErrorKind, Result, ScmError};
pub use model::{Coefficients, NodeConfig, Vocabulary};
pub use resolve::{FunctionHandle, FunctionResolver, ScriptResolver, StaticResolver};

#[cfg(feature = "wasm")]
pub use wasm::{WasmNodeConfig, WasmNodeParser};
