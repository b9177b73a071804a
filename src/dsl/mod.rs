//! Parser for the node description language.
//!
//! Each node of a causal graph is described by one line. Distribution
//! parameters are written as structural equations over the node's parents:
//! sums of terms of at most second degree.
//!
//! # Grammar Overview
//!
//! ```text
//! node_line  = "constant(" number ")"
//!            | dist "(" param "=" equation { "," param "=" equation } ")" [correction]
//!            | "deterministic(" path "," identifier ")"
//!            | "data(" path ")"
//!            | "random"
//! correction = "," "correction[" [ key "=" number { "," key "=" number } ] "]"
//!
//! equation   = term { sign term }
//! term       = [sign] ( number | [number] name ( "^2" | { name } ) )
//! sign       = "+" | "-"
//! number     = digit { digit } [ "." { digit } ]
//! name       = any variable of the parent vocabulary
//!
//! dist       = "bernoulli" | "gaussian" | "uniform" | "lognormal"
//!            | "poisson" | "exponential"
//! ```
//!
//! # Distributions
//!
//! | Keyword | Parameters | Correction keys |
//! |---------|------------|-----------------|
//! | bernoulli | `p_` | `target_mean` |
//! | gaussian | `mu_`, `sigma_` | `lower`, `upper` |
//! | uniform | `mu_`, `diff_` | `lower`, `upper` |
//! | lognormal | `mu_`, `sigma_` | `lower`, `upper` |
//! | poisson | `lambda_` | `lower`, `upper` |
//! | exponential | `lambda_` | `lower`, `upper` |
//!
//! # Example
//!
//! ```text
//! # parents: A, B
//! gaussian(mu_=1 - 0.3AB + A^2, sigma_=2)
//! bernoulli(p_=2A + B^2), correction[target_mean=0.3]
//! deterministic(customs.py, custom_function)
//! ```

mod equation;
mod lexer;
mod parser;
mod term;

pub use equation::parse_equation;
pub use lexer::{parse_number, Lexer, Token, TokenKind};
pub use parser::{NodeKeyword, NodeParser};
pub use term::parse_term;

use crate::error::Result;
#[cfg(feature = "cli")]
use crate::error::ScmError;
use crate::model::{NodeConfig, Vocabulary};
use crate::resolve::FunctionResolver;

/// Parse a node line against its ordered parents.
pub fn parse_node(
    line: &str,
    parents: &Vocabulary,
    resolver: &dyn FunctionResolver,
) -> Result<NodeConfig> {
    NodeParser::new(resolver).parse(line, parents)
}

/// Parse a description file body: one node line per line.
///
/// Blank lines and lines starting with `#` are skipped. Parsing stops at the
/// first invalid line.
pub fn parse_lines(
    input: &str,
    parents: &Vocabulary,
    resolver: &dyn FunctionResolver,
) -> Result<Vec<NodeConfig>> {
    let parser = NodeParser::new(resolver);
    input
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(|line| parser.parse(line, parents))
        .collect()
}

/// Parse node lines from a file.
#[cfg(feature = "cli")]
pub fn parse_file(
    path: &std::path::Path,
    parents: &Vocabulary,
    resolver: &dyn FunctionResolver,
) -> Result<Vec<NodeConfig>> {
    let content = std::fs::read_to_string(path).map_err(|e| ScmError::FileReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_lines(&content, parents, resolver)
}
