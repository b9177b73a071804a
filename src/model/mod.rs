//! Data model for parsed description lines.
//!
//! This module holds everything the parser produces: the ordered vocabulary
//! of parent variables, terms and their parent multisets, the coefficient
//! structure a distribution parameter is folded into, and the closed set of
//! node configurations handed to the graph-construction stage.

mod coefficients;
mod node;
mod types;

pub use coefficients::{
    checked_interaction_index, interaction_count, interaction_index, Coefficients,
};
pub use node::{CorrectionConfig, Distribution, DistributionKind, NodeConfig, StochasticNode};
pub use types::*;
