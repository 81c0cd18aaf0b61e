//! Spectral index computation
//!
//! - Resolve: merge caller parameters, keyword overrides and constant defaults
//! - Evaluate: run a parsed formula over any `SpectralValue`
//! - Compute: batch lookup, resolution and evaluation by index or kernel name
//! - Engine: the same over a refreshable catalog, plus ad-hoc formulas

mod compute;
mod engine;
mod evaluate;
mod resolve;

pub use compute::{
    compute_index, compute_kernel, Combiner, ComputeOptions, Computed, Names, Output,
};
pub use engine::{SpectralEngine, DEFAULT_FORMULA_CAPACITY};
pub use evaluate::evaluate;
pub use resolve::{resolve_bindings, Bindings};
