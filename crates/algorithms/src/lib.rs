//! # specdex algorithms
//!
//! Spectral index and kernel computation over caller-chosen value types.
//!
//! ## Modules
//!
//! - **imagery**: symbol resolution, formula evaluation, batch computation
//!   and the catalog-holding `SpectralEngine`

pub mod imagery;

pub use imagery::{compute_index, compute_kernel, ComputeOptions, SpectralEngine};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::imagery::{
        compute_index, compute_kernel, evaluate, resolve_bindings, Combiner, ComputeOptions,
        Computed, Names, Output, SpectralEngine,
    };
    pub use specdex_catalog::{Catalog, CatalogSource, IndexFilter, RemoteOptions};
    pub use specdex_core::prelude::*;
}
