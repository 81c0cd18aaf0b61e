//! # specdex catalog
//!
//! The named definitions spectral computations are drawn from: spectral
//! indices, kernels, standard bands and constants with their defaults.
//!
//! The catalog is bundled with the crate and immutable once loaded. It can be
//! replaced wholesale by a fresh copy of the upstream Awesome Spectral
//! Indices files.
//!
//! ## Features
//!
//! - `online` (default): remote refresh via `reqwest` on a current-thread
//!   tokio runtime. Without it every refresh reports
//!   [`CatalogError::OnlineDisabled`].

pub mod catalog;
pub mod error;
#[cfg(feature = "online")]
mod http;
pub mod models;
pub mod refresh;

pub use catalog::{Catalog, Entries, IndexFilter};
pub use error::{CatalogError, Result};
pub use models::{BandDefinition, ConstantDefinition, IndexDefinition, KernelDefinition, PlatformBand};
pub use refresh::{CatalogSource, RefreshOutcome, RemoteOptions};
