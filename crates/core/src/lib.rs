//! # specdex core
//!
//! Value types, formulas and errors shared by the specdex crates.
//!
//! This crate provides:
//! - `SpectralValue`: the arithmetic capability a formula needs from its operands
//! - `Formula`: parsed index and kernel expressions, with a parse cache
//! - Value types: `f64`/`f32`, `ArrayD<f64>`, `LabeledArray`, `Series`, `Raster<f64>`
//! - `Error`: the error type every specdex operation reports

pub mod error;
pub mod formula;
pub mod labeled;
pub mod raster;
pub mod table;
pub mod value;

pub use error::{EntryKind, Error, Result};
pub use formula::{Expr, Formula, FormulaCache};
pub use labeled::LabeledArray;
pub use raster::{GeoTransform, Raster, RasterElement, RasterStack};
pub use table::{Frame, Series};
pub use value::{BinaryOp, Operand, Params, SpectralValue, Stacking, UnaryFn};

/// Prelude for convenient imports
pub mod prelude {
    pub use crate::error::{EntryKind, Error, Result};
    pub use crate::formula::Formula;
    pub use crate::labeled::LabeledArray;
    pub use crate::raster::{GeoTransform, Raster, RasterStack};
    pub use crate::table::{Frame, Series};
    pub use crate::value::{Operand, Params, SpectralValue};
}
