//! Georeferenced rasters as formula operands

mod arith;
mod element;
mod geotransform;
mod grid;
mod rows;
mod stack;

pub use element::RasterElement;
pub use geotransform::GeoTransform;
pub use grid::Raster;
pub use stack::RasterStack;
