//! Cellwise raster arithmetic
//!
//! Nodata in any operand produces NaN in the output, and a divisor closer
//! to zero than `1e-10` produces NaN rather than an infinity. Output rasters
//! always use NaN as their nodata marker.

use ndarray::Array2;

use super::rows::collect_rows;
use super::stack::RasterStack;
use super::{Raster, RasterElement};
use crate::error::{Error, Result};
use crate::value::{BinaryOp, SpectralValue, Stacking, UnaryFn};

#[inline]
fn cell_op(op: BinaryOp, a: f64, b: f64) -> f64 {
    match op {
        BinaryOp::Div if b.abs() < 1e-10 => f64::NAN,
        _ => op.apply(a, b),
    }
}

/// Apply `f` to every valid cell.
fn map_valid<F>(raster: &Raster<f64>, f: F) -> Result<Raster<f64>>
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    let (rows, cols) = raster.shape();

    let data = collect_rows(rows, cols, |row, out| {
        for (col, cell) in out.iter_mut().enumerate() {
            let v = unsafe { raster.get_unchecked(row, col) };
            if raster.is_nodata(v) {
                continue;
            }
            *cell = f(v);
        }
    });

    build_output(raster, rows, cols, data)
}

fn build_output(like: &Raster<f64>, rows: usize, cols: usize, data: Vec<f64>) -> Result<Raster<f64>> {
    let mut output = like.with_same_meta::<f64>(rows, cols);
    output.set_nodata(Some(f64::NAN));
    *output.data_mut() =
        Array2::from_shape_vec((rows, cols), data).map_err(|e| Error::Other(e.to_string()))?;
    Ok(output)
}

/// Check that two rasters cover the same grid.
pub(crate) fn check_aligned(a: &Raster<f64>, b: &Raster<f64>) -> Result<()> {
    if a.shape() != b.shape() {
        return Err(Error::SizeMismatch {
            er: a.rows(),
            ec: a.cols(),
            ar: b.rows(),
            ac: b.cols(),
        });
    }
    if !a.transform().aligns_with(b.transform()) {
        return Err(Error::IncompatibleOperands(
            "rasters have different geotransforms".into(),
        ));
    }
    Ok(())
}

impl SpectralValue for Raster<f64> {
    type Stacked = RasterStack;

    /// A 1x1 raster holding `value`.
    fn from_scalar(value: f64) -> Self {
        Raster::filled(1, 1, value)
    }

    fn binary(&self, op: BinaryOp, rhs: &Self) -> Result<Self> {
        check_aligned(self, rhs)?;

        let (rows, cols) = self.shape();
        let data = collect_rows(rows, cols, |row, out| {
            for (col, cell) in out.iter_mut().enumerate() {
                let va = unsafe { self.get_unchecked(row, col) };
                let vb = unsafe { rhs.get_unchecked(row, col) };

                if self.is_nodata(va) || rhs.is_nodata(vb) {
                    continue;
                }

                *cell = cell_op(op, va, vb);
            }
        });

        build_output(self, rows, cols, data)
    }

    fn binary_scalar(&self, op: BinaryOp, rhs: f64) -> Result<Self> {
        map_valid(self, |v| cell_op(op, v, rhs))
    }

    fn scalar_binary(lhs: f64, op: BinaryOp, rhs: &Self) -> Result<Self> {
        map_valid(rhs, |v| cell_op(op, lhs, v))
    }

    fn apply(&self, func: UnaryFn) -> Self {
        let (rows, cols) = self.shape();
        let mut out = self.with_same_meta::<f64>(rows, cols);
        out.set_nodata(Some(f64::NAN));
        let nodata = self.nodata();
        *out.data_mut() = self.data().mapv(|v| {
            if v.is_nodata(nodata) {
                f64::NAN
            } else {
                func.apply(v)
            }
        });
        out
    }

    fn stacking() -> Stacking {
        Stacking::Labeled
    }

    fn stack(values: Vec<Self>, labels: &[String], coordinate: &str) -> Result<RasterStack> {
        RasterStack::new(coordinate, labels.iter().cloned().zip(values))
    }
}
