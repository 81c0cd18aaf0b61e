//! `ndarray` arrays with NumPy broadcasting rules

use ndarray::{ArrayD, ArrayViewD, Axis, Zip};

use super::{BinaryOp, SpectralValue, Stacking, UnaryFn};
use crate::error::{Error, Result};

/// Shape two operands broadcast to, aligning trailing axes.
///
/// Axes match when they are equal or one of them is 1. Returns `None` when
/// the shapes cannot be broadcast together.
pub fn co_broadcast_shape(a: &[usize], b: &[usize]) -> Option<Vec<usize>> {
    let ndim = a.len().max(b.len());
    let mut out = vec![0; ndim];
    for i in 0..ndim {
        let da = if i < ndim - a.len() { 1 } else { a[i - (ndim - a.len())] };
        let db = if i < ndim - b.len() { 1 } else { b[i - (ndim - b.len())] };
        out[i] = match (da, db) {
            (x, y) if x == y => x,
            (1, y) => y,
            (x, 1) => x,
            _ => return None,
        };
    }
    Some(out)
}

/// Elementwise `f(a, b)` over two broadcast-compatible views.
pub(crate) fn zip_broadcast<F>(a: &ArrayViewD<'_, f64>, b: &ArrayViewD<'_, f64>, f: F) -> Result<ArrayD<f64>>
where
    F: Fn(f64, f64) -> f64,
{
    let shape = co_broadcast_shape(a.shape(), b.shape()).ok_or_else(|| {
        Error::IncompatibleOperands(format!(
            "operands could not be broadcast together with shapes {:?} {:?}",
            a.shape(),
            b.shape()
        ))
    })?;
    // co_broadcast_shape guarantees both views broadcast to `shape`
    let (av, bv) = match (a.broadcast(shape.as_slice()), b.broadcast(shape.as_slice())) {
        (Some(av), Some(bv)) => (av, bv),
        _ => {
            return Err(Error::IncompatibleOperands(format!(
                "cannot broadcast to {shape:?}"
            )))
        }
    };
    Ok(Zip::from(&av).and(&bv).map_collect(|&x, &y| f(x, y)))
}

impl SpectralValue for ArrayD<f64> {
    type Stacked = ArrayD<f64>;

    fn from_scalar(value: f64) -> Self {
        ArrayD::from_elem(ndarray::IxDyn(&[]), value)
    }

    fn binary(&self, op: BinaryOp, rhs: &Self) -> Result<Self> {
        zip_broadcast(&self.view(), &rhs.view(), |x, y| op.apply(x, y))
    }

    fn binary_scalar(&self, op: BinaryOp, rhs: f64) -> Result<Self> {
        Ok(self.mapv(|x| op.apply(x, rhs)))
    }

    fn scalar_binary(lhs: f64, op: BinaryOp, rhs: &Self) -> Result<Self> {
        Ok(rhs.mapv(|y| op.apply(lhs, y)))
    }

    fn apply(&self, func: UnaryFn) -> Self {
        self.mapv(|x| func.apply(x))
    }

    fn stacking() -> Stacking {
        Stacking::Labeled
    }

    /// Stacks along a new leading axis; the labels are the order of that axis.
    fn stack(values: Vec<Self>, _labels: &[String], _coordinate: &str) -> Result<Self::Stacked> {
        let views: Vec<ArrayViewD<'_, f64>> = values.iter().map(|v| v.view()).collect();
        ndarray::stack(Axis(0), &views).map_err(|e| Error::IncompatibleOperands(e.to_string()))
    }
}
