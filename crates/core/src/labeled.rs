//! N-dimensional arrays with named dimensions
//!
//! Arithmetic aligns operands by dimension name rather than position: a
//! `(y, x)` band combined with an `(x)` profile broadcasts the profile over
//! `y`, and a `(time)` series combined with a `(y, x)` band yields
//! `(y, x, time)`. Dimensions present in both operands must have equal length,
//! and where both carry coordinate labels for a dimension the labels must
//! match.

use std::collections::BTreeMap;

use ndarray::{ArrayD, ArrayViewD, Axis, IxDyn};

use crate::error::{Error, Result};
use crate::value::array::zip_broadcast;
use crate::value::{BinaryOp, SpectralValue, Stacking, UnaryFn};

/// An array whose axes carry dimension names and optional coordinate labels.
#[derive(Debug, Clone, PartialEq)]
pub struct LabeledArray {
    data: ArrayD<f64>,
    dims: Vec<String>,
    coords: BTreeMap<String, Vec<String>>,
}

impl LabeledArray {
    /// Wrap `data`, naming its axes in order.
    pub fn new<S: Into<String>>(data: ArrayD<f64>, dims: impl IntoIterator<Item = S>) -> Result<Self> {
        let dims: Vec<String> = dims.into_iter().map(Into::into).collect();
        if dims.len() != data.ndim() {
            return Err(Error::IncompatibleOperands(format!(
                "{} dimension names given for a {}-dimensional array",
                dims.len(),
                data.ndim()
            )));
        }
        for (i, d) in dims.iter().enumerate() {
            if dims[..i].contains(d) {
                return Err(Error::IncompatibleOperands(format!("duplicate dimension `{d}`")));
            }
        }
        Ok(Self {
            data,
            dims,
            coords: BTreeMap::new(),
        })
    }

    /// Attach coordinate labels to dimension `dim`.
    pub fn with_coords<S: Into<String>>(
        mut self,
        dim: &str,
        labels: impl IntoIterator<Item = S>,
    ) -> Result<Self> {
        let axis = self
            .axis_of(dim)
            .ok_or_else(|| Error::Other(format!("no dimension named `{dim}`")))?;
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        if labels.len() != self.data.len_of(Axis(axis)) {
            return Err(Error::IncompatibleOperands(format!(
                "{} labels for dimension `{dim}` of length {}",
                labels.len(),
                self.data.len_of(Axis(axis))
            )));
        }
        self.coords.insert(dim.to_string(), labels);
        Ok(self)
    }

    pub fn data(&self) -> &ArrayD<f64> {
        &self.data
    }

    pub fn into_data(self) -> ArrayD<f64> {
        self.data
    }

    pub fn dims(&self) -> &[String] {
        &self.dims
    }

    pub fn shape(&self) -> &[usize] {
        self.data.shape()
    }

    /// Coordinate labels of `dim`, if any were attached.
    pub fn coords(&self, dim: &str) -> Option<&[String]> {
        self.coords.get(dim).map(Vec::as_slice)
    }

    /// Position of dimension `dim`.
    pub fn axis_of(&self, dim: &str) -> Option<usize> {
        self.dims.iter().position(|d| d == dim)
    }

    /// Select one labeled slice along `dim`, dropping that dimension.
    pub fn sel(&self, dim: &str, label: &str) -> Result<LabeledArray> {
        let axis = self
            .axis_of(dim)
            .ok_or_else(|| Error::Other(format!("no dimension named `{dim}`")))?;
        let index = self
            .coords(dim)
            .and_then(|labels| labels.iter().position(|l| l == label))
            .ok_or_else(|| Error::Other(format!("`{label}` is not a label of `{dim}`")))?;
        Ok(self.isel(axis, index))
    }

    fn isel(&self, axis: usize, index: usize) -> LabeledArray {
        let data = self.data.index_axis(Axis(axis), index).to_owned();
        let mut dims = self.dims.clone();
        let removed = dims.remove(axis);
        let mut coords = self.coords.clone();
        coords.remove(&removed);
        LabeledArray { data, dims, coords }
    }

    /// View with axes reordered to `union`, inserting length-1 axes for
    /// dimensions this array lacks.
    fn aligned_view(&self, union: &[String]) -> ArrayViewD<'_, f64> {
        let order: Vec<usize> = union.iter().filter_map(|d| self.axis_of(d)).collect();
        let mut view = self.data.view().permuted_axes(order);
        for (i, d) in union.iter().enumerate() {
            if self.axis_of(d).is_none() {
                view = view.insert_axis(Axis(i));
            }
        }
        view
    }
}

fn merge_coords(
    coords: &mut BTreeMap<String, Vec<String>>,
    other: &BTreeMap<String, Vec<String>>,
) -> Result<()> {
    for (dim, labels) in other {
        match coords.get(dim) {
            Some(mine) if mine != labels => {
                return Err(Error::IncompatibleOperands(format!(
                    "coordinate labels of `{dim}` differ"
                )))
            }
            Some(_) => {}
            None => {
                coords.insert(dim.clone(), labels.clone());
            }
        }
    }
    Ok(())
}

impl SpectralValue for LabeledArray {
    type Stacked = LabeledArray;

    /// A 0-dimensional array.
    fn from_scalar(value: f64) -> Self {
        LabeledArray {
            data: ArrayD::from_elem(IxDyn(&[]), value),
            dims: Vec::new(),
            coords: BTreeMap::new(),
        }
    }

    fn binary(&self, op: BinaryOp, rhs: &Self) -> Result<Self> {
        let mut union = self.dims.clone();
        union.extend(rhs.dims.iter().filter(|d| !self.dims.contains(d)).cloned());

        for (dim, &a) in self.dims.iter().zip(self.shape()) {
            if let Some(axis) = rhs.axis_of(dim) {
                let b = rhs.shape()[axis];
                if a != b {
                    return Err(Error::IncompatibleOperands(format!(
                        "dimension `{dim}` has length {a} and {b}"
                    )));
                }
            }
        }
        let mut coords = self.coords.clone();
        merge_coords(&mut coords, &rhs.coords)?;

        let data = zip_broadcast(&self.aligned_view(&union), &rhs.aligned_view(&union), |x, y| {
            op.apply(x, y)
        })?;
        Ok(LabeledArray {
            data,
            dims: union,
            coords,
        })
    }

    fn binary_scalar(&self, op: BinaryOp, rhs: f64) -> Result<Self> {
        Ok(LabeledArray {
            data: self.data.mapv(|x| op.apply(x, rhs)),
            dims: self.dims.clone(),
            coords: self.coords.clone(),
        })
    }

    fn scalar_binary(lhs: f64, op: BinaryOp, rhs: &Self) -> Result<Self> {
        Ok(LabeledArray {
            data: rhs.data.mapv(|y| op.apply(lhs, y)),
            dims: rhs.dims.clone(),
            coords: rhs.coords.clone(),
        })
    }

    fn apply(&self, func: UnaryFn) -> Self {
        LabeledArray {
            data: self.data.mapv(|x| func.apply(x)),
            dims: self.dims.clone(),
            coords: self.coords.clone(),
        }
    }

    fn stacking() -> Stacking {
        Stacking::Labeled
    }

    /// Concatenate along a new leading dimension `coordinate`, labeled by
    /// `labels`. Every value must have the same dimensions (in any order)
    /// and shape.
    fn stack(values: Vec<Self>, labels: &[String], coordinate: &str) -> Result<Self::Stacked> {
        let Some(first) = values.first() else {
            return Err(Error::Other("nothing to stack".into()));
        };
        if first.axis_of(coordinate).is_some() {
            return Err(Error::IncompatibleOperands(format!(
                "stacking coordinate `{coordinate}` is already a dimension"
            )));
        }
        for (i, label) in labels.iter().enumerate() {
            if labels[..i].contains(label) {
                return Err(Error::IncompatibleOperands(format!(
                    "duplicate label `{label}` along `{coordinate}`"
                )));
            }
        }

        let mut coords = first.coords.clone();
        let mut views = Vec::with_capacity(values.len());
        for value in &values {
            let same_dims = value.dims.len() == first.dims.len()
                && value.dims.iter().all(|d| first.dims.contains(d));
            if !same_dims {
                return Err(Error::IncompatibleOperands(format!(
                    "cannot stack dimensions {:?} with {:?}",
                    value.dims, first.dims
                )));
            }
            merge_coords(&mut coords, &value.coords)?;
            views.push(value.aligned_view(&first.dims));
        }

        let data = ndarray::stack(Axis(0), &views)
            .map_err(|e| Error::IncompatibleOperands(e.to_string()))?;
        let mut dims = Vec::with_capacity(first.dims.len() + 1);
        dims.push(coordinate.to_string());
        dims.extend(first.dims.iter().cloned());
        coords.insert(coordinate.to_string(), labels.to_vec());

        Ok(LabeledArray { data, dims, coords })
    }
}
