//! Table columns: one-dimensional series and the frames they stack into

use ndarray::{Array1, Array2, Axis};

use crate::error::{Error, Result};
use crate::value::{BinaryOp, SpectralValue, Stacking, UnaryFn};

/// A column of values with an optional row index.
///
/// Two series combine elementwise when they have the same length; if both
/// carry a row index the indexes must be equal.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    values: Array1<f64>,
    index: Option<Vec<String>>,
    name: Option<String>,
}

impl Series {
    pub fn new(values: impl Into<Array1<f64>>) -> Self {
        Self {
            values: values.into(),
            index: None,
            name: None,
        }
    }

    /// Attach row labels.
    pub fn with_index<S: Into<String>>(mut self, index: impl IntoIterator<Item = S>) -> Result<Self> {
        let index: Vec<String> = index.into_iter().map(Into::into).collect();
        if index.len() != self.values.len() {
            return Err(Error::IncompatibleOperands(format!(
                "index of length {} for a series of length {}",
                index.len(),
                self.values.len()
            )));
        }
        self.index = Some(index);
        Ok(self)
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn values(&self) -> &Array1<f64> {
        &self.values
    }

    pub fn index(&self) -> Option<&[String]> {
        self.index.as_deref()
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, i: usize) -> Option<f64> {
        self.values.get(i).copied()
    }

    fn mapped(&self, values: Array1<f64>) -> Self {
        Self {
            values,
            index: self.index.clone(),
            name: None,
        }
    }
}

impl From<Vec<f64>> for Series {
    fn from(values: Vec<f64>) -> Self {
        Series::new(values)
    }
}

impl SpectralValue for Series {
    type Stacked = Frame;

    /// A one-row series.
    fn from_scalar(value: f64) -> Self {
        Series::new(vec![value])
    }

    fn binary(&self, op: BinaryOp, rhs: &Self) -> Result<Self> {
        if self.len() != rhs.len() {
            return Err(Error::IncompatibleOperands(format!(
                "series of length {} and {}",
                self.len(),
                rhs.len()
            )));
        }
        let index = match (&self.index, &rhs.index) {
            (Some(a), Some(b)) if a != b => {
                return Err(Error::IncompatibleOperands("series indexes differ".into()))
            }
            (Some(a), _) | (None, Some(a)) => Some(a.clone()),
            (None, None) => None,
        };
        let values = ndarray::Zip::from(&self.values)
            .and(&rhs.values)
            .map_collect(|&a, &b| op.apply(a, b));
        Ok(Series {
            values,
            index,
            name: None,
        })
    }

    fn binary_scalar(&self, op: BinaryOp, rhs: f64) -> Result<Self> {
        Ok(self.mapped(self.values.mapv(|a| op.apply(a, rhs))))
    }

    fn scalar_binary(lhs: f64, op: BinaryOp, rhs: &Self) -> Result<Self> {
        Ok(rhs.mapped(rhs.values.mapv(|b| op.apply(lhs, b))))
    }

    fn apply(&self, func: UnaryFn) -> Self {
        self.mapped(self.values.mapv(|a| func.apply(a)))
    }

    fn stacking() -> Stacking {
        Stacking::Labeled
    }

    /// One column per value, named by its label.
    fn stack(values: Vec<Self>, labels: &[String], _coordinate: &str) -> Result<Frame> {
        Frame::new(labels.iter().cloned().zip(values))
    }
}

/// Equal-length named columns sharing one row index.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    columns: Vec<String>,
    index: Option<Vec<String>>,
    /// `(row, column)`
    data: Array2<f64>,
}

impl Frame {
    pub fn new(columns: impl IntoIterator<Item = (String, Series)>) -> Result<Self> {
        let (names, series): (Vec<String>, Vec<Series>) = columns.into_iter().unzip();
        let Some(first) = series.first() else {
            return Err(Error::Other("a frame needs at least one column".into()));
        };

        let mut index = first.index.clone();
        for (name, s) in names.iter().zip(&series) {
            if s.len() != first.len() {
                return Err(Error::IncompatibleOperands(format!(
                    "column `{name}` has length {}, expected {}",
                    s.len(),
                    first.len()
                )));
            }
            match (&index, &s.index) {
                (Some(a), Some(b)) if a != b => {
                    return Err(Error::IncompatibleOperands(format!(
                        "column `{name}` has a different index"
                    )))
                }
                (None, Some(b)) => index = Some(b.clone()),
                _ => {}
            }
        }
        for (i, name) in names.iter().enumerate() {
            if names[..i].contains(name) {
                return Err(Error::IncompatibleOperands(format!("duplicate column `{name}`")));
            }
        }

        let views: Vec<_> = series.iter().map(|s| s.values.view()).collect();
        let data = ndarray::stack(Axis(1), &views).map_err(|e| Error::Other(e.to_string()))?;

        Ok(Frame {
            columns: names,
            index,
            data,
        })
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn index(&self) -> Option<&[String]> {
        self.index.as_deref()
    }

    /// `(rows, columns)`
    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn data(&self) -> &Array2<f64> {
        &self.data
    }

    /// Column by name.
    pub fn column(&self, name: &str) -> Option<Series> {
        let j = self.columns.iter().position(|c| c == name)?;
        Some(Series {
            values: self.data.column(j).to_owned(),
            index: self.index.clone(),
            name: Some(name.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elementwise_and_index_kept() {
        let a = Series::new(vec![0.6, 0.7])
            .with_index(["p1", "p2"])
            .unwrap();
        let b = Series::new(vec![0.1, 0.2]);
        let out = a.binary(BinaryOp::Sub, &b).unwrap();
        assert_eq!(out.index().unwrap(), &["p1", "p2"]);
        assert!((out.get(1).unwrap() - 0.5).abs() < 1e-12);
    }

    #[test]
    fn length_mismatch() {
        let a = Series::new(vec![1.0, 2.0]);
        let b = Series::new(vec![1.0]);
        assert!(matches!(
            a.binary(BinaryOp::Add, &b),
            Err(Error::IncompatibleOperands(_))
        ));
    }

    #[test]
    fn different_indexes_rejected() {
        let a = Series::new(vec![1.0, 2.0]).with_index(["a", "b"]).unwrap();
        let b = Series::new(vec![1.0, 2.0]).with_index(["b", "a"]).unwrap();
        assert!(a.binary(BinaryOp::Add, &b).is_err());
    }

    #[test]
    fn stack_builds_frame() {
        let labels = vec!["NDVI".to_string(), "SAVI".to_string()];
        let frame = Series::stack(
            vec![Series::new(vec![0.1, 0.2, 0.3]), Series::new(vec![0.4, 0.5, 0.6])],
            &labels,
            "index",
        )
        .unwrap();

        assert_eq!(frame.shape(), (3, 2));
        assert_eq!(frame.columns(), labels.as_slice());
        let savi = frame.column("SAVI").unwrap();
        assert_eq!(savi.name(), Some("SAVI"));
        assert_eq!(savi.values().to_vec(), vec![0.4, 0.5, 0.6]);
        assert!(frame.column("EVI").is_none());
    }
}
