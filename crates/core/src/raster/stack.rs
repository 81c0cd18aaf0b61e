//! Multi-band raster stacks labeled along one coordinate

use ndarray::{Array3, Axis};

use super::arith::check_aligned;
use super::{GeoTransform, Raster};
use crate::error::{Error, Result};

/// Several aligned rasters stacked along a labeled coordinate.
///
/// Produced when more than one index is computed over `Raster<f64>` inputs;
/// the labels are the index names in request order.
#[derive(Debug, Clone)]
pub struct RasterStack {
    coordinate: String,
    labels: Vec<String>,
    bands: Vec<Raster<f64>>,
}

impl RasterStack {
    /// Stack `(label, raster)` pairs. All rasters must share shape and
    /// transform, and labels must be unique.
    pub fn new(
        coordinate: impl Into<String>,
        bands: impl IntoIterator<Item = (String, Raster<f64>)>,
    ) -> Result<Self> {
        let (labels, bands): (Vec<String>, Vec<Raster<f64>>) = bands.into_iter().unzip();

        if let Some(first) = bands.first() {
            for other in &bands[1..] {
                check_aligned(first, other)?;
            }
        }
        for (i, label) in labels.iter().enumerate() {
            if labels[..i].contains(label) {
                return Err(Error::IncompatibleOperands(format!(
                    "duplicate label `{label}` in raster stack"
                )));
            }
        }

        Ok(Self {
            coordinate: coordinate.into(),
            labels,
            bands,
        })
    }

    /// Name of the stacking coordinate.
    pub fn coordinate(&self) -> &str {
        &self.coordinate
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.bands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Band by label.
    pub fn band(&self, label: &str) -> Option<&Raster<f64>> {
        self.labels
            .iter()
            .position(|l| l == label)
            .map(|i| &self.bands[i])
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Raster<f64>)> {
        self.labels.iter().map(String::as_str).zip(self.bands.iter())
    }

    /// Shared transform, if the stack is not empty.
    pub fn transform(&self) -> Option<&GeoTransform> {
        self.bands.first().map(Raster::transform)
    }

    /// Copy the stack into a `(band, row, col)` array.
    pub fn to_array(&self) -> Result<Array3<f64>> {
        let views: Vec<_> = self.bands.iter().map(Raster::view).collect();
        ndarray::stack(Axis(0), &views).map_err(|e| Error::Other(e.to_string()))
    }

    pub fn into_bands(self) -> Vec<(String, Raster<f64>)> {
        self.labels.into_iter().zip(self.bands).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stack_keeps_label_order() {
        let stack = RasterStack::new(
            "index",
            vec![
                ("NDVI".to_string(), Raster::filled(2, 3, 0.5)),
                ("SAVI".to_string(), Raster::filled(2, 3, 0.3)),
            ],
        )
        .unwrap();

        assert_eq!(stack.coordinate(), "index");
        assert_eq!(stack.labels(), &["NDVI", "SAVI"]);
        assert_eq!(stack.band("SAVI").unwrap().get(1, 2).unwrap(), 0.3);
        assert!(stack.band("EVI").is_none());

        let cube = stack.to_array().unwrap();
        assert_eq!(cube.dim(), (2, 2, 3));
        assert_eq!(cube[[0, 0, 0]], 0.5);
    }

    #[test]
    fn stack_rejects_mismatched_bands() {
        let result = RasterStack::new(
            "index",
            vec![
                ("A".to_string(), Raster::filled(2, 2, 0.0)),
                ("B".to_string(), Raster::filled(3, 2, 0.0)),
            ],
        );
        assert!(matches!(result, Err(Error::SizeMismatch { .. })));
    }

    #[test]
    fn stack_rejects_duplicate_labels() {
        let result = RasterStack::new(
            "index",
            vec![
                ("A".to_string(), Raster::filled(2, 2, 0.0)),
                ("A".to_string(), Raster::filled(2, 2, 1.0)),
            ],
        );
        assert!(result.is_err());
    }
}
