//! Affine geotransformation for rasters

use serde::{Deserialize, Serialize};

/// Affine transformation coefficients for georeferencing rasters.
///
/// ```text
/// x = origin_x + col * pixel_width + row * row_rotation
/// y = origin_y + col * col_rotation + row * pixel_height
/// ```
///
/// Band rasters combined by a formula are expected to share one transform;
/// see [`GeoTransform::aligns_with`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoTransform {
    /// X coordinate of the upper-left corner
    pub origin_x: f64,
    /// Y coordinate of the upper-left corner
    pub origin_y: f64,
    /// Pixel width (cell size in X direction)
    pub pixel_width: f64,
    /// Pixel height (cell size in Y direction, usually negative)
    pub pixel_height: f64,
    pub row_rotation: f64,
    pub col_rotation: f64,
}

impl GeoTransform {
    /// Create a new GeoTransform with no rotation (north-up image)
    pub fn new(origin_x: f64, origin_y: f64, pixel_width: f64, pixel_height: f64) -> Self {
        Self {
            origin_x,
            origin_y,
            pixel_width,
            pixel_height,
            row_rotation: 0.0,
            col_rotation: 0.0,
        }
    }

    /// Create from GDAL-style array [origin_x, pixel_width, row_rotation, origin_y, col_rotation, pixel_height]
    pub fn from_gdal(coeffs: [f64; 6]) -> Self {
        Self {
            origin_x: coeffs[0],
            pixel_width: coeffs[1],
            row_rotation: coeffs[2],
            origin_y: coeffs[3],
            col_rotation: coeffs[4],
            pixel_height: coeffs[5],
        }
    }

    /// Whether two transforms describe the same grid, up to float noise
    /// relative to the pixel size.
    pub fn aligns_with(&self, other: &GeoTransform) -> bool {
        let tol = self.pixel_width.abs().max(self.pixel_height.abs()) * 1e-6;
        let close = |a: f64, b: f64| (a - b).abs() <= tol.max(1e-12);
        close(self.origin_x, other.origin_x)
            && close(self.origin_y, other.origin_y)
            && close(self.pixel_width, other.pixel_width)
            && close(self.pixel_height, other.pixel_height)
            && close(self.row_rotation, other.row_rotation)
            && close(self.col_rotation, other.col_rotation)
    }
}

impl Default for GeoTransform {
    fn default() -> Self {
        Self::new(0.0, 0.0, 1.0, -1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_alignment() {
        let a = GeoTransform::new(0.0, 100.0, 10.0, -10.0);
        let b = GeoTransform::from_gdal([0.0, 10.0, 0.0, 100.0 + 1e-9, 0.0, -10.0]);
        let c = GeoTransform::new(5.0, 100.0, 10.0, -10.0);
        assert!(a.aligns_with(&b));
        assert!(!a.aligns_with(&c));
    }
}
