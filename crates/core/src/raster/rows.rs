//! Row-at-a-time construction of raster buffers
//!
//! With the `parallel` feature the rows are filled on the rayon pool,
//! otherwise sequentially (e.g. for WASM builds). Either way each row is
//! computed independently, so the result is identical.

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Build a row-major `rows * cols` buffer, pre-filled with NaN, by handing
/// every row slice to `fill_row`.
pub(crate) fn collect_rows<F>(rows: usize, cols: usize, fill_row: F) -> Vec<f64>
where
    F: Fn(usize, &mut [f64]) + Send + Sync,
{
    let mut out = vec![f64::NAN; rows * cols];
    if cols == 0 {
        return out;
    }

    #[cfg(feature = "parallel")]
    out.par_chunks_mut(cols)
        .enumerate()
        .for_each(|(row, buf)| fill_row(row, buf));

    #[cfg(not(feature = "parallel"))]
    out.chunks_mut(cols)
        .enumerate()
        .for_each(|(row, buf)| fill_row(row, buf));

    out
}
