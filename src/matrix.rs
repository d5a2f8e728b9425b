//! Condensed/square DSM conversion
//!
//! A DSM over `n` items is either an `n x n` symmetric matrix with a zero
//! diagonal, or the length `n(n-1)/2` vector of its upper triangle in
//! row-major order. [`shape`] normalizes either form to square.

use crate::error::{Error, Result};
use ndarray::{Array1, Array2, ArrayD, ArrayView1, ArrayView2, Ix1, Ix2};

/// Number of items encoded by a condensed vector of length `len`,
/// or `None` when `len` is not a triangular number.
pub(crate) fn items_for_condensed(len: usize) -> Option<usize> {
    // Invert len = n(n-1)/2
    let n = ((1.0 + (1.0 + 8.0 * len as f64).sqrt()) / 2.0).round() as usize;
    (n * n.saturating_sub(1) / 2 == len).then_some(n)
}

/// Expand a condensed DSM to its square symmetric form.
///
/// The result has a zero diagonal and `result[[i, j]] == result[[j, i]]`.
pub fn squareform(condensed: ArrayView1<'_, f64>) -> Result<Array2<f64>> {
    let n = items_for_condensed(condensed.len()).ok_or(Error::Condensed {
        len: condensed.len(),
    })?;
    let mut square = Array2::zeros((n, n));
    let mut k = 0;
    for i in 0..n {
        for j in (i + 1)..n {
            square[[i, j]] = condensed[k];
            square[[j, i]] = condensed[k];
            k += 1;
        }
    }
    Ok(square)
}

/// Collapse a square symmetric DSM to condensed form (upper triangle,
/// row-major, diagonal omitted).
pub fn condensed(square: ArrayView2<'_, f64>) -> Result<Array1<f64>> {
    let (rows, cols) = square.dim();
    if rows != cols {
        return Err(Error::NotSquare { rows, cols });
    }
    let mut out = Array1::zeros(rows * rows.saturating_sub(1) / 2);
    let mut k = 0;
    for i in 0..rows {
        for j in (i + 1)..rows {
            out[k] = square[[i, j]];
            k += 1;
        }
    }
    Ok(out)
}

/// Normalize a DSM to square form.
///
/// Accepts a 1-D condensed vector or a 2-D square matrix. Anything else is
/// an [`Error::Shape`].
pub fn shape(dsm: &ArrayD<f64>) -> Result<Array2<f64>> {
    if let Ok(view) = dsm.view().into_dimensionality::<Ix1>() {
        return squareform(view);
    }
    if let Ok(view) = dsm.view().into_dimensionality::<Ix2>() {
        let (rows, cols) = view.dim();
        if rows != cols {
            return Err(Error::NotSquare { rows, cols });
        }
        return Ok(view.to_owned());
    }
    Err(Error::Shape {
        shape: dsm.shape().to_vec(),
    })
}
