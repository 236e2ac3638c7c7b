//! Rank-reduced reconstruction via singular value decomposition.

use nalgebra::DMatrix;

use crate::error::{FieldError, Result};

/// Reconstruct `matrix` from its `components` largest singular triplets,
/// discarding the rest. Keeps at most min(nrows, ncols) components.
pub fn rank_reduce(matrix: &DMatrix<f64>, components: usize) -> Result<DMatrix<f64>> {
    let k = components.min(matrix.nrows()).min(matrix.ncols());
    if k == 0 {
        return Ok(DMatrix::zeros(matrix.nrows(), matrix.ncols()));
    }

    let svd = matrix.clone().svd(true, true);
    let u = svd.u.ok_or(FieldError::Decomposition)?;
    let v_t = svd.v_t.ok_or(FieldError::Decomposition)?;

    // nalgebra returns singular values sorted descending
    let sigma = DMatrix::from_diagonal(&svd.singular_values.rows(0, k).into_owned());
    Ok(u.columns(0, k) * sigma * v_t.rows(0, k))
}
