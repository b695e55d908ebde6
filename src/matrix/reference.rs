//! Untiled reference kernel
//!
//! The plain i-j-k triple loop. It is the path for matrices small enough to
//! sit in cache and the baseline the other kernels are checked against.

use tracing::instrument;

use crate::error::Result;
use crate::matrix::dense::{check_operands, DenseMatrix};

/// Computes `c += a × b` with the naive triple loop
///
/// `c` is expected to be zero-filled by the caller for a plain product.
///
/// # Errors
///
/// `ShapeMismatch` or `OutputShapeMismatch`, detected before `c` is touched.
#[instrument(level = "debug", skip_all, fields(m = a.nrows(), k = a.ncols(), n = b.ncols()))]
pub fn naive_multiply(a: &DenseMatrix, b: &DenseMatrix, c: &mut DenseMatrix) -> Result<()> {
    check_operands(a, b, c)?;

    let (m, k) = a.dim();
    let n = b.ncols();
    for i in 0..m {
        for j in 0..n {
            let mut sum = c[[i, j]];
            for p in 0..k {
                sum += a[[i, p]] * b[[p, j]];
            }
            c[[i, j]] = sum;
        }
    }
    Ok(())
}
