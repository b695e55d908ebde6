//! Dense row-major matrices and the shape checks shared by the dense kernels

use ndarray::Array2;

use crate::error::{check_conformant, MatrixError, Result};

/// A dense row-major matrix of `f64`
pub type DenseMatrix = Array2<f64>;

/// Validates `a × b` into a caller-allocated `c`
///
/// Fails with `ShapeMismatch` when the contraction dimensions disagree and
/// with `OutputShapeMismatch` when `c` is not `a.nrows() × b.ncols()`.
pub(crate) fn check_operands(a: &DenseMatrix, b: &DenseMatrix, c: &DenseMatrix) -> Result<()> {
    check_conformant(a.dim(), b.dim())?;

    let expected = (a.nrows(), b.ncols());
    if c.dim() != expected {
        return Err(MatrixError::OutputShapeMismatch {
            expected,
            got: c.dim(),
        });
    }
    Ok(())
}

/// Allocates the zero-filled accumulator for `a × b`
pub fn zeroed_product(a: &DenseMatrix, b: &DenseMatrix) -> DenseMatrix {
    DenseMatrix::zeros((a.nrows(), b.ncols()))
}
