//! # Cache-blocked dense multiplication
//!
//! The `i`, `j` and `k` iteration space is cut into cubes of side
//! `tile_size`. The outer triple loop walks the cubes, the inner triple loop
//! walks the indices of one cube, clipped at each dimension's end so sizes
//! that are not a multiple of the tile are handled. The operation count is
//! that of the naive product; only the memory access order changes.

use tracing::instrument;

use crate::error::{MatrixError, Result};
use crate::matrix::dense::{check_operands, DenseMatrix};

/// Computes `c += a × b` tile by tile on the calling thread
///
/// `c` is expected to be zero-filled for a plain product. Sums are formed in
/// tile order, so results may differ from [`naive_multiply`] in the last bits.
///
/// [`naive_multiply`]: crate::matrix::reference::naive_multiply
///
/// # Errors
///
/// `InvalidTileSize` for a zero tile, `ShapeMismatch` or `OutputShapeMismatch`
/// for bad operands. All are reported before `c` is written.
#[instrument(level = "debug", skip_all, fields(
    m = a.nrows(),
    k = a.ncols(),
    n = b.ncols(),
    tile_size = tile_size,
))]
pub fn blocked_multiply(
    a: &DenseMatrix,
    b: &DenseMatrix,
    c: &mut DenseMatrix,
    tile_size: usize,
) -> Result<()> {
    if tile_size == 0 {
        return Err(MatrixError::InvalidTileSize);
    }
    check_operands(a, b, c)?;

    let (m, k) = a.dim();
    let n = b.ncols();

    for ii in (0..m).step_by(tile_size) {
        let i_end = (ii + tile_size).min(m);
        for jj in (0..n).step_by(tile_size) {
            let j_end = (jj + tile_size).min(n);
            for kk in (0..k).step_by(tile_size) {
                let k_end = (kk + tile_size).min(k);

                for i in ii..i_end {
                    for j in jj..j_end {
                        let mut sum = c[[i, j]];
                        for p in kk..k_end {
                            sum += a[[i, p]] * b[[p, j]];
                        }
                        c[[i, j]] = sum;
                    }
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::reference::naive_multiply;
    use approx::assert_relative_eq;
    use ndarray::array;

    fn ramp(rows: usize, cols: usize, seed: f64) -> DenseMatrix {
        DenseMatrix::from_shape_fn((rows, cols), |(i, j)| {
            ((i * 31 + j * 17) % 13) as f64 * 0.25 - seed
        })
    }

    #[test]
    fn test_two_by_two() {
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let b = array![[5.0, 6.0], [7.0, 8.0]];
        let mut c = DenseMatrix::zeros((2, 2));

        blocked_multiply(&a, &b, &mut c, 32).unwrap();

        assert_eq!(c, array![[19.0, 22.0], [43.0, 50.0]]);
    }

    #[test]
    fn test_ragged_tiles_match_naive() {
        // 37, 45 and 29 are not multiples of any tile tried
        let a = ramp(37, 45, 1.0);
        let b = ramp(45, 29, 0.5);

        let mut expected = DenseMatrix::zeros((37, 29));
        naive_multiply(&a, &b, &mut expected).unwrap();

        for tile in [1, 4, 7, 16, 32, 64] {
            let mut c = DenseMatrix::zeros((37, 29));
            blocked_multiply(&a, &b, &mut c, tile).unwrap();
            for (got, want) in c.iter().zip(expected.iter()) {
                assert_relative_eq!(*got, *want, epsilon = 1e-9, max_relative = 1e-9);
            }
        }
    }

    #[test]
    fn test_zero_tile_size_rejected() {
        let a = DenseMatrix::ones((2, 2));
        let mut c = DenseMatrix::zeros((2, 2));

        assert!(matches!(
            blocked_multiply(&a, &a, &mut c, 0),
            Err(MatrixError::InvalidTileSize)
        ));
    }

    #[test]
    fn test_shape_mismatch() {
        let a = DenseMatrix::ones((3, 2));
        let b = DenseMatrix::ones((3, 2));
        let mut c = DenseMatrix::zeros((3, 2));

        assert!(matches!(
            blocked_multiply(&a, &b, &mut c, 32),
            Err(MatrixError::ShapeMismatch { .. })
        ));
    }
}
