//! # matmul-strategies: dense, blocked, parallel and sparse matrix products
//!
//! Four self-contained ways of computing `C = A × B`, each suited to a
//! different kind of operand:
//!
//! - **Blocked** ([`blocked_multiply`]): dense operands that fit in memory but
//!   not in cache. The iteration space is walked in cubes of `tile_size`.
//! - **Parallel rows** ([`parallel_multiply`]): dense operands split into
//!   contiguous output row ranges, one per worker, joined before returning.
//! - **CSR** ([`SparseMatrixCSR::multiply`]): Gustavson's row-wise product with
//!   a dense scratch row.
//! - **CSC** ([`SparseMatrixCSC::multiply`]): the column-wise dual.
//!
//! A value is structurally zero exactly when it equals `0.0`; conversions and
//! sparse products drop such values, including sums that cancel to zero.
//!
//! ## Usage
//!
//! Let the crate pick a path:
//!
//! ```
//! use matmul_strategies::{multiply, MultiplyConfig};
//! use ndarray::array;
//!
//! let a = array![[1.0, 2.0], [3.0, 4.0]];
//! let b = array![[5.0, 6.0], [7.0, 8.0]];
//!
//! let c = multiply(&a, &b, &MultiplyConfig::default()).unwrap();
//! assert_eq!(c, array![[19.0, 22.0], [43.0, 50.0]]);
//! ```
//!
//! Or call a kernel directly:
//!
//! ```
//! use matmul_strategies::{blocked_multiply, DenseMatrix};
//!
//! let a = DenseMatrix::eye(3);
//! let b = DenseMatrix::from_elem((3, 2), 2.0);
//! let mut c = DenseMatrix::zeros((3, 2));
//!
//! blocked_multiply(&a, &b, &mut c, 32).unwrap();
//! assert_eq!(c, b);
//! ```

pub mod accumulator;
pub mod blocked;
pub mod error;
pub mod matrix;
pub mod parallel;
pub mod utils;

use tracing::{debug, instrument};

// Re-export primary components
pub use blocked::blocked_multiply;
pub use error::{MatrixError, Result};
pub use matrix::{naive_multiply, zeroed_product, DenseMatrix, SparseMatrixCSC, SparseMatrixCSR};
pub use matrix::{select_strategy, MultiplyConfig, Strategy, Workload};
pub use parallel::{parallel_multiply, partition_rows, worker_count};
pub use utils::{from_sprs_csc, from_sprs_csr, to_sprs_csc, to_sprs_csr};
pub use utils::{load_matrix_market_csc, load_matrix_market_csr};

/// Multiplies two dense matrices along the path [`select_strategy`] picks
///
/// Allocates the result. Sparse paths convert both operands, multiply in
/// compressed form and expand the product back to dense.
///
/// # Errors
///
/// `InvalidTileSize` for a bad config and `ShapeMismatch` when
/// `a.ncols() != b.nrows()`, both before any work. Parallel paths may also
/// return `ThreadPool` or `WorkerPanicked`.
#[instrument(skip_all, fields(m = a.nrows(), k = a.ncols(), n = b.ncols()))]
pub fn multiply(a: &DenseMatrix, b: &DenseMatrix, config: &MultiplyConfig) -> Result<DenseMatrix> {
    config.validate()?;
    error::check_conformant(a.dim(), b.dim())?;

    let strategy = select_strategy(&Workload::from_dense(a, b), config);
    multiply_with(a, b, strategy, config)
}

/// Multiplies two dense matrices along an explicitly chosen path
pub fn multiply_with(
    a: &DenseMatrix,
    b: &DenseMatrix,
    strategy: Strategy,
    config: &MultiplyConfig,
) -> Result<DenseMatrix> {
    debug!(?strategy, "dispatching product");

    match strategy {
        Strategy::Naive => {
            let mut c = zeroed_product(a, b);
            naive_multiply(a, b, &mut c)?;
            Ok(c)
        }
        Strategy::Blocked => {
            let mut c = zeroed_product(a, b);
            blocked_multiply(a, b, &mut c, config.tile_size)?;
            Ok(c)
        }
        Strategy::ParallelRows => {
            let mut c = zeroed_product(a, b);
            parallel_multiply(a, b, &mut c, config.n_threads)?;
            Ok(c)
        }
        Strategy::SparseRow => {
            let product = SparseMatrixCSR::from_dense(a).multiply(&SparseMatrixCSR::from_dense(b))?;
            Ok(product.to_dense())
        }
        Strategy::SparseColumn => {
            let product = SparseMatrixCSC::from_dense(a).multiply(&SparseMatrixCSC::from_dense(b))?;
            Ok(product.to_dense())
        }
    }
}

/// Version information for the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
