//! # Strategy selection
//!
//! Picks a multiplication path from the structure of the operands:
//!
//! 1. **Naive**: every dimension is at most `small_dim_threshold`, so the
//!    operands already sit in cache and tiling only adds loop overhead.
//! 2. **SparseRow / SparseColumn**: the denser operand is still at or below
//!    `sparse_density_threshold`. The scratch line of the CSR product has
//!    length `n` and that of the CSC product length `m`, so the shorter one wins.
//! 3. **ParallelRows**: dense, large, more than one worker and more than one
//!    output row to share out.
//! 4. **Blocked**: everything else.

use tracing::debug;

use crate::matrix::config::{MultiplyConfig, Strategy};
use crate::matrix::dense::DenseMatrix;

/// Shape and fill of an `(m × k) × (k × n)` product
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Workload {
    pub m: usize,
    pub k: usize,
    pub n: usize,
    pub nnz_a: usize,
    pub nnz_b: usize,
}

impl Workload {
    /// Measures two dense operands, counting entries that are not exactly zero
    pub fn from_dense(a: &DenseMatrix, b: &DenseMatrix) -> Self {
        let count = |m: &DenseMatrix| m.iter().filter(|&&x| x != 0.0).count();
        Self {
            m: a.nrows(),
            k: a.ncols(),
            n: b.ncols(),
            nnz_a: count(a),
            nnz_b: count(b),
        }
    }

    /// Density of the denser operand; zero-sized operands count as empty
    pub fn density(&self) -> f64 {
        let ratio = |nnz: usize, cells: usize| {
            if cells == 0 {
                0.0
            } else {
                nnz as f64 / cells as f64
            }
        };
        ratio(self.nnz_a, self.m * self.k).max(ratio(self.nnz_b, self.k * self.n))
    }
}

/// Chooses the path for `workload` under `config`
pub fn select_strategy(workload: &Workload, config: &MultiplyConfig) -> Strategy {
    let largest = workload.m.max(workload.k).max(workload.n);
    let density = workload.density();

    let strategy = if largest <= config.small_dim_threshold {
        Strategy::Naive
    } else if density <= config.sparse_density_threshold {
        if workload.m < workload.n {
            Strategy::SparseColumn
        } else {
            Strategy::SparseRow
        }
    } else if config.n_threads > 1 && workload.m > 1 {
        Strategy::ParallelRows
    } else {
        Strategy::Blocked
    };

    debug!(?workload, density, ?strategy, "strategy selected");
    strategy
}
