//! Configuration and tuning parameters for the multiplication kernels

use crate::error::{MatrixError, Result};

/// Default cube side for the blocked kernel
pub const DEFAULT_TILE_SIZE: usize = 32;

/// Default largest dimension still handled by the untiled kernel
pub const DEFAULT_SMALL_DIM_THRESHOLD: usize = 64;

/// Default operand density at or below which the sparse kernels are used
pub const DEFAULT_SPARSE_DENSITY_THRESHOLD: f64 = 0.3;

/// The multiplication path chosen for a pair of operands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// Untiled triple loop, for matrices that already fit in cache
    Naive,
    /// Cache-blocked triple loop, single-threaded
    Blocked,
    /// Contiguous row ranges multiplied on a worker pool
    ParallelRows,
    /// Gustavson row-wise product over CSR operands
    SparseRow,
    /// Column-wise product over CSC operands
    SparseColumn,
}

/// Configuration for the multiplication kernels
#[derive(Debug, Clone)]
pub struct MultiplyConfig {
    /// Side length of the cubes the blocked kernel iterates over
    pub tile_size: usize,

    /// Upper bound on the number of workers used by parallel kernels
    pub n_threads: usize,

    /// Largest dimension for which the naive kernel is preferred
    pub small_dim_threshold: usize,

    /// Operand density at or below which a sparse kernel is preferred
    pub sparse_density_threshold: f64,
}

impl Default for MultiplyConfig {
    fn default() -> Self {
        Self {
            tile_size: DEFAULT_TILE_SIZE,
            n_threads: num_cpus::get(), // Use all available cores
            small_dim_threshold: DEFAULT_SMALL_DIM_THRESHOLD,
            sparse_density_threshold: DEFAULT_SPARSE_DENSITY_THRESHOLD,
        }
    }
}

impl MultiplyConfig {
    pub fn with_tile_size(mut self, tile_size: usize) -> Self {
        self.tile_size = tile_size;
        self
    }

    /// Sets the worker bound; zero is treated as one
    pub fn with_threads(mut self, n_threads: usize) -> Self {
        self.n_threads = n_threads.max(1);
        self
    }

    pub fn with_small_dim_threshold(mut self, threshold: usize) -> Self {
        self.small_dim_threshold = threshold;
        self
    }

    pub fn with_sparse_density_threshold(mut self, threshold: f64) -> Self {
        self.sparse_density_threshold = threshold;
        self
    }

    /// Rejects settings no kernel can run with
    pub fn validate(&self) -> Result<()> {
        if self.tile_size == 0 {
            return Err(MatrixError::InvalidTileSize);
        }
        Ok(())
    }
}
