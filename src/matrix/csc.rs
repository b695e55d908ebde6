//! Compressed Sparse Column (CSC) matrix format and its column-wise product

use num_traits::Num;
use std::fmt;
use std::ops::AddAssign;
use tracing::{debug, instrument};

use crate::accumulator::DenseScratch;
use crate::error::{check_conformant, Result};

/// A sparse matrix in Compressed Sparse Column (CSC) format
///
/// The column-major dual of [`SparseMatrixCSR`](crate::matrix::SparseMatrixCSR):
/// - col_ptr: Array of size n_cols + 1 containing offsets into row_idx and values
/// - row_idx: Array of size nnz containing row indices of stored entries
/// - values: Array of size nnz containing the stored entries
#[derive(Clone, PartialEq)]
pub struct SparseMatrixCSC<T> {
    pub n_rows: usize,
    pub n_cols: usize,

    /// Column pointers (size: n_cols + 1), col_ptr[n_cols] == nnz
    pub col_ptr: Vec<usize>,

    /// Row indices (size: nnz)
    pub row_idx: Vec<usize>,

    /// Stored values (size: nnz)
    pub values: Vec<T>,
}

impl<T> SparseMatrixCSC<T>
where
    T: Copy + Num,
{
    /// Creates a new CSC matrix from its raw arrays
    ///
    /// # Panics
    ///
    /// Panics if the input arrays are inconsistent:
    /// - col_ptr.len() must be n_cols + 1
    /// - row_idx.len() must equal values.len()
    /// - col_ptr must start at 0, never decrease, and end at row_idx.len()
    /// - every row index must be below n_rows
    pub fn new(
        n_rows: usize,
        n_cols: usize,
        col_ptr: Vec<usize>,
        row_idx: Vec<usize>,
        values: Vec<T>,
    ) -> Self {
        assert_eq!(col_ptr.len(), n_cols + 1, "col_ptr.len() must be n_cols + 1");
        assert_eq!(row_idx.len(), values.len(), "row_idx.len() must equal values.len()");
        assert_eq!(col_ptr[0], 0, "col_ptr[0] must be 0");
        assert!(
            col_ptr.windows(2).all(|w| w[0] <= w[1]),
            "col_ptr must be non-decreasing"
        );
        assert_eq!(
            col_ptr[n_cols],
            row_idx.len(),
            "col_ptr[n_cols] must equal row_idx.len()"
        );

        if let Some(&row) = row_idx.iter().find(|&&row| row >= n_rows) {
            panic!("Row index {} out of bounds (n_rows = {})", row, n_rows);
        }

        Self {
            n_rows,
            n_cols,
            col_ptr,
            row_idx,
            values,
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    pub fn density(&self) -> f64 {
        let cells = self.n_rows * self.n_cols;
        if cells == 0 {
            0.0
        } else {
            self.nnz() as f64 / cells as f64
        }
    }

    /// Returns an iterator over the stored entries of column j as `(row, &value)`
    pub fn col_iter(&self, j: usize) -> impl Iterator<Item = (usize, &T)> {
        assert!(j < self.n_cols, "Column index out of bounds");

        let range = self.col_ptr[j]..self.col_ptr[j + 1];
        self.row_idx[range.clone()]
            .iter()
            .copied()
            .zip(&self.values[range])
    }

    pub fn zeros(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            col_ptr: vec![0; n_cols + 1],
            row_idx: Vec::new(),
            values: Vec::new(),
        }
    }

    pub fn identity(n: usize) -> Self {
        Self {
            n_rows: n,
            n_cols: n,
            col_ptr: (0..=n).collect(),
            row_idx: (0..n).collect(),
            values: vec![T::one(); n],
        }
    }
}

impl<T> SparseMatrixCSC<T>
where
    T: Copy + Num + AddAssign,
{
    /// Multiplies `self × b` one output column at a time
    ///
    /// Column j of the result is `sum_k a[:,k] * b[k,j]` over the stored entries
    /// of column j of `b`, so every stored `b[k,j]` pulls in column k of `self`.
    /// The scratch column has length `self.n_rows`. Exact cancellations are
    /// dropped, as in the CSR product.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if `self.n_cols != b.n_rows`, before any work is done.
    #[instrument(level = "debug", skip_all, fields(
        rows = self.n_rows,
        inner = self.n_cols,
        cols = b.n_cols,
        nnz_a = self.nnz(),
        nnz_b = b.nnz(),
    ))]
    pub fn multiply(&self, b: &Self) -> Result<Self> {
        check_conformant(self.shape(), b.shape())?;

        let mut col_ptr = Vec::with_capacity(b.n_cols + 1);
        let mut row_idx = Vec::new();
        let mut values = Vec::new();
        col_ptr.push(0);

        let mut scratch = DenseScratch::new(self.n_rows);
        for j in 0..b.n_cols {
            scratch.reset();
            for (k, &b_val) in b.col_iter(j) {
                for (i, &a_val) in self.col_iter(k) {
                    scratch.accumulate(i, a_val * b_val);
                }
            }
            scratch.flush_into(&mut row_idx, &mut values);
            col_ptr.push(row_idx.len());
        }

        debug!(nnz = values.len(), "csc product assembled");
        Ok(Self::new(self.n_rows, b.n_cols, col_ptr, row_idx, values))
    }
}

impl<T: fmt::Debug + Copy + Num> fmt::Debug for SparseMatrixCSC<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SAMPLE: usize = 5;

        writeln!(f, "SparseMatrixCSC {{")?;
        writeln!(f, "  shape: {} × {}, nnz: {}", self.n_rows, self.n_cols, self.nnz())?;

        for j in 0..self.n_cols.min(SAMPLE) {
            let entries: Vec<_> = self.col_iter(j).take(SAMPLE).collect();
            let len = self.col_ptr[j + 1] - self.col_ptr[j];
            write!(f, "  col {}: {:?}", j, entries)?;
            if len > SAMPLE {
                write!(f, " ... ({} more)", len - SAMPLE)?;
            }
            writeln!(f)?;
        }
        if self.n_cols > SAMPLE {
            writeln!(f, "  ... ({} more columns)", self.n_cols - SAMPLE)?;
        }

        write!(f, "}}")
    }
}
