//! Compressed Sparse Row (CSR) matrix format and its row-wise product

use num_traits::Num;
use std::fmt;
use std::ops::AddAssign;
use tracing::{debug, instrument};

use crate::accumulator::DenseScratch;
use crate::error::{check_conformant, Result};

/// A sparse matrix in Compressed Sparse Row (CSR) format
///
/// The CSR format stores a sparse matrix using three arrays:
/// - row_ptr: Array of size n_rows + 1 containing offsets into col_idx and values
/// - col_idx: Array of size nnz containing column indices of stored entries
/// - values: Array of size nnz containing the stored entries
///
/// Instances are never mutated by multiplication; every product owns fresh storage.
#[derive(Clone, PartialEq)]
pub struct SparseMatrixCSR<T> {
    /// Number of rows in the matrix
    pub n_rows: usize,

    /// Number of columns in the matrix
    pub n_cols: usize,

    /// Row pointers (size: n_rows + 1)
    /// row_ptr[i] is the offset in col_idx and values where row i starts
    /// row_ptr[n_rows] is equal to nnz
    pub row_ptr: Vec<usize>,

    /// Column indices (size: nnz)
    pub col_idx: Vec<usize>,

    /// Stored values (size: nnz)
    pub values: Vec<T>,
}

impl<T> SparseMatrixCSR<T>
where
    T: Copy + Num,
{
    /// Creates a new CSR matrix from its raw arrays
    ///
    /// # Panics
    ///
    /// Panics if the input arrays are inconsistent:
    /// - row_ptr.len() must be n_rows + 1
    /// - col_idx.len() must equal values.len()
    /// - row_ptr must start at 0, never decrease, and end at col_idx.len()
    /// - every column index must be below n_cols
    pub fn new(
        n_rows: usize,
        n_cols: usize,
        row_ptr: Vec<usize>,
        col_idx: Vec<usize>,
        values: Vec<T>,
    ) -> Self {
        assert_eq!(row_ptr.len(), n_rows + 1, "row_ptr.len() must be n_rows + 1");
        assert_eq!(col_idx.len(), values.len(), "col_idx.len() must equal values.len()");
        assert_eq!(row_ptr[0], 0, "row_ptr[0] must be 0");
        assert!(
            row_ptr.windows(2).all(|w| w[0] <= w[1]),
            "row_ptr must be non-decreasing"
        );
        assert_eq!(
            row_ptr[n_rows],
            col_idx.len(),
            "row_ptr[n_rows] must equal col_idx.len()"
        );

        if let Some(&col) = col_idx.iter().find(|&&col| col >= n_cols) {
            panic!("Column index {} out of bounds (n_cols = {})", col, n_cols);
        }

        Self {
            n_rows,
            n_cols,
            row_ptr,
            col_idx,
            values,
        }
    }

    /// Returns `(n_rows, n_cols)`
    pub fn shape(&self) -> (usize, usize) {
        (self.n_rows, self.n_cols)
    }

    /// Returns the number of stored entries
    pub fn nnz(&self) -> usize {
        self.values.len()
    }

    /// Fraction of positions that hold a stored entry; zero for an empty shape
    pub fn density(&self) -> f64 {
        let cells = self.n_rows * self.n_cols;
        if cells == 0 {
            0.0
        } else {
            self.nnz() as f64 / cells as f64
        }
    }

    /// Returns an iterator over the stored entries of row i as `(col, &value)`
    pub fn row_iter(&self, i: usize) -> impl Iterator<Item = (usize, &T)> {
        assert!(i < self.n_rows, "Row index out of bounds");

        let range = self.row_ptr[i]..self.row_ptr[i + 1];
        self.col_idx[range.clone()]
            .iter()
            .copied()
            .zip(&self.values[range])
    }

    /// Creates a matrix with no stored entries
    pub fn zeros(n_rows: usize, n_cols: usize) -> Self {
        Self {
            n_rows,
            n_cols,
            row_ptr: vec![0; n_rows + 1],
            col_idx: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Creates an identity matrix of the given size
    pub fn identity(n: usize) -> Self {
        Self {
            n_rows: n,
            n_cols: n,
            row_ptr: (0..=n).collect(),
            col_idx: (0..n).collect(),
            values: vec![T::one(); n],
        }
    }
}

impl<T> SparseMatrixCSR<T>
where
    T: Copy + Num + AddAssign,
{
    /// Multiplies `self × b` with Gustavson's row-wise algorithm
    ///
    /// Row i of the result is accumulated in a dense scratch row of length
    /// `b.n_cols`, fed by every pair `(a[i,k], b[k,j])` of stored entries, and
    /// then swept left to right. Entries that cancel to exactly zero are not
    /// stored.
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

        let mut row_ptr = Vec::with_capacity(self.n_rows + 1);
        let mut col_idx = Vec::new();
        let mut values = Vec::new();
        row_ptr.push(0);

        let mut scratch = DenseScratch::new(b.n_cols);
        for i in 0..self.n_rows {
            scratch.reset();
            self.scatter_row(i, b, &mut scratch);
            scratch.flush_into(&mut col_idx, &mut values);
            row_ptr.push(col_idx.len());
        }

        debug!(nnz = values.len(), "csr product assembled");
        Ok(Self::new(self.n_rows, b.n_cols, row_ptr, col_idx, values))
    }

    /// Accumulates row i of `self × b` into `scratch`
    ///
    /// Callers guarantee conformant shapes and a freshly reset scratch.
    pub(crate) fn scatter_row(&self, i: usize, b: &Self, scratch: &mut DenseScratch<T>) {
        for (k, &a_val) in self.row_iter(i) {
            for (j, &b_val) in b.row_iter(k) {
                scratch.accumulate(j, a_val * b_val);
            }
        }
    }
}

impl<T: fmt::Debug + Copy + Num> fmt::Debug for SparseMatrixCSR<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const SAMPLE: usize = 5;

        writeln!(f, "SparseMatrixCSR {{")?;
        writeln!(f, "  shape: {} × {}, nnz: {}", self.n_rows, self.n_cols, self.nnz())?;

        for i in 0..self.n_rows.min(SAMPLE) {
            let entries: Vec<_> = self.row_iter(i).take(SAMPLE).collect();
            let len = self.row_ptr[i + 1] - self.row_ptr[i];
            write!(f, "  row {}: {:?}", i, entries)?;
            if len > SAMPLE {
                write!(f, " ... ({} more)", len - SAMPLE)?;
            }
            writeln!(f)?;
        }
        if self.n_rows > SAMPLE {
            writeln!(f, "  ... ({} more rows)", self.n_rows - SAMPLE)?;
        }

        write!(f, "}}")
    }
}
