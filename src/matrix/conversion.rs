//! Conversion functions between dense, CSR and CSC formats

use ndarray::{Array2, Axis};
use num_traits::Num;

use crate::matrix::{SparseMatrixCSC, SparseMatrixCSR};

impl<T: Copy + Num> SparseMatrixCSR<T> {
    /// Compresses a dense matrix by scanning it row-major
    ///
    /// Entries equal to zero are skipped; columns come out ascending.
    pub fn from_dense(dense: &Array2<T>) -> Self {
        let (n_rows, n_cols) = dense.dim();

        let mut row_ptr = Vec::with_capacity(n_rows + 1);
        let mut col_idx = Vec::new();
        let mut values = Vec::new();
        row_ptr.push(0);

        for row in dense.axis_iter(Axis(0)) {
            for (j, &val) in row.iter().enumerate() {
                if !val.is_zero() {
                    col_idx.push(j);
                    values.push(val);
                }
            }
            row_ptr.push(values.len());
        }

        Self::new(n_rows, n_cols, row_ptr, col_idx, values)
    }

    /// Expands back to a dense matrix, filling unstored positions with zero
    pub fn to_dense(&self) -> Array2<T> {
        let mut dense = Array2::zeros((self.n_rows, self.n_cols));
        for i in 0..self.n_rows {
            for (j, &val) in self.row_iter(i) {
                dense[[i, j]] = val;
            }
        }
        dense
    }

    /// Converts this CSR matrix to CSC format
    pub fn to_csc(&self) -> SparseMatrixCSC<T> {
        let col_ptr = pointers_from_counts(self.n_cols, &self.col_idx);

        let nnz = self.nnz();
        let mut row_idx = vec![0; nnz];
        let mut values = vec![T::zero(); nnz];

        // Rows are visited in order, so each column's rows come out ascending
        let mut next = col_ptr.clone();
        for i in 0..self.n_rows {
            for (j, &val) in self.row_iter(i) {
                let pos = next[j];
                row_idx[pos] = i;
                values[pos] = val;
                next[j] += 1;
            }
        }

        SparseMatrixCSC::new(self.n_rows, self.n_cols, col_ptr, row_idx, values)
    }
}

impl<T: Copy + Num> SparseMatrixCSC<T> {
    /// Compresses a dense matrix by scanning it column-major
    pub fn from_dense(dense: &Array2<T>) -> Self {
        let (n_rows, n_cols) = dense.dim();

        let mut col_ptr = Vec::with_capacity(n_cols + 1);
        let mut row_idx = Vec::new();
        let mut values = Vec::new();
        col_ptr.push(0);

        for col in dense.axis_iter(Axis(1)) {
            for (i, &val) in col.iter().enumerate() {
                if !val.is_zero() {
                    row_idx.push(i);
                    values.push(val);
                }
            }
            col_ptr.push(values.len());
        }

        Self::new(n_rows, n_cols, col_ptr, row_idx, values)
    }

    pub fn to_dense(&self) -> Array2<T> {
        let mut dense = Array2::zeros((self.n_rows, self.n_cols));
        for j in 0..self.n_cols {
            for (i, &val) in self.col_iter(j) {
                dense[[i, j]] = val;
            }
        }
        dense
    }

    /// Converts this CSC matrix to CSR format
    pub fn to_csr(&self) -> SparseMatrixCSR<T> {
        let row_ptr = pointers_from_counts(self.n_rows, &self.row_idx);

        let nnz = self.nnz();
        let mut col_idx = vec![0; nnz];
        let mut values = vec![T::zero(); nnz];

        let mut next = row_ptr.clone();
        for j in 0..self.n_cols {
            for (i, &val) in self.col_iter(j) {
                let pos = next[i];
                col_idx[pos] = j;
                values[pos] = val;
                next[i] += 1;
            }
        }

        SparseMatrixCSR::new(self.n_rows, self.n_cols, row_ptr, col_idx, values)
    }
}

/// Builds a pointer array of length `n + 1` from the minor indices of every entry
fn pointers_from_counts(n: usize, indices: &[usize]) -> Vec<usize> {
    let mut counts = vec![0; n];
    for &idx in indices {
        counts[idx] += 1;
    }
    crate::utils::exclusive_scan(&counts)
}
