//! Conversions to and from `sprs`, and Matrix Market loading through `sprs::io`
//!
//! File parsing is not done here: `sprs` reads the coordinate file and the
//! result is handed over as a compressed triple.

use num_traits::Num;
use sprs::{CsMat, TriMat};
use std::path::Path;
use tracing::{info, instrument};

use crate::error::{MatrixError, Result};
use crate::matrix::{SparseMatrixCSC, SparseMatrixCSR};

/// Converts a CSR matrix to a `sprs` CSR `CsMat`
pub fn to_sprs_csr<T>(matrix: &SparseMatrixCSR<T>) -> CsMat<T>
where
    T: Copy + Num + Default,
{
    CsMat::new(
        matrix.shape(),
        matrix.row_ptr.clone(),
        matrix.col_idx.clone(),
        matrix.values.clone(),
    )
}

/// Converts a CSC matrix to a `sprs` CSC `CsMat`
pub fn to_sprs_csc<T>(matrix: &SparseMatrixCSC<T>) -> CsMat<T>
where
    T: Copy + Num + Default,
{
    CsMat::new_csc(
        matrix.shape(),
        matrix.col_ptr.clone(),
        matrix.row_idx.clone(),
        matrix.values.clone(),
    )
}

/// Takes a `sprs` matrix of either storage order into CSR
pub fn from_sprs_csr<T>(matrix: CsMat<T>) -> SparseMatrixCSR<T>
where
    T: Copy + Num + Default,
{
    let matrix = if matrix.is_csr() { matrix } else { matrix.to_csr() };

    let (n_rows, n_cols) = matrix.shape();
    let (indptr, indices, data) = matrix.into_raw_storage();
    SparseMatrixCSR::new(n_rows, n_cols, indptr, indices, data)
}

/// Takes a `sprs` matrix of either storage order into CSC
pub fn from_sprs_csc<T>(matrix: CsMat<T>) -> SparseMatrixCSC<T>
where
    T: Copy + Num + Default,
{
    let matrix = if matrix.is_csc() { matrix } else { matrix.to_csc() };

    let (n_rows, n_cols) = matrix.shape();
    let (indptr, indices, data) = matrix.into_raw_storage();
    SparseMatrixCSC::new(n_rows, n_cols, indptr, indices, data)
}

fn read_triplets(path: &Path) -> Result<TriMat<f64>> {
    let triplets: TriMat<f64> = sprs::io::read_matrix_market(path)
        .map_err(|e| MatrixError::MatrixMarket(format!("{}: {}", path.display(), e)))?;
    info!(
        path = %path.display(),
        rows = triplets.rows(),
        cols = triplets.cols(),
        nnz = triplets.nnz(),
        "loaded matrix market file"
    );
    Ok(triplets)
}

/// Loads a Matrix Market coordinate file as CSR
///
/// Duplicate coordinates are summed by `sprs` during compression.
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_matrix_market_csr<P: AsRef<Path>>(path: P) -> Result<SparseMatrixCSR<f64>> {
    let triplets = read_triplets(path.as_ref())?;
    Ok(from_sprs_csr(triplets.to_csr()))
}

/// Loads a Matrix Market coordinate file as CSC
#[instrument(skip_all, fields(path = %path.as_ref().display()))]
pub fn load_matrix_market_csc<P: AsRef<Path>>(path: P) -> Result<SparseMatrixCSC<f64>> {
    let triplets = read_triplets(path.as_ref())?;
    Ok(from_sprs_csc(triplets.to_csc()))
}
