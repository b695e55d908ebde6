//! Error types shared by every multiplication path

use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatrixError {
    #[error("shape mismatch: [{left_rows}x{left_cols}] x [{right_rows}x{right_cols}]")]
    ShapeMismatch {
        left_rows: usize,
        left_cols: usize,
        right_rows: usize,
        right_cols: usize,
    },
    #[error("output shape mismatch: expected {expected:?}, got {got:?}")]
    OutputShapeMismatch {
        expected: (usize, usize),
        got: (usize, usize),
    },
    #[error("tile size must be greater than zero")]
    InvalidTileSize,
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("worker panicked: {0}")]
    WorkerPanicked(String),
    #[error("failed to load matrix market file: {0}")]
    MatrixMarket(String),
}

pub type Result<T> = std::result::Result<T, MatrixError>;

/// Returns `ShapeMismatch` unless `left_cols == right_rows`
pub(crate) fn check_conformant(
    (left_rows, left_cols): (usize, usize),
    (right_rows, right_cols): (usize, usize),
) -> Result<()> {
    if left_cols != right_rows {
        return Err(MatrixError::ShapeMismatch {
            left_rows,
            left_cols,
            right_rows,
            right_cols,
        });
    }
    Ok(())
}
