//! Dense strategies against the naive reference and against each other

use approx::assert_relative_eq;
use matmul_strategies::{
    blocked_multiply, multiply, multiply_with, naive_multiply, parallel_multiply, zeroed_product,
    DenseMatrix, MatrixError, MultiplyConfig, Strategy,
};
use ndarray::array;

/// Deterministic matrix with entries in [-2, 2]
fn patterned(rows: usize, cols: usize, salt: usize) -> DenseMatrix {
    DenseMatrix::from_shape_fn((rows, cols), |(i, j)| {
        ((i * 37 + j * 11 + salt) % 17) as f64 / 4.0 - 2.0
    })
}

/// Like `patterned` but with roughly four entries in five set to zero
fn patterned_sparse(rows: usize, cols: usize, salt: usize) -> DenseMatrix {
    DenseMatrix::from_shape_fn((rows, cols), |(i, j)| {
        if (i * 13 + j * 7 + salt) % 5 == 0 {
            ((i + j + salt) % 9) as f64 - 4.5
        } else {
            0.0
        }
    })
}

fn reference(a: &DenseMatrix, b: &DenseMatrix) -> DenseMatrix {
    let mut c = zeroed_product(a, b);
    naive_multiply(a, b, &mut c).unwrap();
    c
}

fn assert_close(got: &DenseMatrix, want: &DenseMatrix) {
    assert_eq!(got.dim(), want.dim());
    for (g, w) in got.iter().zip(want.iter()) {
        assert_relative_eq!(*g, *w, epsilon = 1e-9, max_relative = 1e-9);
    }
}

#[test]
fn test_concrete_scenario_all_paths() {
    let a = array![[1.0, 2.0], [3.0, 4.0]];
    let b = array![[5.0, 6.0], [7.0, 8.0]];
    let expected = array![[19.0, 22.0], [43.0, 50.0]];
    let config = MultiplyConfig::default();

    for strategy in [
        Strategy::Naive,
        Strategy::Blocked,
        Strategy::ParallelRows,
        Strategy::SparseRow,
        Strategy::SparseColumn,
    ] {
        assert_close(&multiply_with(&a, &b, strategy, &config).unwrap(), &expected);
    }
}

#[test]
fn test_blocked_matches_naive_on_large_square() {
    let a = patterned(130, 130, 1);
    let b = patterned(130, 130, 2);
    let expected = reference(&a, &b);

    let mut c = zeroed_product(&a, &b);
    blocked_multiply(&a, &b, &mut c, 32).unwrap();

    assert_close(&c, &expected);
}

#[test]
fn test_blocked_matches_naive_on_rectangular() {
    let a = patterned(33, 70, 3);
    let b = patterned(70, 5, 4);
    let expected = reference(&a, &b);

    for tile in [3, 32, 100] {
        let mut c = zeroed_product(&a, &b);
        blocked_multiply(&a, &b, &mut c, tile).unwrap();
        assert_close(&c, &expected);
    }
}

#[test]
fn test_parallel_matches_naive_on_large_square() {
    let a = patterned(101, 101, 5);
    let b = patterned(101, 101, 6);
    let expected = reference(&a, &b);

    for threads in [1, 2, 4, 7, num_cpus::get()] {
        let mut c = zeroed_product(&a, &b);
        parallel_multiply(&a, &b, &mut c, threads).unwrap();
        assert_close(&c, &expected);
    }
}

#[test]
fn test_parallel_more_workers_than_rows() {
    let a = patterned(3, 40, 7);
    let b = patterned(40, 12, 8);
    let expected = reference(&a, &b);

    let mut c = zeroed_product(&a, &b);
    parallel_multiply(&a, &b, &mut c, 64).unwrap();

    assert_close(&c, &expected);
}

#[test]
fn test_sparse_paths_match_naive() {
    let a = patterned_sparse(90, 75, 1);
    let b = patterned_sparse(75, 110, 2);
    let expected = reference(&a, &b);
    let config = MultiplyConfig::default();

    for strategy in [Strategy::SparseRow, Strategy::SparseColumn] {
        assert_close(&multiply_with(&a, &b, strategy, &config).unwrap(), &expected);
    }
}

#[test]
fn test_auto_selection_matches_naive() {
    let config = MultiplyConfig::default();

    let small = patterned(10, 10, 1);
    assert_close(&multiply(&small, &small, &config).unwrap(), &reference(&small, &small));

    let dense = patterned(80, 80, 2);
    assert_close(&multiply(&dense, &dense, &config).unwrap(), &reference(&dense, &dense));

    let sparse = patterned_sparse(120, 120, 3);
    assert_close(&multiply(&sparse, &sparse, &config).unwrap(), &reference(&sparse, &sparse));
}

#[test]
fn test_shape_mismatch_everywhere() {
    let a = DenseMatrix::ones((4, 3));
    let b = DenseMatrix::ones((4, 3));
    let mut c = DenseMatrix::from_elem((4, 3), 1.5);

    assert!(matches!(naive_multiply(&a, &b, &mut c), Err(MatrixError::ShapeMismatch { .. })));
    assert!(matches!(blocked_multiply(&a, &b, &mut c, 32), Err(MatrixError::ShapeMismatch { .. })));
    assert!(matches!(parallel_multiply(&a, &b, &mut c, 4), Err(MatrixError::ShapeMismatch { .. })));
    assert!(matches!(
        multiply(&a, &b, &MultiplyConfig::default()),
        Err(MatrixError::ShapeMismatch { .. })
    ));

    // Nothing was written
    assert!(c.iter().all(|&x| x == 1.5));
}

#[test]
fn test_wrong_output_shape() {
    let a = DenseMatrix::ones((4, 3));
    let b = DenseMatrix::ones((3, 2));
    let mut c = DenseMatrix::zeros((2, 4));

    assert!(matches!(
        parallel_multiply(&a, &b, &mut c, 2),
        Err(MatrixError::OutputShapeMismatch { expected: (4, 2), got: (2, 4) })
    ));
}

#[test]
fn test_zero_sized_inputs_are_valid() {
    let config = MultiplyConfig::default();
    let a = DenseMatrix::zeros((0, 5));
    let b = DenseMatrix::zeros((5, 3));

    for strategy in [
        Strategy::Naive,
        Strategy::Blocked,
        Strategy::ParallelRows,
        Strategy::SparseRow,
        Strategy::SparseColumn,
    ] {
        assert_eq!(multiply_with(&a, &b, strategy, &config).unwrap().dim(), (0, 3));
    }

    // Empty contraction gives an all-zero product
    let a = DenseMatrix::zeros((2, 0));
    let b = DenseMatrix::zeros((0, 2));
    assert_eq!(multiply(&a, &b, &config).unwrap(), DenseMatrix::zeros((2, 2)));
}
