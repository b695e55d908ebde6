//! Property tests over randomly shaped and filled matrices

use approx::relative_eq;
use matmul_strategies::{
    blocked_multiply, naive_multiply, parallel_multiply, partition_rows, zeroed_product,
    DenseMatrix, MatrixError, SparseMatrixCSC, SparseMatrixCSR,
};
use proptest::prelude::*;

/// Entries that are zero about three times in five
fn entry() -> impl Strategy<Value = f64> {
    prop_oneof![3 => Just(0.0), 2 => -10.0f64..10.0]
}

fn dense(rows: usize, cols: usize) -> impl Strategy<Value = DenseMatrix> {
    prop::collection::vec(entry(), rows * cols)
        .prop_map(move |data| DenseMatrix::from_shape_vec((rows, cols), data).unwrap())
}

fn any_dense() -> impl Strategy<Value = DenseMatrix> {
    (0usize..12, 0usize..12).prop_flat_map(|(rows, cols)| dense(rows, cols))
}

fn conformant_pair() -> impl Strategy<Value = (DenseMatrix, DenseMatrix)> {
    (0usize..12, 0usize..12, 0usize..12).prop_flat_map(|(m, k, n)| (dense(m, k), dense(k, n)))
}

fn reference(a: &DenseMatrix, b: &DenseMatrix) -> DenseMatrix {
    let mut c = zeroed_product(a, b);
    naive_multiply(a, b, &mut c).unwrap();
    c
}

fn close(got: &DenseMatrix, want: &DenseMatrix) -> bool {
    got.dim() == want.dim()
        && got
            .iter()
            .zip(want.iter())
            .all(|(g, w)| relative_eq!(*g, *w, epsilon = 1e-9, max_relative = 1e-9))
}

fn pointers_valid(ptr: &[usize], lines: usize, nnz: usize) -> bool {
    ptr.len() == lines + 1
        && ptr[0] == 0
        && ptr[lines] == nnz
        && ptr.windows(2).all(|w| w[0] <= w[1])
}

proptest! {
    #[test]
    fn prop_csr_roundtrip_is_exact(m in any_dense()) {
        let csr = SparseMatrixCSR::from_dense(&m);
        prop_assert!(pointers_valid(&csr.row_ptr, csr.n_rows, csr.nnz()));
        prop_assert!(csr.values.iter().all(|&v| v != 0.0));
        prop_assert_eq!(csr.to_dense(), m);
    }

    #[test]
    fn prop_csc_roundtrip_is_exact(m in any_dense()) {
        let csc = SparseMatrixCSC::from_dense(&m);
        prop_assert!(pointers_valid(&csc.col_ptr, csc.n_cols, csc.nnz()));
        prop_assert_eq!(csc.to_dense(), m);
    }

    #[test]
    fn prop_csr_product_matches_dense((a, b) in conformant_pair()) {
        let product = SparseMatrixCSR::from_dense(&a)
            .multiply(&SparseMatrixCSR::from_dense(&b))
            .unwrap();

        prop_assert!(pointers_valid(&product.row_ptr, a.nrows(), product.nnz()));
        prop_assert_eq!(product.shape(), (a.nrows(), b.ncols()));
        prop_assert!(close(&product.to_dense(), &reference(&a, &b)));
    }

    #[test]
    fn prop_csc_product_matches_dense((a, b) in conformant_pair()) {
        let product = SparseMatrixCSC::from_dense(&a)
            .multiply(&SparseMatrixCSC::from_dense(&b))
            .unwrap();

        prop_assert!(pointers_valid(&product.col_ptr, b.ncols(), product.nnz()));
        prop_assert_eq!(product.shape(), (a.nrows(), b.ncols()));
        prop_assert!(close(&product.to_dense(), &reference(&a, &b)));
    }

    #[test]
    fn prop_parallel_csr_matches_serial((a, b) in conformant_pair(), threads in 1usize..6) {
        let a = SparseMatrixCSR::from_dense(&a);
        let b = SparseMatrixCSR::from_dense(&b);
        prop_assert_eq!(a.multiply_parallel(&b, threads).unwrap(), a.multiply(&b).unwrap());
    }

    #[test]
    fn prop_blocked_matches_naive((a, b) in conformant_pair(), tile in 1usize..40) {
        let mut c = zeroed_product(&a, &b);
        blocked_multiply(&a, &b, &mut c, tile).unwrap();
        prop_assert!(close(&c, &reference(&a, &b)));
    }

    #[test]
    fn prop_parallel_matches_naive((a, b) in conformant_pair(), threads in 1usize..16) {
        let mut c = zeroed_product(&a, &b);
        parallel_multiply(&a, &b, &mut c, threads).unwrap();
        prop_assert!(close(&c, &reference(&a, &b)));
    }

    #[test]
    fn prop_mismatch_always_rejected(m in 1usize..8, k in 1usize..8, extra in 1usize..4, n in 1usize..8) {
        let a = DenseMatrix::ones((m, k));
        let b = DenseMatrix::ones((k + extra, n));
        let mut c = zeroed_product(&a, &b);

        let is_mismatch =
            |r: Result<(), MatrixError>| matches!(r, Err(MatrixError::ShapeMismatch { .. }));
        prop_assert!(is_mismatch(naive_multiply(&a, &b, &mut c)));
        prop_assert!(is_mismatch(blocked_multiply(&a, &b, &mut c, 4)));
        prop_assert!(is_mismatch(parallel_multiply(&a, &b, &mut c, 3)));
        prop_assert!(c.iter().all(|&x| x == 0.0));

        let a_csr = SparseMatrixCSR::from_dense(&a);
        let b_csr = SparseMatrixCSR::from_dense(&b);
        prop_assert!(
            matches!(a_csr.multiply(&b_csr), Err(MatrixError::ShapeMismatch { .. })),
            "expected ShapeMismatch from CSR multiply"
        );
        prop_assert!(matches!(
            a_csr.to_csc().multiply(&b_csr.to_csc()),
            Err(MatrixError::ShapeMismatch { .. })
        ), "expected ShapeMismatch from CSC multiply");
    }

    #[test]
    fn prop_partition_covers_rows_exactly(m in 0usize..2000) {
        for p in 1..=num_cpus::get().max(16) {
            let ranges = partition_rows(m, p);
            prop_assert!(ranges.len() <= p.min(m));

            let mut covered = vec![0u8; m];
            for r in &ranges {
                prop_assert!(!r.is_empty());
                for i in r.clone() {
                    covered[i] += 1;
                }
            }
            prop_assert!(covered.iter().all(|&hits| hits == 1));
        }
    }
}
