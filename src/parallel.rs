//! # Parallel multiplication
//!
//! Two fork-join kernels on a rayon worker pool:
//!
//! - Dense: the output rows are cut into contiguous ranges, one per worker.
//!   Each worker runs the naive triple loop on its own range against the
//!   whole right operand. Ranges never overlap, so the only synchronization
//!   on the output is the join at the end of the scope.
//! - CSR: rows of the Gustavson product are computed independently, each
//!   worker owning its scratch row, and stitched together afterwards.
//!
//! A panicking worker aborts the whole call; the panic is caught at the join
//! and returned as [`MatrixError::WorkerPanicked`]. The output contents are
//! unspecified after an error.

use ndarray::{ArrayViewMut2, Axis};
use num_traits::Num;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};
use std::any::Any;
use std::ops::{AddAssign, Range};
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, instrument, trace};

use crate::accumulator::DenseScratch;
use crate::error::{check_conformant, MatrixError, Result};
use crate::matrix::dense::{check_operands, DenseMatrix};
use crate::matrix::SparseMatrixCSR;
use crate::utils::exclusive_scan;

/// Number of workers actually started for a request of `n_threads`
///
/// Clamped to `1..=num_cpus::get()` so a large request never oversubscribes
/// the machine.
pub fn worker_count(n_threads: usize) -> usize {
    n_threads.clamp(1, num_cpus::get())
}

/// Splits `m` rows into contiguous ranges for up to `n_workers` workers
///
/// The worker count is clamped to `1..=m`, every range except the last holds
/// `m / workers` rows and the last one takes the remainder. The ranges cover
/// `0..m` exactly once, in order. No ranges are produced for `m == 0`.
pub fn partition_rows(m: usize, n_workers: usize) -> Vec<Range<usize>> {
    if m == 0 {
        return Vec::new();
    }

    let workers = n_workers.clamp(1, m);
    let block = m / workers;

    (0..workers)
        .map(|w| {
            let start = w * block;
            let end = if w == workers - 1 { m } else { start + block };
            start..end
        })
        .collect()
}

/// Computes `c += a × b` with contiguous row ranges on a pool of `n_threads`
///
/// The pool never exceeds [`worker_count`] threads. `c` is expected to be
/// zero-filled for a plain product. The calling thread
/// blocks until every range is finished.
///
/// # Errors
///
/// `ShapeMismatch` or `OutputShapeMismatch` before any work, `ThreadPool` if
/// the pool cannot be built, `WorkerPanicked` if any worker fails.
#[instrument(level = "debug", skip_all, fields(
    m = a.nrows(),
    k = a.ncols(),
    n = b.ncols(),
    n_threads = n_threads,
))]
pub fn parallel_multiply(
    a: &DenseMatrix,
    b: &DenseMatrix,
    c: &mut DenseMatrix,
    n_threads: usize,
) -> Result<()> {
    check_operands(a, b, c)?;

    let ranges = partition_rows(a.nrows(), worker_count(n_threads));
    debug!(workers = ranges.len(), ?ranges, "row partition planned");
    if ranges.is_empty() {
        return Ok(());
    }

    let pool = ThreadPoolBuilder::new().num_threads(ranges.len()).build()?;
    fork_join_rows(&pool, c.view_mut(), &ranges, |rows, mut block| {
        multiply_row_block(a, b, rows, &mut block)
    })
}

/// Runs `kernel` once per range on `pool`, each call owning its rows of `out`
///
/// `ranges` must be contiguous, start at 0 and cover every row of `out`.
pub(crate) fn fork_join_rows<F>(
    pool: &ThreadPool,
    out: ArrayViewMut2<'_, f64>,
    ranges: &[Range<usize>],
    kernel: F,
) -> Result<()>
where
    F: Fn(Range<usize>, ArrayViewMut2<'_, f64>) + Sync,
{
    let blocks = split_rows(out, ranges);
    let kernel = &kernel;

    join_workers(|| {
        pool.scope(|s| {
            for (rows, block) in blocks {
                s.spawn(move |_| {
                    trace!(start = rows.start, end = rows.end, "worker started");
                    kernel(rows, block);
                });
            }
        })
    })
}

/// Cuts `out` into disjoint mutable row blocks matching `ranges`
fn split_rows<'a>(
    mut rest: ArrayViewMut2<'a, f64>,
    ranges: &[Range<usize>],
) -> Vec<(Range<usize>, ArrayViewMut2<'a, f64>)> {
    let mut blocks = Vec::with_capacity(ranges.len());
    for rows in ranges {
        let (head, tail) = rest.split_at(Axis(0), rows.len());
        blocks.push((rows.clone(), head));
        rest = tail;
    }
    blocks
}

/// Naive product for rows `rows` of `a`, written into `block` (local row 0 is `rows.start`)
fn multiply_row_block(
    a: &DenseMatrix,
    b: &DenseMatrix,
    rows: Range<usize>,
    block: &mut ArrayViewMut2<'_, f64>,
) {
    let (k, n) = b.dim();
    for (local, i) in rows.enumerate() {
        for j in 0..n {
            let mut sum = block[[local, j]];
            for p in 0..k {
                sum += a[[i, p]] * b[[p, j]];
            }
            block[[local, j]] = sum;
        }
    }
}

/// Runs `f`, turning a worker panic into `WorkerPanicked`
fn join_workers<R>(f: impl FnOnce() -> R) -> Result<R> {
    panic::catch_unwind(AssertUnwindSafe(f))
        .map_err(|payload| MatrixError::WorkerPanicked(panic_message(&*payload)))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

impl<T> SparseMatrixCSR<T>
where
    T: Copy + Num + AddAssign + Send + Sync,
{
    /// Gustavson product with rows computed in parallel on `n_threads` workers
    ///
    /// The pool is capped at [`worker_count`] threads. Produces exactly the
    /// same matrix as [`SparseMatrixCSR::multiply`].
    ///
    /// # Examples
    ///
    /// ```
    /// use matmul_strategies::SparseMatrixCSR;
    ///
    /// let a = SparseMatrixCSR::<f64>::new(2, 2, vec![0, 1, 2], vec![0, 1], vec![1.0, 1.0]);
    /// let b = SparseMatrixCSR::<f64>::new(2, 2, vec![0, 1, 2], vec![0, 1], vec![2.0, 2.0]);
    ///
    /// let c = a.multiply_parallel(&b, 2).unwrap();
    /// assert_eq!(c.values, vec![2.0, 2.0]);
    /// ```
    #[instrument(level = "debug", skip_all, fields(
        rows = self.n_rows,
        cols = b.n_cols,
        nnz_a = self.nnz(),
        nnz_b = b.nnz(),
        n_threads = n_threads,
    ))]
    pub fn multiply_parallel(&self, b: &Self, n_threads: usize) -> Result<Self> {
        check_conformant(self.shape(), b.shape())?;

        let pool = ThreadPoolBuilder::new()
            .num_threads(worker_count(n_threads))
            .build()?;
        let row_results: Vec<(Vec<usize>, Vec<T>)> = join_workers(|| {
            pool.install(|| {
                (0..self.n_rows)
                    .into_par_iter()
                    .map_init(
                        || DenseScratch::new(b.n_cols),
                        |scratch, i| {
                            scratch.reset();
                            self.scatter_row(i, b, scratch);

                            let mut cols = Vec::new();
                            let mut vals = Vec::new();
                            scratch.flush_into(&mut cols, &mut vals);
                            (cols, vals)
                        },
                    )
                    .collect()
            })
        })?;

        let lengths: Vec<usize> = row_results.iter().map(|(cols, _)| cols.len()).collect();
        let row_ptr = exclusive_scan(&lengths);
        let nnz = row_ptr[self.n_rows];

        let mut col_idx = Vec::with_capacity(nnz);
        let mut values = Vec::with_capacity(nnz);
        for (cols, vals) in row_results {
            col_idx.extend(cols);
            values.extend(vals);
        }

        debug!(nnz, "parallel csr product assembled");
        Ok(Self::new(self.n_rows, b.n_cols, row_ptr, col_idx, values))
    }
}
