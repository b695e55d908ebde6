//! Scratch accumulators for sparse matrix multiplication
//!
//! Both compressed formats build one output line (a row for CSR, a column
//! for CSC) at a time into a dense scratch buffer, then sweep it to emit the
//! surviving entries in index order.

pub mod dense;

pub use dense::DenseScratch;
