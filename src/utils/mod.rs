//! Utility functions and interop helpers

pub mod formats;

pub use formats::{
    from_sprs_csc, from_sprs_csr, load_matrix_market_csc, load_matrix_market_csr, to_sprs_csc,
    to_sprs_csr,
};

/// Turns per-line entry counts into a pointer array of length `counts.len() + 1`
pub fn exclusive_scan(counts: &[usize]) -> Vec<usize> {
    std::iter::once(0)
        .chain(counts.iter().scan(0, |sum, &count| {
            *sum += count;
            Some(*sum)
        }))
        .collect()
}
