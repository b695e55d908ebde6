//! Dense scratch accumulator shared by the CSR and CSC products

use num_traits::Num;
use std::ops::AddAssign;

/// Dense accumulation buffer for one output row or column
///
/// The buffer is sized once per multiplication and reset before every line,
/// so no allocation happens inside the row loop. Each concurrent worker must
/// own its own instance.
pub struct DenseScratch<T> {
    values: Vec<T>,
}

impl<T> DenseScratch<T>
where
    T: Copy + Num + AddAssign,
{
    /// Creates a zero-filled buffer covering `len` output indices
    pub fn new(len: usize) -> Self {
        Self {
            values: vec![T::zero(); len],
        }
    }

    /// Zeroes every slot
    pub fn reset(&mut self) {
        self.values.fill(T::zero());
    }

    /// Adds `val` into slot `idx`
    #[inline]
    pub fn accumulate(&mut self, idx: usize, val: T) {
        self.values[idx] += val;
    }

    /// Sweeps the buffer left to right and appends every non-zero slot
    ///
    /// A slot that cancelled to exactly zero is dropped like any other zero.
    pub fn flush_into(&self, indices: &mut Vec<usize>, values: &mut Vec<T>) {
        for (idx, &val) in self.values.iter().enumerate() {
            if !val.is_zero() {
                indices.push(idx);
                values.push(val);
            }
        }
    }
}
