//! Plain band storage for aperiodic axes.
use alloc::vec;
use alloc::vec::Vec;
use core::ops::Range;

use num_traits::Float;

use super::BandStorage;

/// A square matrix whose nonzeros lie within `bandwidth` of the diagonal.
///
/// Each row stores `2 * bandwidth + 1` entries centered on the diagonal.
#[derive(Debug, Clone, PartialEq)]
pub struct BandMatrix<T> {
    n: usize,
    bandwidth: usize,
    vals: Vec<T>,
}

impl<T: Float> BandMatrix<T> {
    /// An all-zero `n x n` matrix with the given half-bandwidth.
    pub fn new(n: usize, bandwidth: usize) -> Self {
        Self {
            n,
            bandwidth,
            vals: vec![T::zero(); n * (2 * bandwidth + 1)],
        }
    }

    pub fn bandwidth(&self) -> usize {
        self.bandwidth
    }

    #[inline]
    fn slot(&self, row: usize, col: usize) -> Option<usize> {
        let in_band = row < self.n
            && col < self.n
            && col + self.bandwidth >= row
            && col <= row + self.bandwidth;
        in_band.then(|| row * (2 * self.bandwidth + 1) + col + self.bandwidth - row)
    }

    #[inline]
    fn band_after(&self, k: usize) -> Range<usize> {
        k + 1..(k + self.bandwidth + 1).min(self.n)
    }
}

impl<T: Float> BandStorage for BandMatrix<T> {
    type Value = T;

    fn dim(&self) -> usize {
        self.n
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> T {
        self.slot(row, col).map_or(T::zero(), |i| self.vals[i])
    }

    #[inline]
    fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut T> {
        self.slot(row, col).map(|i| &mut self.vals[i])
    }

    #[inline]
    fn lower_rows(&self, col: usize) -> [Range<usize>; 2] {
        [self.band_after(col), self.n..self.n]
    }

    #[inline]
    fn upper_cols(&self, row: usize) -> [Range<usize>; 2] {
        [self.band_after(row), self.n..self.n]
    }
}
