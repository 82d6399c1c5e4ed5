//! Band storage extended with wraparound strips for periodic axes.
//!
//! A cyclic band matrix has nonzeros within `bandwidth` of the diagonal
//! modulo `n`, which puts a small triangle in the top-right and bottom-left
//! corners. Elimination without pivoting only fills in the last `bandwidth`
//! columns and the last `bandwidth` rows, so those are stored densely next
//! to the regular band:
//!
//! ```text
//!  x x . . . r r
//!  x x x . . r r
//!  . x x x . r r
//!  . . x x x r r
//!  . . . x x r r
//!  b b b b b b b
//!  b b b b b b b
//! ```
use alloc::vec;
use alloc::vec::Vec;
use core::ops::Range;

use num_traits::Float;

use super::BandStorage;

/// Cyclic band matrix with dense trailing columns (`r`) and rows (`b`).
#[derive(Debug, Clone, PartialEq)]
pub struct ExtendedBandMatrix<T> {
    n: usize,
    bandwidth: usize,

    /// Band entries of the leading `n - bandwidth` rows and columns
    band: Vec<T>,

    /// Trailing `bandwidth` columns of the leading `n - bandwidth` rows
    right: Vec<T>,

    /// Trailing `bandwidth` rows, all columns
    bottom: Vec<T>,
}

impl<T: Float> ExtendedBandMatrix<T> {
    /// An all-zero `n x n` matrix with the given half-bandwidth.
    pub fn new(n: usize, bandwidth: usize) -> Self {
        let bandwidth = bandwidth.min(n);
        let lead = n - bandwidth;
        Self {
            n,
            bandwidth,
            band: vec![T::zero(); lead * (2 * bandwidth + 1)],
            right: vec![T::zero(); lead * bandwidth],
            bottom: vec![T::zero(); bandwidth * n],
        }
    }

    pub fn bandwidth(&self) -> usize {
        self.bandwidth
    }

    /// Index of the first trailing row/column
    #[inline]
    fn lead(&self) -> usize {
        self.n - self.bandwidth
    }

    #[inline]
    fn slot(&self, row: usize, col: usize) -> Option<Slot> {
        let (n, bw, lead) = (self.n, self.bandwidth, self.lead());
        if row >= n || col >= n {
            None
        } else if row >= lead {
            Some(Slot::Bottom((row - lead) * n + col))
        } else if col >= lead {
            Some(Slot::Right(row * bw + col - lead))
        } else if col + bw >= row && col <= row + bw {
            Some(Slot::Band(row * (2 * bw + 1) + col + bw - row))
        } else {
            None
        }
    }

    #[inline]
    fn pattern_after(&self, k: usize) -> [Range<usize>; 2] {
        let near = (k + self.bandwidth + 1).min(self.n);
        [k + 1..near, self.lead().max(near)..self.n]
    }
}

/// Location of an entry in one of the three storage blocks
#[derive(Clone, Copy)]
enum Slot {
    Band(usize),
    Right(usize),
    Bottom(usize),
}

impl<T: Float> BandStorage for ExtendedBandMatrix<T> {
    type Value = T;

    fn dim(&self) -> usize {
        self.n
    }

    #[inline]
    fn get(&self, row: usize, col: usize) -> T {
        match self.slot(row, col) {
            Some(Slot::Band(i)) => self.band[i],
            Some(Slot::Right(i)) => self.right[i],
            Some(Slot::Bottom(i)) => self.bottom[i],
            None => T::zero(),
        }
    }

    #[inline]
    fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut T> {
        match self.slot(row, col)? {
            Slot::Band(i) => Some(&mut self.band[i]),
            Slot::Right(i) => Some(&mut self.right[i]),
            Slot::Bottom(i) => Some(&mut self.bottom[i]),
        }
    }

    #[inline]
    fn lower_rows(&self, col: usize) -> [Range<usize>; 2] {
        self.pattern_after(col)
    }

    #[inline]
    fn upper_cols(&self, row: usize) -> [Range<usize>; 2] {
        self.pattern_after(row)
    }
}
