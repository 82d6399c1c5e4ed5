//! Banded linear systems and their LU factorization.
//!
//! The per-axis interpolation systems are collocation matrices of B-spline
//! bases. These are totally positive, so Gaussian elimination without pivoting
//! is stable and preserves the sparsity pattern; the only thing that differs
//! between aperiodic and periodic axes is which entries are structurally nonzero.
//!
//! Storage types describe their pattern through [`BandStorage`], and
//! [`BandLu`] runs the same Doolittle elimination over any of them.
use core::ops::{IndexMut, Range};

use num_traits::{Float, Zero};

use crate::Error;

pub mod band;
pub mod extended;

pub use band::BandMatrix;
pub use extended::ExtendedBandMatrix;

/// A square matrix with a fixed sparsity pattern.
///
/// The pattern must be closed under elimination: for any pivot `k`,
/// every `(i, j)` with `i` in `lower_rows(k)` and `j` in `upper_cols(k)`
/// must be stored.
pub trait BandStorage {
    type Value: Float;

    /// Number of rows (and columns).
    fn dim(&self) -> usize;

    /// Entry value, zero outside of the stored pattern.
    fn get(&self, row: usize, col: usize) -> Self::Value;

    /// Mutable entry, `None` outside of the stored pattern.
    fn get_mut(&mut self, row: usize, col: usize) -> Option<&mut Self::Value>;

    /// Rows below `col` that may hold a nonzero in column `col`.
    fn lower_rows(&self, col: usize) -> [Range<usize>; 2];

    /// Columns right of `row` that may hold a nonzero in row `row`.
    fn upper_cols(&self, row: usize) -> [Range<usize>; 2];

    /// Overwrite an entry.
    ///
    /// # Errors
    /// * If the entry lies outside of the stored pattern
    fn set(&mut self, row: usize, col: usize, value: Self::Value) -> Result<(), Error> {
        *self.get_mut(row, col).ok_or(Error::OutsideBand { row, col })? = value;
        Ok(())
    }

    /// Accumulate into an entry.
    ///
    /// # Errors
    /// * If the entry lies outside of the stored pattern
    fn add(&mut self, row: usize, col: usize, value: Self::Value) -> Result<(), Error> {
        let e = self.get_mut(row, col).ok_or(Error::OutsideBand { row, col })?;
        *e = *e + value;
        Ok(())
    }
}

/// In-place LU factors of a banded matrix, unit lower triangle implied.
#[derive(Debug, Clone)]
pub struct BandLu<M> {
    lu: M,
}

impl<M: BandStorage> BandLu<M> {
    /// Factor a matrix once so that it can be applied to many right-hand sides.
    ///
    /// # Errors
    /// * If a pivot is exactly zero
    /// * If the storage pattern is not closed under elimination
    pub fn factor(matrix: M) -> Result<Self, Error> {
        let mut lu = matrix;
        let n = lu.dim();
        for k in 0..n {
            let pivot = lu.get(k, k);
            if pivot == <M::Value as Zero>::zero() {
                return Err(Error::SingularMatrix { row: k });
            }
            let cols = lu.upper_cols(k);
            for i in lu.lower_rows(k).into_iter().flatten() {
                let lik = lu.get(i, k) / pivot;
                if lik == <M::Value as Zero>::zero() {
                    continue;
                }
                lu.set(i, k, lik)?;
                for j in cols.clone().into_iter().flatten() {
                    let ukj = lu.get(k, j);
                    let e = lu
                        .get_mut(i, j)
                        .ok_or(Error::OutsideBand { row: i, col: j })?;
                    *e = *e - lik * ukj;
                }
            }
        }
        Ok(Self { lu })
    }

    pub fn dim(&self) -> usize {
        self.lu.dim()
    }

    /// Solve `A x = b` in place, where `rhs` holds `b` on entry and `x` on exit.
    ///
    /// `rhs` may be any indexable view of length `dim()`, including a strided
    /// fiber of a mesh.
    pub fn solve<V>(&self, rhs: &mut V)
    where
        V: IndexMut<usize, Output = M::Value> + ?Sized,
    {
        let n = self.lu.dim();

        // Forward substitution with the unit lower triangle
        for k in 0..n {
            let yk = rhs[k];
            for i in self.lu.lower_rows(k).into_iter().flatten() {
                rhs[i] = rhs[i] - self.lu.get(i, k) * yk;
            }
        }

        // Back substitution with the upper triangle
        for k in (0..n).rev() {
            let mut acc = rhs[k];
            for j in self.lu.upper_cols(k).into_iter().flatten() {
                acc = acc - self.lu.get(k, j) * rhs[j];
            }
            rhs[k] = acc / self.lu.get(k, k);
        }
    }
}
