//! Convenience methods for constructing grids and sample lattices,
//! echoing but not exactly matching methods common in scripting languages.
use itertools::Itertools;
use num_traits::Float;

use crate::mesh::Mesh;

/// Generates `n` evenly spaced values from start to stop,
/// including the endpoint.
///
/// The values match the sample coordinates assumed by regular grids
/// bit for bit.
pub fn linspace<T>(start: T, stop: T, n: usize) -> Vec<T>
where
    T: Float,
{
    if n < 2 {
        return vec![start; n];
    }
    // Integer-valued counters stay exact, unlike a cast that may fail
    let steps = (1..n).fold(T::zero(), |acc, _| acc + T::one());
    let dx = (stop - start) / steps;
    let mut k = T::zero();
    (0..n)
        .map(|_| {
            let v = start + dx * k;
            k = k + T::one();
            v
        })
        .collect()
}

/// Generates a meshgrid in C ordering (x0, y0, z0, x0, y0, z1, ..., x0, yn, zn)
pub fn meshgrid<T>(x: Vec<&Vec<T>>) -> Vec<Vec<T>>
where
    T: Float,
{
    x.into_iter()
        .multi_cartesian_product()
        .map(|xx| xx.iter().map(|y| **y).collect())
        .collect()
}

/// Samples `f` at every point of the grid spanned by the per-axis coordinates.
pub fn sample_mesh<T, const N: usize, F>(grids: [&[T]; N], mut f: F) -> Mesh<T, N>
where
    T: Float,
    F: FnMut([T; N]) -> T,
{
    Mesh::from_fn(grids.map(|g| g.len()), |idx| {
        f(core::array::from_fn(|d| grids[d][idx[d]]))
    })
}
