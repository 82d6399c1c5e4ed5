//! Fitted interpolants, ready for evaluation.
//!
//! ```rust
//! use bspline_interp::{InterpolationFunction, Mesh};
//! use bspline_interp::utils::linspace;
//!
//! // Cubic fit of sin(x) over one period
//! let x = linspace(0.0_f64, std::f64::consts::TAU, 65);
//! let samples = Mesh::from(x.iter().map(|v| v.sin()).collect::<Vec<_>>());
//! let f = InterpolationFunction::new(3, [true], &samples, [(x[0], x[64])]).unwrap();
//!
//! assert!((f.eval([1.0]) - 1.0_f64.sin()).abs() < 1e-5);
//! assert!((f.derivative([1.0], [1]) - 1.0_f64.cos()).abs() < 1e-3);
//!
//! // Batch evaluation over columnar observations
//! let obs = [0.5, 1.5, 2.5];
//! let mut out = [0.0; 3];
//! f.interp(&[&obs[..]], &mut out).unwrap();
//! assert!((out[1] - 1.5_f64.sin()).abs() < 1e-5);
//! ```
#[cfg(feature = "std")]
use alloc::vec;
#[cfg(feature = "std")]
use alloc::vec::Vec;

use num_traits::Float;

use crate::bspline::{BSpline, EvalScratch, Located};
use crate::mesh::Mesh;
use crate::template::{GridAxis, InterpolationTemplate};
use crate::Error;

/// A fitted tensor-product B-spline.
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolationFunction<T, const N: usize> {
    spline: BSpline<T, N>,
}

impl<T: Float, const N: usize> InterpolationFunction<T, N> {
    /// Fit evenly spaced samples.
    ///
    /// `ranges[d]` gives the coordinates of the first and last sample along
    /// axis `d`. On periodic axes the last sample repeats the first.
    ///
    /// # Errors
    /// * If any axis has too few samples for the order
    /// * If a range is not finite and increasing
    /// * If a periodic axis is requested with order zero
    pub fn new(
        order: usize,
        periodicity: [bool; N],
        samples: &Mesh<T, N>,
        ranges: [(T, T); N],
    ) -> Result<Self, Error> {
        InterpolationTemplate::regular(order, periodicity, samples.dims(), ranges)?
            .interpolate(samples)
    }

    /// Fit samples at the given coordinates.
    ///
    /// # Errors
    /// * If the coordinate counts do not match the sample extents
    /// * If any coordinates are not strictly increasing
    /// * As for [`InterpolationFunction::new`]
    pub fn new_rectilinear(
        order: usize,
        periodicity: [bool; N],
        samples: &Mesh<T, N>,
        coords: [&[T]; N],
    ) -> Result<Self, Error> {
        let grid = coords.map(|c| GridAxis::Rectilinear(c.to_vec()));
        InterpolationTemplate::new(order, periodicity, samples.dims(), grid)?.interpolate(samples)
    }

    /// Wrap an existing spline, e.g. one built from raw knots and control points.
    pub fn from_spline(spline: BSpline<T, N>) -> Self {
        Self { spline }
    }

    pub fn spline(&self) -> &BSpline<T, N> {
        &self.spline
    }

    pub fn into_spline(self) -> BSpline<T, N> {
        self.spline
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.spline.order()
    }

    /// Interval covered by the samples along `axis`.
    #[inline]
    pub fn range(&self, axis: usize) -> (T, T) {
        self.spline.range(axis)
    }

    #[inline]
    pub fn is_periodic(&self, axis: usize) -> bool {
        self.spline.is_periodic(axis)
    }

    #[inline]
    pub fn eval(&self, x: [T; N]) -> T {
        self.spline.eval(x)
    }

    #[inline]
    pub fn eval_with_hints(&self, x: [T; N], hints: [usize; N]) -> T {
        self.spline.eval_with_hints(x, hints)
    }

    /// Partial derivative with `orders[d]` derivatives along axis `d`.
    #[inline]
    pub fn derivative(&self, x: [T; N], orders: [usize; N]) -> T {
        self.spline.derivative(x, orders)
    }

    #[inline]
    pub fn derivative_with_hints(&self, x: [T; N], orders: [usize; N], hints: [usize; N]) -> T {
        self.spline.derivative_with_hints(x, orders, hints)
    }

    /// Evaluate at many points.
    ///
    /// `x` holds one slice of coordinates per axis. Segments found for one
    /// point are tried first for the next, so sorted or clustered
    /// observations evaluate faster.
    ///
    /// # Errors
    /// * If `x` does not have one slice per axis
    /// * If the slices and `out` differ in length
    pub fn interp(&self, x: &[&[T]], out: &mut [T]) -> Result<(), Error> {
        self.interp_with(x, out, |located, scratch| {
            self.spline.eval_located(located, scratch)
        })
    }

    /// Evaluate a partial derivative at many points; see [`InterpolationFunction::interp`].
    ///
    /// # Errors
    /// * If `x` does not have one slice per axis
    /// * If the slices and `out` differ in length
    pub fn interp_derivative(
        &self,
        x: &[&[T]],
        orders: [usize; N],
        out: &mut [T],
    ) -> Result<(), Error> {
        self.interp_with(x, out, |located, scratch| {
            self.spline.derivative_located(located, orders, scratch)
        })
    }

    fn interp_with<F>(&self, x: &[&[T]], out: &mut [T], f: F) -> Result<(), Error>
    where
        F: Fn(&[Located<T>; N], &mut EvalScratch<T>) -> T,
    {
        let n = out.len();
        if x.len() != N || x.iter().any(|col| col.len() != n) {
            return Err(Error::DimensionMismatch);
        }

        let mut hints = [None; N];
        let mut scratch = EvalScratch::new();
        for i in 0..n {
            let point = core::array::from_fn(|d| x[d][i]);
            let located = self.spline.locate_all(point, hints);
            out[i] = f(&located, &mut scratch);
            hints = located.map(|l| Some(l.segment));
        }
        Ok(())
    }

    /// Evaluate at many points, allocating the output.
    ///
    /// # Errors
    /// * As for [`InterpolationFunction::interp`]
    #[cfg(feature = "std")]
    pub fn interp_alloc(&self, x: &[&[T]]) -> Result<Vec<T>, Error> {
        let n = x.first().map_or(0, |col| col.len());
        let mut out = vec![T::zero(); n];
        self.interp(x, &mut out)?;
        Ok(out)
    }
}

impl<T: Float> InterpolationFunction<T, 1> {
    /// Fit evenly spaced 1D samples over `range`.
    ///
    /// # Errors
    /// * As for [`InterpolationFunction::new`]
    pub fn new_1d(order: usize, periodic: bool, values: &[T], range: (T, T)) -> Result<Self, Error> {
        let samples = Mesh::from(values.to_vec());
        Self::new(order, [periodic], &samples, [range])
    }
}
