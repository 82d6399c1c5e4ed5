//! Tensor-product B-splines over N dimensions.
//!
//! A [`BSpline`] pairs one [`KnotVector`] per axis with a [`Mesh`] of control
//! points. Evaluation locates the segment along each axis, computes the
//! `order + 1` nonzero basis values there, and contracts them with the
//! `(order + 1)^N` patch of control points that they touch.
//!
//! Aperiodic axes clamp coordinates into their range (boundary replication).
//! Periodic axes fold coordinates into one period and wrap control point
//! indices.
use alloc::vec::Vec;

use num_traits::Float;

use crate::mesh::{Mesh, MeshDimension};
use crate::Error;

pub mod basis;
pub mod index;
pub mod knots;

pub use basis::BasisCache;
pub use index::{control_point_index, AxisLayout};
pub use knots::{KnotVector, Located, Position};

use knots::cast;

/// An N-dimensional tensor-product B-spline with a single order on every axis.
#[derive(Debug, Clone, PartialEq)]
pub struct BSpline<T, const N: usize> {
    order: usize,
    axes: Vec<KnotVector<T>>,
    control_points: Mesh<T, N>,

    /// `0..=order` in the value type, for derivative scaling
    degrees: Vec<T>,
}

/// Buffers for evaluating a spline at many points without reallocating.
///
/// One scratch may be shared between splines of any order and dimension.
#[derive(Debug, Clone)]
pub struct EvalScratch<T> {
    /// Basis values, `order + 1` slots per axis
    table: Vec<T>,

    /// Local control points, differenced in place for derivatives
    patch: Vec<T>,
}

impl<T> EvalScratch<T> {
    pub fn new() -> Self {
        Self {
            table: Vec::new(),
            patch: Vec::new(),
        }
    }
}

impl<T> Default for EvalScratch<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float, const N: usize> BSpline<T, N> {
    /// Build from raw knot sequences.
    ///
    /// Each knot sequence must have `order + 1` more entries than there are
    /// control points along its axis (`2 * order + 1` more on periodic axes).
    ///
    /// # Errors
    /// * If any knot sequence is unsorted, too short or spans an empty range
    /// * If any knot count does not match the control point extents
    /// * If a periodic axis is requested with order zero
    pub fn new(
        order: usize,
        periodicity: [bool; N],
        control_points: Mesh<T, N>,
        knots: [Vec<T>; N],
    ) -> Result<Self, Error> {
        let axes = knots
            .into_iter()
            .enumerate()
            .map(|(axis, k)| KnotVector::from_raw(axis, order, k, periodicity[axis]))
            .collect::<Result<Vec<_>, Error>>()?;
        Self::from_knot_vectors(axes, control_points)
    }

    /// Build from prepared knot vectors, one per axis.
    ///
    /// # Errors
    /// * If the number of knot vectors is not `N`
    /// * If the knot vectors disagree on the order
    /// * If any knot count does not match the control point extents
    pub fn from_knot_vectors(
        axes: Vec<KnotVector<T>>,
        control_points: Mesh<T, N>,
    ) -> Result<Self, Error> {
        const {
            assert!(N > 0, "Dimension must be at least 1");
        }
        if axes.len() != N {
            return Err(Error::DimensionMismatch);
        }
        let order = axes[0].order();
        for (axis, kv) in axes.iter().enumerate() {
            if kv.order() != order {
                return Err(Error::OrderMismatch {
                    axis,
                    order: kv.order(),
                    expected: order,
                });
            }
            check_counts(axis, kv, control_points.dim_size(axis))?;
        }
        let degrees = (0..=order)
            .map(cast::<T, usize>)
            .collect::<Result<Vec<T>, Error>>()?;

        Ok(Self {
            order,
            axes,
            control_points,
            degrees,
        })
    }

    /// Swap the knots of one axis, keeping its periodicity.
    ///
    /// # Errors
    /// * If the new knots are invalid or do not match the control point count
    pub fn replace_knots(&mut self, axis: usize, knots: Vec<T>) -> Result<(), Error> {
        let periodic = self.axes[axis].is_periodic();
        let kv = KnotVector::from_raw(axis, self.order, knots, periodic)?;
        check_counts(axis, &kv, self.control_points.dim_size(axis))?;
        self.axes[axis] = kv;
        Ok(())
    }

    /// Swap all control points.
    ///
    /// # Errors
    /// * If the new extents do not match the knot counts
    pub fn replace_control_points(&mut self, control_points: Mesh<T, N>) -> Result<(), Error> {
        for (axis, kv) in self.axes.iter().enumerate() {
            check_counts(axis, kv, control_points.dim_size(axis))?;
        }
        self.control_points = control_points;
        Ok(())
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    pub fn is_periodic(&self, axis: usize) -> bool {
        self.axes[axis].is_periodic()
    }

    pub fn is_uniform(&self, axis: usize) -> bool {
        self.axes[axis].is_uniform()
    }

    /// Interval on which the spline is defined along `axis`.
    pub fn range(&self, axis: usize) -> (T, T) {
        self.axes[axis].range()
    }

    pub fn knots(&self, axis: usize) -> &[T] {
        self.axes[axis].knots()
    }

    pub fn knot_vector(&self, axis: usize) -> &KnotVector<T> {
        &self.axes[axis]
    }

    pub fn control_points(&self) -> &Mesh<T, N> {
        &self.control_points
    }

    pub fn layout(&self, axis: usize) -> AxisLayout {
        AxisLayout {
            order: self.order,
            count: self.control_points.dim_size(axis),
            periodic: self.axes[axis].is_periodic(),
        }
    }

    /// Find the segment holding `x` along `axis`; see [`KnotVector::locate`].
    #[inline]
    pub fn locate_segment(&self, axis: usize, x: T, hint: Option<usize>) -> Located<T> {
        self.axes[axis].locate(x, hint)
    }

    /// Basis values of `degree` along `axis`, through a memo.
    pub fn basis_values<'c>(
        &self,
        cache: &'c mut BasisCache<T>,
        axis: usize,
        segment: usize,
        x: T,
        degree: usize,
    ) -> &'c [T] {
        cache.get_or_compute(axis, &self.axes[axis], segment, x, degree)
    }

    /// Evaluate at a point.
    #[inline]
    pub fn eval(&self, x: [T; N]) -> T {
        self.eval_with_scratch(x, &mut EvalScratch::new())
    }

    /// Evaluate at a point, checking the given segments first.
    ///
    /// Hints only affect speed; a wrong hint falls back to a full search.
    #[inline]
    pub fn eval_with_hints(&self, x: [T; N], hints: [usize; N]) -> T {
        self.eval_located(&self.locate_all(x, hints.map(Some)), &mut EvalScratch::new())
    }

    /// Evaluate at a point, reusing the buffers in `scratch`.
    #[inline]
    pub fn eval_with_scratch(&self, x: [T; N], scratch: &mut EvalScratch<T>) -> T {
        self.eval_located(&self.locate_all(x, [None; N]), scratch)
    }

    /// Evaluate the partial derivative with `orders[d]` derivatives along axis `d`.
    ///
    /// Orders above the spline order give exactly zero and all-zero orders give
    /// the same value as [`BSpline::eval`]. Outside an aperiodic range the
    /// derivative is taken at the clamped coordinate.
    #[inline]
    pub fn derivative(&self, x: [T; N], orders: [usize; N]) -> T {
        self.derivative_with_scratch(x, orders, &mut EvalScratch::new())
    }

    #[inline]
    pub fn derivative_with_hints(&self, x: [T; N], orders: [usize; N], hints: [usize; N]) -> T {
        let located = self.locate_all(x, hints.map(Some));
        self.derivative_located(&located, orders, &mut EvalScratch::new())
    }

    /// Partial derivative, reusing the buffers in `scratch`.
    #[inline]
    pub fn derivative_with_scratch(
        &self,
        x: [T; N],
        orders: [usize; N],
        scratch: &mut EvalScratch<T>,
    ) -> T {
        self.derivative_located(&self.locate_all(x, [None; N]), orders, scratch)
    }

    #[inline]
    pub(crate) fn locate_all(&self, x: [T; N], hints: [Option<usize>; N]) -> [Located<T>; N] {
        core::array::from_fn(|d| self.axes[d].locate(x[d], hints[d]))
    }

    /// Basis values of `degrees[d]` for every axis, `order + 1` slots per axis
    fn fill_basis_table(
        &self,
        located: &[Located<T>; N],
        degrees: [usize; N],
        table: &mut Vec<T>,
    ) {
        let width = self.order + 1;
        table.clear();
        table.resize(width * N, T::zero());
        for (d, loc) in located.iter().enumerate() {
            self.axes[d].basis_into(
                loc.segment,
                loc.x,
                degrees[d],
                &mut table[d * width..(d + 1) * width],
            );
        }
    }

    /// Control point multi-index for a multi-index into the local patch
    #[inline]
    fn global_index(&self, local: &[usize; N], located: &[Located<T>; N]) -> [usize; N] {
        core::array::from_fn(|d| {
            control_point_index(local[d], located[d].segment, located[d].position, self.layout(d))
        })
    }

    /// Sum over the local patch of tensor-product basis weights times `value`
    #[inline]
    fn contract<F>(&self, table: &[T], value: F) -> T
    where
        F: Fn([usize; N]) -> T,
    {
        let width = self.order + 1;
        let patch = MeshDimension::new([width; N]);
        let mut acc = T::zero();
        for i in 0..patch.size() {
            let local = patch.indices_of(i);
            let mut weight = T::one();
            for d in 0..N {
                weight = weight * table[d * width + local[d]];
            }
            if weight != T::zero() {
                acc = acc + weight * value(local);
            }
        }
        acc
    }

    pub(crate) fn eval_located(
        &self,
        located: &[Located<T>; N],
        scratch: &mut EvalScratch<T>,
    ) -> T {
        let table = &mut scratch.table;
        self.fill_basis_table(located, [self.order; N], table);
        self.contract(table, |local| {
            self.control_points[self.global_index(&local, located)]
        })
    }

    pub(crate) fn derivative_located(
        &self,
        located: &[Located<T>; N],
        orders: [usize; N],
        scratch: &mut EvalScratch<T>,
    ) -> T {
        let p = self.order;
        if orders.iter().any(|&k| k > p) {
            return T::zero();
        }
        if orders.iter().all(|&k| k == 0) {
            return self.eval_located(located, scratch);
        }

        let EvalScratch { table, patch } = scratch;
        self.fill_basis_table(located, orders.map(|k| p - k), table);

        // Differentiate the local control points in place, one axis at a time.
        // After `k` passes along an axis, slots `k..=p` hold the coefficients of
        // the degree `p - k` basis functions that are nonzero on the segment.
        let dimension = MeshDimension::new([p + 1; N]);
        patch.clear();
        patch.extend((0..dimension.size()).map(|i| {
            let local = dimension.indices_of(i);
            self.control_points[self.global_index(&local, located)]
        }));
        for d in 0..N {
            let k = orders[d];
            if k == 0 {
                continue;
            }
            let s = located[d].segment;
            let t = self.axes[d].knots();
            let stride = dimension.stride(d);
            for offset in dimension.fiber_offsets(d) {
                for q in (p - k + 1..=p).rev() {
                    for j in (1..=q).rev() {
                        let l = offset + (p + j - q) * stride;
                        let span = t[s + j] - t[s + j - q];
                        patch[l] = if span == T::zero() {
                            T::zero()
                        } else {
                            self.degrees[q] * (patch[l] - patch[l - stride]) / span
                        };
                    }
                }
            }
        }

        self.contract(table, |local| patch[dimension.index_of(&local)])
    }
}

/// Check that an axis' knots carry `count` control points.
fn check_counts<T: Float>(axis: usize, kv: &KnotVector<T>, count: usize) -> Result<(), Error> {
    let expected = kv.structural_excess();
    if kv.len() != count + expected {
        return Err(Error::KnotCountMismatch {
            axis,
            knots: kv.len(),
            control_points: count,
            expected,
        });
    }
    Ok(())
}
