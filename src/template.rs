//! Fitting control points to gridded samples.
//!
//! An [`InterpolationTemplate`] fixes the knot layout and factors one banded
//! collocation system per axis. Fitting a lattice of samples then amounts to
//! solving every fiber along axis 0, then every fiber along axis 1, and so on;
//! since the tensor-product system is the Kronecker product of the per-axis
//! systems, this yields control points that reproduce the samples exactly.
//!
//! Templates depend only on the grid, so one template can fit any number of
//! sample lattices of the same shape.
use alloc::vec::Vec;
use core::ops::IndexMut;

use num_traits::Float;

use crate::banded::{BandLu, BandMatrix, BandStorage, ExtendedBandMatrix};
use crate::bspline::knots::cast;
use crate::bspline::{BSpline, BasisCache, KnotVector};
use crate::function::InterpolationFunction;
use crate::mesh::Mesh;
use crate::Error;

/// Sample coordinates along one axis.
#[derive(Debug, Clone, PartialEq)]
pub enum GridAxis<T> {
    /// Evenly spaced samples from `start` to `stop`, both included.
    Regular { start: T, stop: T },

    /// Strictly increasing sample coordinates.
    Rectilinear(Vec<T>),
}

/// Factored collocation system of one axis.
#[derive(Debug, Clone)]
pub enum AxisSolver<T> {
    Aperiodic(BandLu<BandMatrix<T>>),
    Periodic(BandLu<ExtendedBandMatrix<T>>),
}

impl<T: Float> AxisSolver<T> {
    /// Number of control points along the axis.
    pub fn dim(&self) -> usize {
        match self {
            Self::Aperiodic(lu) => lu.dim(),
            Self::Periodic(lu) => lu.dim(),
        }
    }

    /// Replace samples by control points in place.
    #[inline]
    pub fn solve<V>(&self, rhs: &mut V)
    where
        V: IndexMut<usize, Output = T> + ?Sized,
    {
        match self {
            Self::Aperiodic(lu) => lu.solve(rhs),
            Self::Periodic(lu) => lu.solve(rhs),
        }
    }
}

/// Knot layout and factored per-axis systems for one sample grid.
#[derive(Debug, Clone)]
pub struct InterpolationTemplate<T, const N: usize> {
    order: usize,
    axes: Vec<KnotVector<T>>,
    sample_dims: [usize; N],
    control_dims: [usize; N],
    solvers: Vec<AxisSolver<T>>,
}

impl<T: Float, const N: usize> InterpolationTemplate<T, N> {
    /// Lay out knots for the given grid and factor the per-axis systems.
    ///
    /// On periodic axes the last sample closes the period: it must repeat the
    /// first one and is not used in fitting.
    ///
    /// # Errors
    /// * If any axis has too few samples for the order
    /// * If rectilinear coordinates do not match `sample_dims` or are not strictly increasing
    /// * If a regular range is not finite and increasing
    /// * If a periodic axis is requested with order zero
    pub fn new(
        order: usize,
        periodicity: [bool; N],
        sample_dims: [usize; N],
        grid: [GridAxis<T>; N],
    ) -> Result<Self, Error> {
        const {
            assert!(N > 0, "Dimension must be at least 1");
        }

        let mut axes = Vec::with_capacity(N);
        let mut solvers = Vec::with_capacity(N);
        let mut cache = BasisCache::new();
        for (axis, layout) in grid.into_iter().enumerate() {
            let periodic = periodicity[axis];
            let n = sample_dims[axis];
            let (kv, coords) = match layout {
                GridAxis::Regular { start, stop } => {
                    let kv = KnotVector::regular(axis, order, n, start, stop, periodic)?;
                    let coords = regular_coords(&kv, n)?;
                    (kv, coords)
                }
                GridAxis::Rectilinear(coords) => {
                    if coords.len() != n {
                        return Err(Error::ShapeMismatch {
                            expected: sample_dims.to_vec(),
                            actual: {
                                let mut actual = sample_dims.to_vec();
                                actual[axis] = coords.len();
                                actual
                            },
                        });
                    }
                    let kv = KnotVector::rectilinear(axis, order, &coords, periodic)?;
                    (kv, coords)
                }
            };

            let solver = factor_axis(axis, &kv, &coords, &mut cache)?;
            log::debug!(
                "axis {axis}: factored {} x {} {} system (order {order})",
                solver.dim(),
                solver.dim(),
                if periodic { "periodic" } else { "aperiodic" },
            );
            axes.push(kv);
            solvers.push(solver);
        }

        let control_dims = core::array::from_fn(|d| axes[d].control_point_count());
        Ok(Self {
            order,
            axes,
            sample_dims,
            control_dims,
            solvers,
        })
    }

    /// Template for evenly spaced samples on every axis.
    ///
    /// # Errors
    /// * As for [`InterpolationTemplate::new`]
    pub fn regular(
        order: usize,
        periodicity: [bool; N],
        sample_dims: [usize; N],
        ranges: [(T, T); N],
    ) -> Result<Self, Error> {
        let grid = ranges.map(|(start, stop)| GridAxis::Regular { start, stop });
        Self::new(order, periodicity, sample_dims, grid)
    }

    /// Template for samples at the given coordinates on every axis.
    ///
    /// # Errors
    /// * As for [`InterpolationTemplate::new`]
    pub fn rectilinear(
        order: usize,
        periodicity: [bool; N],
        coords: [&[T]; N],
    ) -> Result<Self, Error> {
        let sample_dims = coords.map(|c| c.len());
        let grid = coords.map(|c| GridAxis::Rectilinear(c.to_vec()));
        Self::new(order, periodicity, sample_dims, grid)
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Extents of the sample lattices this template fits.
    pub fn sample_dims(&self) -> [usize; N] {
        self.sample_dims
    }

    /// Extents of the resulting control point lattice.
    pub fn control_dims(&self) -> [usize; N] {
        self.control_dims
    }

    pub fn knot_vector(&self, axis: usize) -> &KnotVector<T> {
        &self.axes[axis]
    }

    pub fn solver(&self, axis: usize) -> &AxisSolver<T> {
        &self.solvers[axis]
    }

    /// Control points whose spline passes through every sample.
    ///
    /// # Errors
    /// * If `samples` does not have the template's sample extents
    pub fn solve_control_points(&self, samples: &Mesh<T, N>) -> Result<Mesh<T, N>, Error> {
        if samples.dims() != self.sample_dims {
            return Err(Error::ShapeMismatch {
                expected: self.sample_dims.to_vec(),
                actual: samples.dims().to_vec(),
            });
        }

        // Copy into the working lattice. Periodic rows are stored rotated by
        // `order / 2` so that the system's band sits on the diagonal, and the
        // redundant closing sample is dropped.
        let shift = self.order / 2;
        let mut weights = Mesh::from_fn(self.control_dims, |_| T::zero());
        'samples: for (idx, &v) in samples.indexed_iter() {
            let mut target = idx;
            for d in 0..N {
                if self.axes[d].is_periodic() {
                    let m = self.control_dims[d];
                    if idx[d] == m {
                        continue 'samples;
                    }
                    target[d] = (idx[d] + shift) % m;
                }
            }
            weights[target] = v;
        }

        for (axis, solver) in self.solvers.iter().enumerate() {
            let dimension = *weights.dimension();
            for offset in dimension.fiber_offsets(axis) {
                solver.solve(&mut weights.fiber_mut(axis, offset));
            }
        }
        log::debug!(
            "solved {} control points from {} samples",
            weights.size(),
            samples.size()
        );
        Ok(weights)
    }

    /// Fit `samples` and pair the control points with this template's knots.
    ///
    /// # Errors
    /// * If `samples` does not have the template's sample extents
    pub fn interpolate(&self, samples: &Mesh<T, N>) -> Result<InterpolationFunction<T, N>, Error> {
        let control_points = self.solve_control_points(samples)?;
        let spline = BSpline::from_knot_vectors(self.axes.clone(), control_points)?;
        Ok(InterpolationFunction::from_spline(spline))
    }
}

impl<T: Float> InterpolationTemplate<T, 1> {
    /// Template for `len` evenly spaced samples over `range`.
    ///
    /// # Errors
    /// * As for [`InterpolationTemplate::new`]
    pub fn new_1d(order: usize, periodic: bool, len: usize, range: (T, T)) -> Result<Self, Error> {
        Self::regular(order, [periodic], [len], [range])
    }
}

/// Coordinates of the samples that produce rows of a regular axis' system
fn regular_coords<T: Float>(kv: &KnotVector<T>, samples: usize) -> Result<Vec<T>, Error> {
    let (start, stop) = kv.range();
    let dx = kv.spacing().ok_or(Error::Unrepresentable)?;
    let rows = kv.control_point_count();
    (0..rows)
        .map(|i| {
            if i + 1 == samples {
                Ok(stop)
            } else {
                Ok(start + dx * cast::<T, _>(i)?)
            }
        })
        .collect()
}

/// Assemble and factor the collocation system of one axis.
fn factor_axis<T: Float>(
    axis: usize,
    kv: &KnotVector<T>,
    coords: &[T],
    cache: &mut BasisCache<T>,
) -> Result<AxisSolver<T>, Error> {
    let p = kv.order();
    let m = kv.control_point_count();
    if kv.is_periodic() {
        let mut matrix = ExtendedBandMatrix::new(m, p / 2);
        fill_rows(&mut matrix, axis, kv, coords, cache)?;
        Ok(AxisSolver::Periodic(BandLu::factor(matrix)?))
    } else {
        let mut matrix = BandMatrix::new(m, p.saturating_sub(1));
        fill_rows(&mut matrix, axis, kv, coords, cache)?;
        Ok(AxisSolver::Aperiodic(BandLu::factor(matrix)?))
    }
}

/// Write one row per sample: the basis values of the sample's segment.
///
/// Aperiodic end rows are identity, since only the first (last) basis function
/// is nonzero at the start (end) of a clamped range. Periodic rows and columns
/// wrap modulo the number of control points, with rows rotated by `order / 2`.
fn fill_rows<T, M>(
    matrix: &mut M,
    axis: usize,
    kv: &KnotVector<T>,
    coords: &[T],
    cache: &mut BasisCache<T>,
) -> Result<(), Error>
where
    T: Float,
    M: BandStorage<Value = T>,
{
    let p = kv.order();
    let m = matrix.dim();
    let periodic = kv.is_periodic();
    let shift = if periodic { p / 2 } else { 0 };

    // On regular axes every row away from the clamped ends sees the same
    // knot spacing around its sample, so its values are computed once.
    let mut stable: Option<(usize, T)> = None;
    let mut previous: Option<usize> = None;
    for i in 0..m {
        if !periodic && (i == 0 || i + 1 == m) {
            matrix.set(i, i, T::one())?;
            continue;
        }

        let hint = if kv.is_uniform() {
            None
        } else {
            previous.map(|s| s + 1)
        };
        let located = kv.locate_unfolded(coords[i], hint);
        let segment = located.segment;
        previous = Some(segment);

        let (s, x) = if kv.is_stable(segment) {
            *stable.get_or_insert((segment, located.x))
        } else {
            (segment, located.x)
        };
        let values = cache.get_or_compute(axis, kv, s, x, p);

        let row = (i + shift) % m;
        for (j, &v) in values.iter().enumerate() {
            if v == T::zero() {
                continue;
            }
            matrix.add(row, (segment - p + j) % m, v)?;
        }
        log::trace!("axis {axis}: row {row} from segment {segment}");
    }
    Ok(())
}
