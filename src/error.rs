//! Error type shared by construction, fitting and batch evaluation.
//!
//! Only structural problems are errors. Degenerate knot intervals, coordinates
//! outside the grid and derivative orders above the spline order all have
//! defined results and never produce an `Error`.
use alloc::vec::Vec;

/// Errors raised while building or fitting a spline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// The knot vector of an axis does not carry the control points along that axis.
    #[error(
        "axis {axis}: {knots} knots cannot carry {control_points} control points \
         (knot count must exceed control point count by {expected})"
    )]
    KnotCountMismatch {
        axis: usize,
        knots: usize,
        control_points: usize,
        expected: usize,
    },

    /// Not enough samples along an axis for the requested order.
    #[error("axis {axis}: {samples} samples are too few for a spline of order {order}")]
    TooFewSamples {
        axis: usize,
        samples: usize,
        order: usize,
    },

    /// Range bounds are not finite or not increasing.
    #[error("axis {axis}: range must be finite and strictly increasing")]
    InvalidRange { axis: usize },

    /// Sample coordinates are not finite or not strictly increasing.
    #[error("axis {axis}: sample coordinates must be finite and strictly increasing")]
    NonMonotonic { axis: usize },

    /// Knot values are not finite or decrease somewhere.
    #[error("axis {axis}: knots must be finite and non-decreasing")]
    UnsortedKnots { axis: usize },

    /// All axes of a tensor-product spline share one order.
    #[error("axis {axis}: knots are for order {order}, expected {expected}")]
    OrderMismatch {
        axis: usize,
        order: usize,
        expected: usize,
    },

    /// Periodic axes need at least linear basis functions.
    #[error("axis {axis}: periodic axes require an order of at least 1")]
    PeriodicOrderZero { axis: usize },

    /// A mesh does not have the extents expected by the fitted layout.
    #[error("mesh shape {actual:?} does not match expected shape {expected:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Lengths of batch inputs or flat data do not agree.
    #[error("dimension mismatch")]
    DimensionMismatch,

    /// A matrix entry was written outside of the stored band structure.
    #[error("entry ({row}, {col}) lies outside the stored band")]
    OutsideBand { row: usize, col: usize },

    /// Elimination hit an exactly zero pivot.
    #[error("zero pivot at row {row} during band factorization")]
    SingularMatrix { row: usize },

    /// A count or coordinate could not be converted to the value type.
    #[error("value cannot be represented in the coordinate type")]
    Unrepresentable,
}
