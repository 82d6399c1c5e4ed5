//! N-dimensional B-spline interpolation on regular and rectilinear grids.
//!
//! Samples on a grid are fit with a tensor-product B-spline of any order that
//! passes through every sample, and the fit can then be evaluated, with
//! partial derivatives, anywhere. Each axis may be periodic, in which case the
//! interpolant wraps smoothly, or aperiodic, in which case coordinates outside
//! the grid take the value at the nearest boundary.
//!
//! | Type | Role |
//! |------|------|
//! | [`InterpolationTemplate`] | Knot layout and factored per-axis systems for one grid |
//! | [`InterpolationFunction`] | A fitted interpolant |
//! | [`BSpline`] | Knots and control points, evaluation and derivatives |
//! | [`Mesh`] | Dense C-ordered storage for samples and control points |
//!
//! Fitting solves one banded system per axis; each is factored once per
//! template and reused for every fiber of every sample lattice. Evaluation
//! costs `(order + 1)^N` multiply-adds plus one segment lookup per axis,
//! regardless of grid size.
//!
//! ```rust
//! use bspline_interp::{InterpolationFunction, Mesh};
//! use bspline_interp::utils::{linspace, sample_mesh};
//!
//! // Bilinear data is reproduced exactly by a cubic fit
//! let x = linspace(0.0_f64, 1.0, 9);
//! let y = linspace(-1.0, 1.0, 7);
//! let samples = sample_mesh([&x[..], &y[..]], |[a, b]| a * b);
//! let f = InterpolationFunction::new(3, [false, false], &samples, [(0.0, 1.0), (-1.0, 1.0)])
//!     .unwrap();
//!
//! assert!((f.eval([0.25, 0.5]) - 0.125).abs() < 1e-12);
//! assert!((f.derivative([0.25, 0.5], [1, 0]) - 0.5).abs() < 1e-10);
//! ```
#![cfg_attr(not(feature = "std"), no_std)]
// These "needless" range loops are a significant speedup
#![allow(clippy::needless_range_loop)]

extern crate alloc;

pub mod banded;
pub mod bspline;
pub mod error;
pub mod function;
pub mod mesh;
pub mod template;

#[cfg(feature = "std")]
pub mod utils;

#[cfg(all(test, feature = "std"))]
pub(crate) mod testing;

pub use bspline::{BSpline, BasisCache, EvalScratch, KnotVector, Located, Position};
pub use error::Error;
pub use function::InterpolationFunction;
pub use mesh::{Mesh, MeshDimension};
pub use template::{AxisSolver, GridAxis, InterpolationTemplate};
