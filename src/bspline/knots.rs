//! Per-axis knot vectors.
//!
//! Knots are built either from a sample layout (regular or rectilinear) or taken
//! verbatim. Sample layouts place knots so that every sample is covered by a
//! well-centred basis function:
//!
//! * Aperiodic axes clamp `order + 1` knots at each end of the range, and put
//!   the `n - order - 1` interior knots on samples (odd order) or half way
//!   between samples (even order).
//! * Periodic axes continue the sample spacing past both ends, with the same
//!   odd/even placement, so that `t[j + m] = t[j] + period` for `m` unique samples.
//!
//! Besides layout, a knot vector answers "which segment holds `x`", folding
//! periodic coordinates and clamping aperiodic ones into the range first.
use alloc::vec::Vec;

use num_traits::{Float, NumCast, ToPrimitive};

use super::basis::cox_de_boor;
use crate::Error;

/// Where a coordinate was found relative to an aperiodic range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Position {
    #[default]
    Inside,

    /// Below the range; the coordinate was clamped to the lower bound
    Below,

    /// At or above the upper bound; the coordinate was clamped to it
    Above,
}

/// Result of a segment lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Located<T> {
    /// Knot index `i` with `t[i] <= x < t[i + 1]` (or the boundary segment)
    pub segment: usize,

    /// The coordinate after periodic folding or boundary clamping
    pub x: T,

    pub position: Position,
}

/// Knot sequence of one axis, with its order, periodicity and range.
#[derive(Debug, Clone, PartialEq)]
pub struct KnotVector<T> {
    knots: Vec<T>,
    order: usize,
    periodic: bool,

    /// Sample spacing of regular axes, enabling arithmetic segment lookup
    spacing: Option<T>,

    /// Offset, in units of `spacing`, from `range.0` to the knot index
    hint_shift: T,

    range: (T, T),
}

/// Convert a count or offset into the value type.
#[inline]
pub(crate) fn cast<T: Float, U: ToPrimitive>(v: U) -> Result<T, Error> {
    <T as NumCast>::from(v).ok_or(Error::Unrepresentable)
}

/// Minimum number of samples (including the redundant closing sample of a periodic axis).
fn min_samples(order: usize, periodic: bool) -> usize {
    if periodic {
        order + 2
    } else {
        (order + 1).max(2)
    }
}

impl<T: Float> KnotVector<T> {
    /// Knots for `samples` evenly spaced points from `start` to `stop` inclusive.
    ///
    /// On a periodic axis the sample at `stop` repeats the one at `start`,
    /// so there are `samples - 1` control points.
    ///
    /// # Errors
    /// * If the range is not finite and increasing
    /// * If there are too few samples for the order
    /// * If the axis is periodic and the order is zero
    pub fn regular(
        axis: usize,
        order: usize,
        samples: usize,
        start: T,
        stop: T,
        periodic: bool,
    ) -> Result<Self, Error> {
        check_order(axis, order, periodic)?;
        if !(start.is_finite() && stop.is_finite() && start < stop) {
            return Err(Error::InvalidRange { axis });
        }
        if samples < min_samples(order, periodic) {
            return Err(Error::TooFewSamples {
                axis,
                samples,
                order,
            });
        }

        let two = T::one() + T::one();
        let (knots, dx, hint_shift) = if periodic {
            let m = samples - 1;
            let dx = (stop - start) / cast(m)?;
            // Twice the knot offset from `start`, in units of dx
            let lead = (2 * order + 1 - order % 2) as isize;
            let knots = (0..m + 2 * order + 1)
                .map(|j| Ok(start + dx * (cast::<T, _>(2 * j as isize - lead)? / two)))
                .collect::<Result<Vec<T>, Error>>()?;
            (knots, dx, cast::<T, _>(lead)? / two)
        } else {
            let n = samples;
            let dx = (stop - start) / cast(n - 1)?;
            let mut knots = Vec::with_capacity(n + order + 1);
            knots.extend(core::iter::repeat(start).take(order + 1));
            for i in order + 1..n {
                knots.push(start + dx * (cast::<T, _>(2 * i - order - 1)? / two));
            }
            knots.extend(core::iter::repeat(stop).take(order + 1));
            (knots, dx, cast::<T, _>(order + 1)? / two)
        };

        Ok(Self {
            knots,
            order,
            periodic,
            spacing: Some(dx),
            hint_shift,
            range: (start, stop),
        })
    }

    /// Knots for samples at the given strictly increasing coordinates.
    ///
    /// On a periodic axis the last coordinate closes the period and its sample
    /// repeats the first one.
    ///
    /// # Errors
    /// * If the coordinates are not finite and strictly increasing
    /// * If there are too few coordinates for the order
    /// * If the axis is periodic and the order is zero
    pub fn rectilinear(axis: usize, order: usize, coords: &[T], periodic: bool) -> Result<Self, Error> {
        check_order(axis, order, periodic)?;
        if coords.len() < min_samples(order, periodic) {
            return Err(Error::TooFewSamples {
                axis,
                samples: coords.len(),
                order,
            });
        }
        let increasing = coords.iter().all(|x| x.is_finite())
            && coords.windows(2).all(|w| w[0] < w[1]);
        if !increasing {
            return Err(Error::NonMonotonic { axis });
        }

        let two = T::one() + T::one();
        let n = coords.len();
        let (lo, hi) = (coords[0], coords[n - 1]);
        let knots = if periodic {
            let m = n - 1;
            let period = hi - lo;
            // Sample coordinate continued periodically to any integer index
            let extended = |k: isize| -> Result<T, Error> {
                let (q, r) = (k.div_euclid(m as isize), k.rem_euclid(m as isize) as usize);
                if (0..=m as isize).contains(&k) {
                    Ok(coords[k as usize])
                } else {
                    Ok(coords[r] + period * cast::<T, _>(q)?)
                }
            };
            (0..m + 2 * order + 1)
                .map(|j| {
                    let k = j as isize - order as isize;
                    if order % 2 == 1 {
                        extended(k)
                    } else {
                        Ok((extended(k - 1)? + extended(k)?) / two)
                    }
                })
                .collect::<Result<Vec<T>, Error>>()?
        } else {
            let mut knots = Vec::with_capacity(n + order + 1);
            knots.extend(core::iter::repeat(lo).take(order + 1));
            for i in order + 1..n {
                let t = if order % 2 == 1 {
                    coords[i - (order + 1) / 2]
                } else {
                    (coords[i - order / 2 - 1] + coords[i - order / 2]) / two
                };
                knots.push(t);
            }
            knots.extend(core::iter::repeat(hi).take(order + 1));
            knots
        };

        Ok(Self {
            knots,
            order,
            periodic,
            spacing: None,
            hint_shift: T::zero(),
            range: (lo, hi),
        })
    }

    /// Take a knot sequence verbatim.
    ///
    /// The range is `(t[order], t[len - order - 1])`. Periodic knot sequences are
    /// expected to repeat with that period; this is not checked.
    ///
    /// # Errors
    /// * If the knots are not finite and non-decreasing
    /// * If there are too few knots to carry one control point
    /// * If the range they span is empty
    /// * If the axis is periodic and the order is zero
    pub fn from_raw(axis: usize, order: usize, knots: Vec<T>, periodic: bool) -> Result<Self, Error> {
        check_order(axis, order, periodic)?;
        let sorted =
            knots.iter().all(|t| t.is_finite()) && knots.windows(2).all(|w| w[0] <= w[1]);
        if !sorted {
            return Err(Error::UnsortedKnots { axis });
        }
        let structural = if periodic { 2 * order + 1 } else { order + 1 };
        if knots.len() <= structural {
            return Err(Error::KnotCountMismatch {
                axis,
                knots: knots.len(),
                control_points: 0,
                expected: structural,
            });
        }
        let range = (knots[order], knots[knots.len() - order - 1]);
        if range.0 >= range.1 {
            return Err(Error::InvalidRange { axis });
        }

        Ok(Self {
            knots,
            order,
            periodic,
            spacing: None,
            hint_shift: T::zero(),
            range,
        })
    }

    #[inline]
    pub fn knots(&self) -> &[T] {
        &self.knots
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.knots.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.knots.is_empty()
    }

    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    #[inline]
    pub fn is_periodic(&self) -> bool {
        self.periodic
    }

    /// Whether segments can be located arithmetically.
    #[inline]
    pub fn is_uniform(&self) -> bool {
        self.spacing.is_some()
    }

    /// Sample spacing of a regular axis.
    #[inline]
    pub fn spacing(&self) -> Option<T> {
        self.spacing
    }

    #[inline]
    pub fn range(&self) -> (T, T) {
        self.range
    }

    #[inline]
    pub fn period(&self) -> T {
        self.range.1 - self.range.0
    }

    /// Number of control points these knots carry.
    #[inline]
    pub fn control_point_count(&self) -> usize {
        self.knots.len() - self.structural_excess()
    }

    /// Knot count minus control point count.
    #[inline]
    pub fn structural_excess(&self) -> usize {
        if self.periodic {
            2 * self.order + 1
        } else {
            self.order + 1
        }
    }

    /// First and last segment index that evaluation may use.
    #[inline]
    pub fn segment_bounds(&self) -> (usize, usize) {
        let last = self.knots.len() - self.order - 1;
        if self.periodic {
            (self.order, last)
        } else {
            (self.order, last - 1)
        }
    }

    /// Whether every knot touched when evaluating in `segment` is evenly spaced.
    ///
    /// Only meaningful on regular axes, where all rows of the interpolation
    /// system that satisfy this share the same basis values.
    pub(crate) fn is_stable(&self, segment: usize) -> bool {
        if !self.is_uniform() {
            return false;
        }
        if self.periodic {
            return true;
        }
        let p = self.order;
        segment >= 2 * p + 1 && segment + 2 * p + 2 <= self.knots.len()
    }

    /// Fold a coordinate into `[range.0, range.1)`.
    #[inline]
    pub fn fold(&self, x: T) -> T {
        let (lo, _) = self.range;
        let period = self.period();
        let mut r = (x - lo) % period;
        if r < T::zero() {
            r = r + period;
        }
        if r >= period {
            r = T::zero();
        }
        lo + r
    }

    /// Arithmetic segment estimate on regular axes; the first segment otherwise.
    #[inline]
    fn guess_segment(&self, x: T) -> usize {
        let (first, last) = self.segment_bounds();
        match self.spacing {
            Some(dx) => ((x - self.range.0) / dx + self.hint_shift)
                .floor()
                .to_isize()
                .map_or(first, |s| (s.max(first as isize) as usize).min(last)),
            None => first,
        }
    }

    /// Find the segment holding `x`.
    ///
    /// Periodic coordinates are folded into the range. Aperiodic coordinates
    /// outside `[range.0, range.1)` are clamped onto the range and reported as
    /// [`Position::Below`] or [`Position::Above`] with the first or last
    /// segment.
    ///
    /// The `hint` is checked first; when it is missing or wrong, the segment
    /// is estimated arithmetically (regular axes) and then found by bisection.
    #[inline]
    pub fn locate(&self, x: T, hint: Option<usize>) -> Located<T> {
        let (lo, hi) = self.range;
        let (first, last) = self.segment_bounds();
        if self.periodic {
            let x = self.fold(x);
            return Located {
                segment: self.search(x, hint),
                x,
                position: Position::Inside,
            };
        }

        if x < lo {
            Located {
                segment: first,
                x: lo,
                position: Position::Below,
            }
        } else if x >= hi {
            Located {
                segment: last,
                x: hi,
                position: Position::Above,
            }
        } else {
            Located {
                segment: self.search(x, hint),
                x,
                position: Position::Inside,
            }
        }
    }

    /// Segment lookup for a coordinate already known to lie in the range,
    /// without folding or clamping.
    #[inline]
    pub(crate) fn locate_unfolded(&self, x: T, hint: Option<usize>) -> Located<T> {
        Located {
            segment: self.search(x, hint),
            x,
            position: Position::Inside,
        }
    }

    #[inline]
    fn search(&self, x: T, hint: Option<usize>) -> usize {
        let (first, last) = self.segment_bounds();
        let contains = |s: usize| {
            s >= first && s <= last && self.knots[s] <= x && x < self.knots[s + 1]
        };

        if let Some(s) = hint.filter(|&s| contains(s)) {
            return s;
        }
        let guess = self.guess_segment(x);
        if contains(guess) {
            return guess;
        }

        // Bisection over the distinct interior knots
        first + self.knots[first + 1..=last].partition_point(|&t| t <= x)
    }

    /// Basis values of the given degree at `x` in `segment`, written into
    /// `out[..=order]`, right-aligned when `degree < order`.
    #[inline]
    pub fn basis_into(&self, segment: usize, x: T, degree: usize, out: &mut [T]) {
        cox_de_boor(&self.knots, self.order, segment, x, degree, out);
    }
}

fn check_order(axis: usize, order: usize, periodic: bool) -> Result<(), Error> {
    if periodic && order == 0 {
        Err(Error::PeriodicOrderZero { axis })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::utils::linspace;
    use alloc::vec;

    #[test]
    fn test_regular_aperiodic_layout() {
        // Cubic: interior knots land on samples 2..=n-3
        let kv = KnotVector::regular(0, 3, 7, 0.0, 6.0, false).unwrap();
        assert_eq!(kv.knots(), &[0.0, 0.0, 0.0, 0.0, 2.0, 3.0, 4.0, 6.0, 6.0, 6.0, 6.0]);
        assert_eq!(kv.control_point_count(), 7);
        assert_eq!(kv.range(), (0.0, 6.0));
        assert_eq!(kv.segment_bounds(), (3, 6));

        // Quadratic: interior knots half way between samples
        let kv = KnotVector::regular(0, 2, 5, 0.0, 4.0, false).unwrap();
        assert_eq!(kv.knots(), &[0.0, 0.0, 0.0, 1.5, 2.5, 4.0, 4.0, 4.0]);
    }

    #[test]
    fn test_regular_periodic_layout() {
        // 4 unique samples at 0, 1, 2, 3 with period 4
        let kv = KnotVector::regular(0, 3, 5, 0.0, 4.0, true).unwrap();
        assert_eq!(kv.len(), 4 + 2 * 3 + 1);
        assert_eq!(kv.knots()[3], 0.0);
        assert_eq!(kv.knots()[0], -3.0);
        assert_eq!(kv.knots()[10], 7.0);
        assert_eq!(kv.control_point_count(), 4);

        let kv = KnotVector::regular(0, 2, 5, 0.0, 4.0, true).unwrap();
        assert_eq!(kv.knots()[2], -0.5);
        assert_eq!(kv.knots()[3], 0.5);
        assert_eq!(kv.range(), (0.0, 4.0));
    }

    /// Rectilinear knots on evenly spaced coordinates match the regular layout
    #[test]
    fn test_rectilinear_matches_regular() {
        for order in 1..=5 {
            for periodic in [false, true] {
                let x = linspace(-1.0, 3.0, 11);
                let a = KnotVector::regular(0, order, 11, -1.0, 3.0, periodic).unwrap();
                let b = KnotVector::rectilinear(0, order, &x, periodic).unwrap();
                assert_eq!(a.len(), b.len());
                a.knots()
                    .iter()
                    .zip(b.knots())
                    .for_each(|(u, v)| assert!((u - v).abs() < 1e-12, "order {order}"));
            }
        }
    }

    #[test]
    fn test_periodic_knots_repeat() {
        let x = [0.0, 0.3, 1.1, 1.5, 2.6, 3.0];
        for order in 1..=4 {
            let kv = KnotVector::rectilinear(0, order, &x, true).unwrap();
            let m = kv.control_point_count();
            assert_eq!(m, 5);
            let t = kv.knots();
            for j in 0..t.len() - m {
                assert!((t[j + m] - t[j] - 3.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            KnotVector::regular(2, 3, 3, 0.0, 1.0, false).unwrap_err(),
            Error::TooFewSamples {
                axis: 2,
                samples: 3,
                order: 3
            }
        );
        assert_eq!(
            KnotVector::regular(0, 3, 10, 1.0, 1.0, false).unwrap_err(),
            Error::InvalidRange { axis: 0 }
        );
        assert_eq!(
            KnotVector::rectilinear(1, 1, &[0.0, 2.0, 1.0], false).unwrap_err(),
            Error::NonMonotonic { axis: 1 }
        );
        assert_eq!(
            KnotVector::regular(0, 0, 10, 0.0, 1.0, true).unwrap_err(),
            Error::PeriodicOrderZero { axis: 0 }
        );
        assert_eq!(
            KnotVector::from_raw(0, 1, vec![0.0, 1.0, 0.5], false).unwrap_err(),
            Error::UnsortedKnots { axis: 0 }
        );
    }

    #[test]
    fn test_locate_clamps_aperiodic() {
        let kv = KnotVector::regular(0, 3, 9, 0.0, 8.0, false).unwrap();
        let (first, last) = kv.segment_bounds();

        let below = kv.locate(-1.0, None);
        assert_eq!((below.segment, below.x, below.position), (first, 0.0, Position::Below));

        let above = kv.locate(8.0, None);
        assert_eq!((above.segment, above.x, above.position), (last, 8.0, Position::Above));

        let inside = kv.locate(4.5, None);
        assert_eq!(inside.position, Position::Inside);
        let t = kv.knots();
        assert!(t[inside.segment] <= 4.5 && 4.5 < t[inside.segment + 1]);
    }

    /// Stale or out-of-range hints never change the answer
    #[test]
    fn test_locate_ignores_bad_hints() {
        let x = [0.0, 0.1, 0.5, 0.55, 1.2, 2.0, 2.1, 3.5, 4.0];
        let kv = KnotVector::rectilinear(0, 3, &x, false).unwrap();
        let obs = linspace(0.0, 3.99, 97);
        for &v in obs.iter() {
            let reference = kv.locate(v, None).segment;
            for hint in 0..kv.len() + 3 {
                assert_eq!(kv.locate(v, Some(hint)).segment, reference);
            }
            let t = kv.knots();
            assert!(t[reference] <= v && v < t[reference + 1]);
        }
    }

    #[test]
    fn test_fold() {
        let kv = KnotVector::regular(0, 3, 9, -2.0, 2.0, true).unwrap();
        assert_eq!(kv.fold(-2.0), -2.0);
        assert_eq!(kv.fold(2.0), -2.0);
        assert_eq!(kv.fold(6.0), -2.0);
        assert_eq!(kv.fold(-6.0), -2.0);
        assert_eq!(kv.fold(3.0), -1.0);
        assert_eq!(kv.fold(-3.0), 1.0);
        assert_eq!(kv.locate(-3.0, None).x, 1.0);
    }

    /// Regular axes find samples through the arithmetic estimate alone
    #[test]
    fn test_regular_guess_is_exact_between_samples() {
        for order in 1..=4 {
            for periodic in [false, true] {
                let kv = KnotVector::regular(0, order, 33, 0.0, 1.0, periodic).unwrap();
                let dx = kv.spacing().unwrap();
                for i in 0..31 {
                    // Quarter of the way past each sample avoids knot ties
                    let v = dx * (i as f64 + 0.25);
                    let s = kv.guess_segment(v);
                    let t = kv.knots();
                    assert!(t[s] <= v && v < t[s + 1], "order {order} periodic {periodic}");
                }
            }
        }
    }
}
