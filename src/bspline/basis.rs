//! Cox-de Boor evaluation of the nonzero basis functions of one segment.
use alloc::vec;
use alloc::vec::Vec;

use num_traits::Float;

use super::KnotVector;

/// Evaluate the `degree + 1` basis functions of `degree` that are nonzero on
/// knot interval `segment`, at `x`.
///
/// Results land in `out[order - degree..=order]`; the rest of `out[..=order]`
/// is zeroed. Slot `l` belongs to basis function `segment - order + l`.
/// Knot intervals of zero width contribute zero instead of dividing by zero.
///
/// Assumes `degree <= order <= segment` and `segment + order < knots.len()`.
#[inline]
pub(crate) fn cox_de_boor<T: Float>(
    knots: &[T],
    order: usize,
    segment: usize,
    x: T,
    degree: usize,
    out: &mut [T],
) {
    let out = &mut out[..=order];
    out.fill(T::zero());
    out[order] = T::one();

    for i in 1..=degree {
        let begin = order - i;
        for j in 0..=i {
            let idx = begin + j;
            let left = segment + j - i;
            let right = segment + j + 1;

            let rising = if j == 0 {
                T::zero()
            } else {
                out[idx] * ratio(x - knots[left], knots[right - 1] - knots[left])
            };
            let falling = if idx == order {
                T::zero()
            } else {
                out[idx + 1] * ratio(knots[right] - x, knots[right] - knots[left + 1])
            };
            out[idx] = rising + falling;
        }
    }
}

#[inline]
fn ratio<T: Float>(num: T, den: T) -> T {
    if den == T::zero() {
        T::zero()
    } else {
        num / den
    }
}

/// Inputs of the most recent basis evaluation
#[derive(Debug, Clone, Copy, PartialEq)]
struct BasisKey<T> {
    axis: usize,
    segment: usize,
    x: T,
    degree: usize,
}

/// Single-entry memo of basis values.
///
/// Repeated requests for the same `(axis, segment, x, degree)` return the
/// stored values without recomputing them. The key does not identify the
/// knots, so one cache should serve one spline (or one fitting pass) at a time.
#[derive(Debug, Clone)]
pub struct BasisCache<T> {
    key: Option<BasisKey<T>>,
    values: Vec<T>,
}

impl<T: Float> Default for BasisCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Float> BasisCache<T> {
    pub fn new() -> Self {
        Self {
            key: None,
            values: Vec::new(),
        }
    }

    /// Values of the most recent evaluation, if any.
    pub fn last(&self) -> Option<&[T]> {
        self.key.map(|_| &self.values[..])
    }

    /// Forget the stored values.
    pub fn clear(&mut self) {
        self.key = None;
    }

    /// Basis values for `(axis, segment, x, degree)` on `knots`, computed only
    /// if the request differs from the previous one.
    pub fn get_or_compute(
        &mut self,
        axis: usize,
        knots: &KnotVector<T>,
        segment: usize,
        x: T,
        degree: usize,
    ) -> &[T] {
        let key = BasisKey {
            axis,
            segment,
            x,
            degree,
        };
        if self.key != Some(key) {
            let width = knots.order() + 1;
            if self.values.len() != width {
                self.values = vec![T::zero(); width];
            }
            knots.basis_into(segment, x, degree, &mut self.values);
            self.key = Some(key);
        }
        &self.values
    }
}
