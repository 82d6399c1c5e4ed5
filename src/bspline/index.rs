//! Mapping from the local basis slots of a segment to control point indices.
use super::Position;

/// Shape of one axis as seen by index mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AxisLayout {
    pub order: usize,

    /// Number of control points along the axis
    pub count: usize,

    pub periodic: bool,
}

/// Control point index along one axis for local basis slot `local` (`0..=order`)
/// of a located segment.
///
/// Coordinates clamped below or above an aperiodic range use the first or
/// last `order + 1` control points. Periodic indices wrap around `count`.
#[inline]
pub fn control_point_index(
    local: usize,
    segment: usize,
    position: Position,
    layout: AxisLayout,
) -> usize {
    let offset = match position {
        Position::Below => 0,
        Position::Above => layout.count.saturating_sub(layout.order + 1),
        Position::Inside => segment - layout.order,
    };
    let i = local + offset;
    if layout.periodic {
        i % layout.count
    } else {
        i
    }
}
