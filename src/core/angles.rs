//! Joint angle calculation
//!
//! Measures the interior angle at a vertex joint from the two bone directions
//! leaving it, using `atan2` on each direction rather than a dot product so
//! that coincident points resolve to 0 instead of needing a special case.

use crate::models::pose::Landmark;

/// Interior angle at `vertex` in whole degrees, always within `[0, 180]`.
///
/// `first` and `last` are the joints at either end of the two bones, e.g.
/// hip and ankle around a knee. Only `x` and `y` are used.
pub fn joint_angle(first: &Landmark, vertex: &Landmark, last: &Landmark) -> i32 {
    let to_last = direction(vertex, last);
    let to_first = direction(vertex, first);

    // Rounding is symmetric about zero so swapping the end points cannot
    // change the result
    let mut degrees = (to_last - to_first).to_degrees().round() as i32;

    if degrees < 0 {
        degrees = degrees.abs();
    }
    if degrees > 180 {
        degrees = 360 - degrees;
    }

    degrees
}

fn direction(from: &Landmark, to: &Landmark) -> f64 {
    let dy = f64::from(to.y) - f64::from(from.y);
    let dx = f64::from(to.x) - f64::from(from.x);
    dy.atan2(dx)
}
