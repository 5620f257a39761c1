//! Digital lines for arbitrary integer directions
//!
//! A digital line is the sequence of pixel offsets visited when walking from
//! the origin along a direction vector. The walk takes exactly one unit step
//! per element along the *dominant axis* (the axis with the largest absolute
//! component) and moves every other axis by the accumulated error of its
//! slope, rounded half away from zero. That rounding makes the walk along
//! `-d` the exact negation of the walk along `d`.
//!
//! Only axis-aligned and diagonal directions give a walk whose steps are all
//! the same. Any other slope alternates between steps, so a window slid along
//! the line covers different offsets at different positions.

use crate::{MorphError, MorphResult};
use ndmorph_core::{Offset, Size};

/// Dominant axis of a direction and the absolute value of its component
///
/// Ties go to the lowest axis.
///
/// # Errors
///
/// Returns [`MorphError::DegenerateDirection`] for the zero vector.
pub fn dominant_axis<const D: usize>(direction: &Offset<D>) -> MorphResult<(usize, i64)> {
    let mut best: Option<(usize, i64)> = None;
    for axis in 0..D {
        let mag = direction[axis].abs();
        if mag > 0 && best.is_none_or(|(_, b)| mag > b) {
            best = Some((axis, mag));
        }
    }
    best.ok_or_else(|| MorphError::DegenerateDirection(direction.to_string()))
}

/// Whether every step of the walk along `direction` is the same offset
///
/// True when each component is zero or equal in magnitude to the dominant
/// one: axis-aligned and diagonal directions.
pub fn is_regular_direction<const D: usize>(direction: &Offset<D>) -> bool {
    let major = direction.max_abs();
    major > 0 && (0..D).all(|i| direction[i] == 0 || direction[i].abs() == major)
}

/// Integer division rounding half away from zero; `den` must be positive
#[inline]
fn round_div(num: i64, den: i64) -> i64 {
    if num >= 0 {
        (2 * num + den) / (2 * den)
    } else {
        -((-2 * num + den) / (2 * den))
    }
}

/// Integer division rounding up in magnitude; `den` must be positive
#[inline]
fn ceil_div(num: i64, den: i64) -> i64 {
    (num + den - 1) / den
}

/// Offset reached after `step` unit steps along the dominant axis
#[inline]
fn step_offset<const D: usize>(
    direction: &Offset<D>,
    axis: usize,
    major: i64,
    step: i64,
) -> Offset<D> {
    let mut out = Offset::zero();
    for i in 0..D {
        out[i] = if i == axis {
            step * direction[i].signum()
        } else {
            round_div(step * direction[i], major)
        };
    }
    out
}

/// Rasterize `length` offsets along `direction`, starting at the origin
///
/// Consecutive offsets differ by exactly one on the dominant axis and by at
/// most one on every other axis.
///
/// # Errors
///
/// Returns [`MorphError::DegenerateDirection`] for the zero vector.
///
/// # Examples
///
/// ```
/// use ndmorph_core::Index;
/// use ndmorph_morph::bresenham::build_line;
///
/// let line = build_line(&Index([2, 1]), 4).unwrap();
/// assert_eq!(line, vec![Index([0, 0]), Index([1, 1]), Index([2, 1]), Index([3, 2])]);
/// ```
pub fn build_line<const D: usize>(
    direction: &Offset<D>,
    length: usize,
) -> MorphResult<Vec<Offset<D>>> {
    let (axis, major) = dominant_axis(direction)?;
    Ok((0..length as i64)
        .map(|step| step_offset(direction, axis, major, step))
        .collect())
}

/// Rasterize a segment of odd `length` centered on the origin
///
/// Returns the offsets for steps `-r..=r` with `r = length / 2`.
///
/// # Errors
///
/// Returns [`MorphError::DegenerateDirection`] for the zero vector.
pub fn centered_segment<const D: usize>(
    direction: &Offset<D>,
    length: usize,
) -> MorphResult<Vec<Offset<D>>> {
    let (axis, major) = dominant_axis(direction)?;
    let r = (length / 2) as i64;
    Ok((-r..=r)
        .map(|step| step_offset(direction, axis, major, step))
        .collect())
}

/// Per-axis reach of a window of odd `length` anywhere on a digital line
///
/// Rounding makes `line[k + t] - line[k]` depend on `k` for sloped
/// directions, so the minor axes use the ceiling of the slope times the
/// half-length. For regular directions this is exactly the half-length on
/// every non-zero axis.
///
/// # Errors
///
/// Returns [`MorphError::DegenerateDirection`] for the zero vector.
pub fn segment_reach<const D: usize>(
    direction: &Offset<D>,
    length: usize,
) -> MorphResult<Size<D>> {
    let (axis, major) = dominant_axis(direction)?;
    let half = (length / 2) as i64;
    let mut reach = [0usize; D];
    for (i, r) in reach.iter_mut().enumerate() {
        *r = if i == axis {
            half as usize
        } else {
            ceil_div(half * direction[i].abs(), major) as usize
        };
    }
    Ok(Size(reach))
}
