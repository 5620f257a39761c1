//! Flat structuring elements and their line decomposition
//!
//! A [`FlatKernel`] is a boolean neighborhood over `[-r, r]` on every axis.
//! Kernels built from axis-aligned or diagonal lines (boxes and most
//! [`FlatKernel::from_lines`] kernels) are *decomposable*: sequentially
//! applying a 1-D min or max along each line is equivalent to applying the
//! whole neighborhood, because the neighborhood is the Minkowski sum of the
//! line segments. Other shapes only support the brute-force algorithm.

use crate::bresenham::{centered_segment, is_regular_direction, segment_reach};
use crate::{MorphError, MorphResult};
use ndmorph_core::{Index, Offset, Region, Size};
use std::collections::BTreeSet;

/// One line of a kernel decomposition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KernelLine<const D: usize> {
    /// Direction to rasterize; never the zero vector
    pub direction: Offset<D>,
    /// Number of pixels in the line; always odd
    pub length: usize,
}

/// Natural pixel count of a line spanning `vector`
///
/// The line takes one pixel per unit step along its dominant axis.
pub fn line_pixels<const D: usize>(vector: &Offset<D>) -> usize {
    vector.max_abs() as usize + 1
}

/// Force a line length to be odd so it has a center pixel
#[inline]
pub fn odd_length(len: usize) -> usize {
    if len % 2 == 0 { len + 1 } else { len }
}

/// Flat (boolean) structuring element
///
/// # Examples
///
/// ```
/// use ndmorph_core::Size;
/// use ndmorph_morph::FlatKernel;
///
/// let kernel = FlatKernel::<2>::box_kernel(Size([2, 1]));
/// assert!(kernel.is_decomposable());
/// assert_eq!(kernel.offsets().len(), 15);
/// assert_eq!(kernel.decompose().unwrap().len(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlatKernel<const D: usize> {
    radius: Size<D>,
    /// Neighborhood laid out over `neighborhood_region()`, axis 0 fastest
    mask: Vec<bool>,
    /// Line vectors when the kernel is decomposable
    lines: Option<Vec<Offset<D>>>,
}

impl<const D: usize> FlatKernel<D> {
    /// Create an axis-aligned box of the given radius
    ///
    /// Decomposes into one line per axis with a non-zero radius.
    pub fn box_kernel(radius: Size<D>) -> Self {
        let side = Size(radius.0.map(|r| 2 * r + 1));
        let lines = (0..D)
            .filter(|&axis| radius[axis] > 0)
            .map(|axis| {
                let mut v = Offset::zero();
                v[axis] = 2 * radius[axis] as i64;
                v
            })
            .collect();
        Self {
            radius,
            mask: vec![true; side.product()],
            lines: Some(lines),
        }
    }

    /// Create a kernel from line vectors
    ///
    /// Each vector spans a whole line segment centered on the origin; the
    /// kernel is the Minkowski sum of all segments. An empty list gives the
    /// single-pixel identity kernel.
    ///
    /// The kernel is decomposable when every vector is axis-aligned or
    /// diagonal. A sloped vector still defines the mask, but a window slid
    /// along its digital line does not cover a fixed neighborhood, so such a
    /// kernel only runs on the brute-force algorithm.
    ///
    /// # Errors
    ///
    /// Returns [`MorphError::InvalidKernel`] if any vector is zero.
    pub fn from_lines(lines: Vec<Offset<D>>) -> MorphResult<Self> {
        if let Some(zero) = lines.iter().position(Index::is_zero) {
            return Err(MorphError::InvalidKernel(format!(
                "line {} is the zero vector",
                zero + 1
            )));
        }

        let mut radius = Size::<D>::default();
        let mut points: BTreeSet<Offset<D>> = BTreeSet::from([Offset::zero()]);
        for v in &lines {
            let len = odd_length(line_pixels(v));
            let reach = segment_reach(v, len)?;
            for axis in 0..D {
                radius.0[axis] += reach[axis];
            }
            let segment = centered_segment(v, len)?;
            points = points
                .iter()
                .flat_map(|&p| segment.iter().map(move |&s| p + s))
                .collect();
        }

        let region = neighborhood_region(&radius);
        let mut mask = vec![false; region.number_of_pixels()];
        for p in &points {
            mask[region.linear_offset(p)] = true;
        }
        let regular = lines.iter().all(is_regular_direction);
        Ok(Self {
            radius,
            mask,
            lines: regular.then_some(lines),
        })
    }

    /// Create a cross: the center plus the axis arms of length `radius`
    ///
    /// Not decomposable.
    pub fn cross(radius: usize) -> Self {
        let radius = Size::filled(radius);
        Self::from_predicate(radius, |p| (0..D).filter(|&axis| p[axis] != 0).count() <= 1)
    }

    /// Create an ellipsoidal ball with the given per-axis radius
    ///
    /// Not decomposable.
    pub fn ball(radius: Size<D>) -> Self {
        Self::from_predicate(radius, |p| {
            let mut dist = 0.0f64;
            for axis in 0..D {
                if radius[axis] == 0 {
                    continue;
                }
                let t = p[axis] as f64 / radius[axis] as f64;
                dist += t * t;
            }
            dist <= 1.0
        })
    }

    /// Create a kernel from an explicit mask over `[-radius, radius]`
    ///
    /// Not decomposable.
    ///
    /// # Errors
    ///
    /// Returns [`MorphError::InvalidKernel`] if the mask length does not
    /// match the neighborhood size.
    pub fn from_mask(radius: Size<D>, mask: Vec<bool>) -> MorphResult<Self> {
        let expected = neighborhood_region(&radius).number_of_pixels();
        if mask.len() != expected {
            return Err(MorphError::InvalidKernel(format!(
                "mask has {} entries, radius {} needs {}",
                mask.len(),
                radius,
                expected
            )));
        }
        Ok(Self {
            radius,
            mask,
            lines: None,
        })
    }

    fn from_predicate(radius: Size<D>, keep: impl Fn(&Offset<D>) -> bool) -> Self {
        let region = neighborhood_region(&radius);
        Self {
            radius,
            mask: region.iter().map(|p| keep(&p)).collect(),
            lines: None,
        }
    }

    /// Per-axis reach of the neighborhood
    #[inline]
    pub fn radius(&self) -> Size<D> {
        self.radius
    }

    /// Region spanned by the neighborhood, centered on the origin
    pub fn neighborhood_region(&self) -> Region<D> {
        neighborhood_region(&self.radius)
    }

    /// Raw neighborhood mask laid out over [`Self::neighborhood_region`]
    pub fn mask(&self) -> &[bool] {
        &self.mask
    }

    /// Offsets of the active neighborhood pixels
    pub fn offsets(&self) -> Vec<Offset<D>> {
        self.neighborhood_region()
            .iter()
            .zip(&self.mask)
            .filter_map(|(p, &on)| on.then_some(p))
            .collect()
    }

    /// Whether the kernel has a line decomposition
    #[inline]
    pub fn is_decomposable(&self) -> bool {
        self.lines.is_some()
    }

    /// Line vectors of a decomposable kernel
    pub fn lines(&self) -> Option<&[Offset<D>]> {
        self.lines.as_deref()
    }

    /// Decompose into ordered 1-D lines with odd lengths
    ///
    /// A line whose natural pixel count is even is lengthened by one.
    ///
    /// # Errors
    ///
    /// Returns [`MorphError::NotDecomposable`] for kernels without a line
    /// decomposition.
    pub fn decompose(&self) -> MorphResult<Vec<KernelLine<D>>> {
        let lines = self.lines.as_ref().ok_or(MorphError::NotDecomposable)?;
        Ok(lines
            .iter()
            .map(|v| KernelLine {
                direction: *v,
                length: odd_length(line_pixels(v)),
            })
            .collect())
    }
}

fn neighborhood_region<const D: usize>(radius: &Size<D>) -> Region<D> {
    Region::new(
        Index(radius.0.map(|r| -(r as i64))),
        Size(radius.0.map(|r| 2 * r + 1)),
    )
}
