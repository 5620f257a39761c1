//! Index, Size, Region - N-dimensional image geometry
//!
//! These are small `Copy` types parameterized by the image dimension `D`.
//! Axis 0 is the fastest-varying axis in every linear layout used by this
//! crate, so for a 2-D image axis 0 is `x` and axis 1 is `y`.

use std::fmt;
use std::ops::{Add, Neg, Sub};

/// Signed N-dimensional pixel index
///
/// Also used as an index delta; see [`Offset`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Index<const D: usize>(pub [i64; D]);

/// Index delta. Offsets and indices share one representation.
pub type Offset<const D: usize> = Index<D>;

impl<const D: usize> Index<D> {
    /// The origin (all components zero)
    pub const fn zero() -> Self {
        Self([0; D])
    }

    /// Create an index with every component set to `value`
    pub const fn filled(value: i64) -> Self {
        Self([value; D])
    }

    /// Check whether every component is zero
    #[inline]
    pub fn is_zero(&self) -> bool {
        self.0.iter().all(|&c| c == 0)
    }

    /// Component-wise absolute value
    pub fn abs(&self) -> Self {
        Self(self.0.map(i64::abs))
    }

    /// Largest absolute component
    pub fn max_abs(&self) -> i64 {
        self.0.iter().map(|c| c.abs()).max().unwrap_or(0)
    }
}

impl<const D: usize> Default for Index<D> {
    fn default() -> Self {
        Self::zero()
    }
}

impl<const D: usize> From<[i64; D]> for Index<D> {
    fn from(value: [i64; D]) -> Self {
        Self(value)
    }
}

impl<const D: usize> std::ops::Index<usize> for Index<D> {
    type Output = i64;

    #[inline]
    fn index(&self, axis: usize) -> &i64 {
        &self.0[axis]
    }
}

impl<const D: usize> std::ops::IndexMut<usize> for Index<D> {
    #[inline]
    fn index_mut(&mut self, axis: usize) -> &mut i64 {
        &mut self.0[axis]
    }
}

impl<const D: usize> Add for Index<D> {
    type Output = Self;

    #[inline]
    fn add(self, rhs: Self) -> Self {
        let mut out = self.0;
        for (o, r) in out.iter_mut().zip(rhs.0) {
            *o += r;
        }
        Self(out)
    }
}

impl<const D: usize> Sub for Index<D> {
    type Output = Self;

    #[inline]
    fn sub(self, rhs: Self) -> Self {
        let mut out = self.0;
        for (o, r) in out.iter_mut().zip(rhs.0) {
            *o -= r;
        }
        Self(out)
    }
}

impl<const D: usize> Neg for Index<D> {
    type Output = Self;

    #[inline]
    fn neg(self) -> Self {
        Self(self.0.map(|c| -c))
    }
}

impl<const D: usize> fmt::Display for Index<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{c}")?;
        }
        write!(f, "]")
    }
}

/// Non-negative N-dimensional extent
///
/// Also used for per-axis kernel radii.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Size<const D: usize>(pub [usize; D]);

impl<const D: usize> Size<D> {
    /// Create a size with every component set to `value`
    pub const fn filled(value: usize) -> Self {
        Self([value; D])
    }

    /// Product of all extents
    pub fn product(&self) -> usize {
        self.0.iter().product()
    }

    /// Sum of all extents
    pub fn sum(&self) -> usize {
        self.0.iter().sum()
    }

    /// Largest extent
    pub fn max(&self) -> usize {
        self.0.iter().copied().max().unwrap_or(0)
    }
}

impl<const D: usize> Default for Size<D> {
    fn default() -> Self {
        Self([0; D])
    }
}

impl<const D: usize> From<[usize; D]> for Size<D> {
    fn from(value: [usize; D]) -> Self {
        Self(value)
    }
}

impl<const D: usize> std::ops::Index<usize> for Size<D> {
    type Output = usize;

    #[inline]
    fn index(&self, axis: usize) -> &usize {
        &self.0[axis]
    }
}

impl<const D: usize> fmt::Display for Size<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, c) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, "x")?;
            }
            write!(f, "{c}")?;
        }
        Ok(())
    }
}

/// An axis-aligned N-dimensional region
///
/// A region is an origin index plus a non-negative size. The upper bound
/// on each axis is exclusive. Regions are small `Copy` values; every
/// operation returns a new region rather than mutating in place.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region<const D: usize> {
    index: Index<D>,
    size: Size<D>,
}

impl<const D: usize> Region<D> {
    /// Create a region from an origin and a size
    pub const fn new(index: Index<D>, size: Size<D>) -> Self {
        Self { index, size }
    }

    /// Create a region anchored at the origin
    pub const fn from_size(size: Size<D>) -> Self {
        Self {
            index: Index::zero(),
            size,
        }
    }

    /// Create a region from inclusive lower and exclusive upper corners
    ///
    /// Axes where `upper <= lower` get size zero.
    pub fn from_bounds(lower: Index<D>, upper: Index<D>) -> Self {
        let mut size = [0usize; D];
        for (axis, s) in size.iter_mut().enumerate() {
            *s = (upper[axis] - lower[axis]).max(0) as usize;
        }
        Self {
            index: lower,
            size: Size(size),
        }
    }

    /// Origin of the region
    #[inline]
    pub fn index(&self) -> Index<D> {
        self.index
    }

    /// Extent of the region
    #[inline]
    pub fn size(&self) -> Size<D> {
        self.size
    }

    /// Exclusive upper corner
    pub fn upper(&self) -> Index<D> {
        let mut upper = self.index;
        for axis in 0..D {
            upper[axis] += self.size[axis] as i64;
        }
        upper
    }

    /// Number of pixels covered
    #[inline]
    pub fn number_of_pixels(&self) -> usize {
        self.size.product()
    }

    /// Check if the region covers no pixels
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size.0.contains(&0)
    }

    /// Check if an index lies inside the region
    #[inline]
    pub fn contains_index(&self, idx: &Index<D>) -> bool {
        (0..D).all(|axis| {
            let lo = self.index[axis];
            idx[axis] >= lo && idx[axis] < lo + self.size[axis] as i64
        })
    }

    /// Check if this region contains another region
    ///
    /// An empty region is contained in any region.
    pub fn contains_region(&self, other: &Region<D>) -> bool {
        if other.is_empty() {
            return true;
        }
        let (su, ou) = (self.upper(), other.upper());
        (0..D).all(|axis| other.index[axis] >= self.index[axis] && ou[axis] <= su[axis])
    }

    /// Grow the region symmetrically by `radius` on every axis
    pub fn pad(&self, radius: &Size<D>) -> Region<D> {
        let mut index = self.index;
        let mut size = self.size;
        for axis in 0..D {
            index[axis] -= radius[axis] as i64;
            size.0[axis] += 2 * radius[axis];
        }
        Region { index, size }
    }

    /// Intersect with `bounds`
    ///
    /// Never produces a negative size: when the regions do not overlap on
    /// some axis, the result has zero extent on that axis.
    pub fn crop(&self, bounds: &Region<D>) -> Region<D> {
        let (su, bu) = (self.upper(), bounds.upper());
        let mut lower = self.index;
        let mut upper = su;
        for axis in 0..D {
            lower[axis] = lower[axis].max(bounds.index[axis]);
            upper[axis] = upper[axis].min(bu[axis]);
        }
        Region::from_bounds(lower, upper)
    }

    /// Linear offset of `idx` in a buffer laid out over this region
    ///
    /// Axis 0 varies fastest. The index must lie inside the region.
    #[inline]
    pub fn linear_offset(&self, idx: &Index<D>) -> usize {
        debug_assert!(self.contains_index(idx), "{idx} outside {self}");
        let mut offset = 0usize;
        let mut stride = 1usize;
        for axis in 0..D {
            offset += (idx[axis] - self.index[axis]) as usize * stride;
            stride *= self.size[axis];
        }
        offset
    }

    /// Index at a linear offset in a buffer laid out over this region
    pub fn index_at(&self, mut offset: usize) -> Index<D> {
        let mut idx = self.index;
        for axis in 0..D {
            let extent = self.size[axis].max(1);
            idx[axis] += (offset % extent) as i64;
            offset /= extent;
        }
        idx
    }

    /// Iterate over all indices in buffer order (axis 0 fastest)
    pub fn iter(&self) -> RegionIter<D> {
        RegionIter {
            region: *self,
            next: 0,
            total: self.number_of_pixels(),
        }
    }
}

impl<const D: usize> fmt::Display for Region<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}+{}", self.index, self.size)
    }
}

/// Iterator over the indices of a region in buffer order
#[derive(Debug, Clone)]
pub struct RegionIter<const D: usize> {
    region: Region<D>,
    next: usize,
    total: usize,
}

impl<const D: usize> Iterator for RegionIter<D> {
    type Item = Index<D>;

    fn next(&mut self) -> Option<Index<D>> {
        if self.next >= self.total {
            return None;
        }
        let idx = self.region.index_at(self.next);
        self.next += 1;
        Some(idx)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let rest = self.total - self.next;
        (rest, Some(rest))
    }
}

impl<const D: usize> ExactSizeIterator for RegionIter<D> {}

impl<const D: usize> IntoIterator for &Region<D> {
    type Item = Index<D>;
    type IntoIter = RegionIter<D>;

    fn into_iter(self) -> RegionIter<D> {
        self.iter()
    }
}
