//! Image - dense N-dimensional pixel buffer
//!
//! An [`Image`] owns one pixel per index of its *buffered region*, stored
//! with axis 0 varying fastest. It also carries a *requested region*: the
//! part of the buffer a downstream filter is asked to read. It defaults to
//! the whole buffer.
//!
//! # Ownership model
//!
//! Images are plain owned values. Filters borrow their input immutably and
//! write into disjoint [`ImageViewMut`] slabs of the output, which is what
//! lets workers run on separate threads without locking.

use crate::error::{Error, Result};
use crate::pixel::Pixel;
use crate::region::{Index, Region};

/// Dense N-dimensional image
///
/// # Examples
///
/// ```
/// use ndmorph_core::{Image, Index, Region, Size};
///
/// let region = Region::from_size(Size([4, 3]));
/// let mut img = Image::<u8, 2>::allocate(region);
/// img.set_pixel(&Index([1, 2]), 7).unwrap();
/// assert_eq!(img.get_pixel(&Index([1, 2])), Some(7));
/// assert_eq!(img.get_pixel(&Index([4, 0])), None);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Image<T, const D: usize> {
    /// Region covered by `data`
    buffered: Region<D>,
    /// Region downstream filters read from
    requested: Region<D>,
    /// Pixel data, axis 0 fastest
    data: Vec<T>,
}

impl<T: Pixel, const D: usize> Image<T, D> {
    /// Allocate an image over `region` with every pixel set to `T::default()`
    pub fn allocate(region: Region<D>) -> Self {
        Self::new_filled(region, T::default())
    }

    /// Allocate an image over `region` with every pixel set to `value`
    pub fn new_filled(region: Region<D>, value: T) -> Self {
        Self {
            buffered: region,
            requested: region,
            data: vec![value; region.number_of_pixels()],
        }
    }

    /// Create an image from raw data laid out over `region`
    ///
    /// # Errors
    ///
    /// Returns [`Error::DataLengthMismatch`] if `data` does not hold exactly
    /// one pixel per index of `region`.
    pub fn from_vec(region: Region<D>, data: Vec<T>) -> Result<Self> {
        let expected = region.number_of_pixels();
        if data.len() != expected {
            return Err(Error::DataLengthMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            buffered: region,
            requested: region,
            data,
        })
    }

    /// Create an image by evaluating `f` at every index of `region`
    pub fn from_fn(region: Region<D>, mut f: impl FnMut(Index<D>) -> T) -> Self {
        let data = region.iter().map(&mut f).collect();
        Self {
            buffered: region,
            requested: region,
            data,
        }
    }

    /// Region covered by the pixel buffer
    #[inline]
    pub fn buffered_region(&self) -> Region<D> {
        self.buffered
    }

    /// Region downstream filters should read
    #[inline]
    pub fn requested_region(&self) -> Region<D> {
        self.requested
    }

    /// Restrict the region downstream filters read
    ///
    /// # Errors
    ///
    /// Returns [`Error::RequestedRegionOutside`] if `region` is not inside
    /// the buffered region.
    pub fn set_requested_region(&mut self, region: Region<D>) -> Result<()> {
        if !self.buffered.contains_region(&region) {
            return Err(Error::RequestedRegionOutside {
                requested: region.to_string(),
                buffered: self.buffered.to_string(),
            });
        }
        self.requested = region;
        Ok(())
    }

    /// Get a pixel, or `None` outside the buffered region
    #[inline]
    pub fn get_pixel(&self, idx: &Index<D>) -> Option<T> {
        if self.buffered.contains_index(idx) {
            Some(self.data[self.buffered.linear_offset(idx)])
        } else {
            None
        }
    }

    /// Set a pixel
    ///
    /// # Errors
    ///
    /// Returns [`Error::IndexOutOfBounds`] outside the buffered region.
    pub fn set_pixel(&mut self, idx: &Index<D>, value: T) -> Result<()> {
        if !self.buffered.contains_index(idx) {
            return Err(Error::IndexOutOfBounds {
                index: idx.to_string(),
                region: self.buffered.to_string(),
            });
        }
        let offset = self.buffered.linear_offset(idx);
        self.data[offset] = value;
        Ok(())
    }

    /// Read a pixel the caller already knows is buffered
    ///
    /// # Panics
    ///
    /// Panics if `idx` is outside the buffered region.
    #[inline]
    pub fn pixel_at(&self, idx: &Index<D>) -> T {
        self.data[self.buffered.linear_offset(idx)]
    }

    /// Write a pixel the caller already knows is buffered
    ///
    /// # Panics
    ///
    /// Panics if `idx` is outside the buffered region.
    #[inline]
    pub fn set_pixel_at(&mut self, idx: &Index<D>, value: T) {
        let offset = self.buffered.linear_offset(idx);
        self.data[offset] = value;
    }

    /// Set every pixel to `value`
    pub fn fill_buffer(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Raw pixel data (axis 0 fastest)
    #[inline]
    pub fn data(&self) -> &[T] {
        &self.data
    }

    /// Mutable raw pixel data (axis 0 fastest)
    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Consume the image and return its pixel data
    pub fn into_vec(self) -> Vec<T> {
        self.data
    }

    /// Apply `f` to every pixel, producing a new image over the same regions
    pub fn map<U: Pixel>(&self, f: impl Fn(T) -> U) -> Image<U, D> {
        Image {
            buffered: self.buffered,
            requested: self.requested,
            data: self.data.iter().map(|&v| f(v)).collect(),
        }
    }

    /// Combine two images pixel by pixel
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegion`] if the buffered regions differ.
    pub fn zip_map<U: Pixel>(
        &self,
        other: &Image<T, D>,
        f: impl Fn(T, T) -> U,
    ) -> Result<Image<U, D>> {
        if self.buffered != other.buffered {
            return Err(Error::InvalidRegion(format!(
                "buffered regions differ: {} vs {}",
                self.buffered, other.buffered
            )));
        }
        Ok(Image {
            buffered: self.buffered,
            requested: self.requested,
            data: self
                .data
                .iter()
                .zip(&other.data)
                .map(|(&a, &b)| f(a, b))
                .collect(),
        })
    }

    /// Mutable view over the whole buffer
    pub fn view_mut(&mut self) -> ImageViewMut<'_, T, D> {
        ImageViewMut {
            region: self.buffered,
            data: &mut self.data,
        }
    }

    /// Split the buffer into disjoint mutable views
    ///
    /// `pieces` must be consecutive slabs along the last axis that together
    /// cover the buffered region, in increasing order. Each slab spans the
    /// full buffered extent on every other axis, which makes its pixels a
    /// contiguous run of the buffer.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidRegion`] if the pieces are not such a tiling.
    pub fn split_views_mut(&mut self, pieces: &[Region<D>]) -> Result<Vec<ImageViewMut<'_, T, D>>> {
        if D == 0 {
            return Err(Error::InvalidRegion(
                "cannot split a zero-dimensional image".to_string(),
            ));
        }
        let last = D - 1;
        let buffered = self.buffered;
        let mut cursor = buffered.index()[last];
        let mut rest: &mut [T] = &mut self.data;
        let mut views = Vec::with_capacity(pieces.len());

        for piece in pieces {
            let spans_other_axes = (0..last).all(|axis| {
                piece.index()[axis] == buffered.index()[axis]
                    && piece.size()[axis] == buffered.size()[axis]
            });
            let piece_end = cursor + piece.size()[last] as i64;
            if !spans_other_axes
                || piece.index()[last] != cursor
                || piece_end > buffered.upper()[last]
            {
                return Err(Error::InvalidRegion(format!(
                    "piece {piece} is not the next slab of {buffered}"
                )));
            }
            let (head, tail) = std::mem::take(&mut rest).split_at_mut(piece.number_of_pixels());
            views.push(ImageViewMut {
                region: *piece,
                data: head,
            });
            rest = tail;
            cursor = piece_end;
        }

        if cursor != buffered.upper()[last] {
            return Err(Error::InvalidRegion(format!(
                "pieces end at {cursor} but {buffered} ends at {}",
                buffered.upper()[last]
            )));
        }
        Ok(views)
    }
}

/// Mutable view over the pixels of one region of an image
///
/// Created by [`Image::view_mut`] or [`Image::split_views_mut`]. The view's
/// region is the output sub-region a worker owns exclusively.
#[derive(Debug)]
pub struct ImageViewMut<'a, T, const D: usize> {
    region: Region<D>,
    data: &'a mut [T],
}

impl<T: Pixel, const D: usize> ImageViewMut<'_, T, D> {
    /// Region covered by this view
    #[inline]
    pub fn region(&self) -> Region<D> {
        self.region
    }

    /// Read a pixel inside the view's region
    ///
    /// # Panics
    ///
    /// Panics if `idx` is outside the view's region.
    #[inline]
    pub fn pixel_at(&self, idx: &Index<D>) -> T {
        self.data[self.region.linear_offset(idx)]
    }

    /// Write a pixel inside the view's region
    ///
    /// # Panics
    ///
    /// Panics if `idx` is outside the view's region.
    #[inline]
    pub fn set_pixel_at(&mut self, idx: &Index<D>, value: T) {
        let offset = self.region.linear_offset(idx);
        self.data[offset] = value;
    }

    /// Raw pixel data of the view (axis 0 fastest)
    #[inline]
    pub fn data(&self) -> &[T] {
        self.data
    }

    /// Mutable raw pixel data of the view (axis 0 fastest)
    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::region::Size;

    #[test]
    fn test_allocate_and_access() {
        let region = Region::new(Index([2, -1]), Size([3, 2]));
        let mut img = Image::<i32, 2>::allocate(region);
        assert_eq!(img.data().len(), 6);
        assert!(img.data().iter().all(|&v| v == 0));

        img.set_pixel(&Index([4, 0]), 9).unwrap();
        assert_eq!(img.get_pixel(&Index([4, 0])), Some(9));
        assert_eq!(img.pixel_at(&Index([4, 0])), 9);
        assert_eq!(img.get_pixel(&Index([5, 0])), None);
        assert!(img.set_pixel(&Index([0, 0]), 1).is_err());
    }

    #[test]
    fn test_from_vec_length_check() {
        let region = Region::from_size(Size([2, 2]));
        assert!(Image::<u8, 2>::from_vec(region, vec![1, 2, 3]).is_err());
        let img = Image::<u8, 2>::from_vec(region, vec![1, 2, 3, 4]).unwrap();
        assert_eq!(img.pixel_at(&Index([1, 1])), 4);
    }

    #[test]
    fn test_fill_buffer() {
        let mut img = Image::<u8, 3>::allocate(Region::from_size(Size([2, 2, 2])));
        img.fill_buffer(17);
        assert!(img.data().iter().all(|&v| v == 17));
    }

    #[test]
    fn test_requested_region() {
        let mut img = Image::<u8, 2>::allocate(Region::from_size(Size([10, 10])));
        assert_eq!(img.requested_region(), img.buffered_region());
        let inner = Region::new(Index([2, 2]), Size([5, 5]));
        img.set_requested_region(inner).unwrap();
        assert_eq!(img.requested_region(), inner);
        let outside = Region::new(Index([8, 8]), Size([5, 5]));
        assert!(img.set_requested_region(outside).is_err());
    }

    #[test]
    fn test_split_views_mut() {
        let region = Region::from_size(Size([3, 4]));
        let mut img = Image::<u16, 2>::allocate(region);
        let pieces = [
            Region::new(Index([0, 0]), Size([3, 1])),
            Region::new(Index([0, 1]), Size([3, 3])),
        ];
        {
            let mut views = img.split_views_mut(&pieces).unwrap();
            assert_eq!(views.len(), 2);
            for (n, view) in views.iter_mut().enumerate() {
                let r = view.region();
                for idx in r.iter() {
                    view.set_pixel_at(&idx, n as u16 + 1);
                }
            }
        }
        assert_eq!(img.pixel_at(&Index([2, 0])), 1);
        assert_eq!(img.pixel_at(&Index([0, 1])), 2);
        assert_eq!(img.pixel_at(&Index([2, 3])), 2);
    }

    #[test]
    fn test_split_views_rejects_gaps() {
        let mut img = Image::<u16, 2>::allocate(Region::from_size(Size([3, 4])));
        let gap = [
            Region::new(Index([0, 0]), Size([3, 1])),
            Region::new(Index([0, 2]), Size([3, 2])),
        ];
        assert!(img.split_views_mut(&gap).is_err());
        let short = [Region::new(Index([0, 0]), Size([3, 3]))];
        assert!(img.split_views_mut(&short).is_err());
        let narrow = [Region::new(Index([0, 0]), Size([2, 4]))];
        assert!(img.split_views_mut(&narrow).is_err());
    }

    #[test]
    fn test_map_and_zip() {
        let region = Region::from_size(Size([2, 2]));
        let a = Image::<u8, 2>::from_vec(region, vec![1, 2, 3, 4]).unwrap();
        let inv = a.map(|v| 255 - v);
        assert_eq!(inv.data(), &[254, 253, 252, 251]);
        let sum = a.zip_map(&a, |x, y| x as u16 + y as u16).unwrap();
        assert_eq!(sum.data(), &[2, 4, 6, 8]);
    }
}
