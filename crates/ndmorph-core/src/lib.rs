//! ndmorph core - Basic data structures for N-dimensional image filters
//!
//! This crate provides the fundamental data structures shared by the
//! ndmorph filters:
//!
//! - [`Index`] / [`Offset`] / [`Size`] - N-dimensional coordinates and extents
//! - [`Region`] - Axis-aligned regions with padding, cropping and containment
//! - [`Image`] / [`ImageViewMut`] - Dense pixel buffers and disjoint mutable views
//! - [`Pixel`] - Bound for scalar pixel types
//!
//! The image dimension is a const generic parameter, so a 3-D `u8` volume
//! is an `Image<u8, 3>`.

pub mod error;
pub mod image;
pub mod pixel;
pub mod region;

pub use error::{Error, Result};
pub use image::{Image, ImageViewMut};
pub use pixel::Pixel;
pub use region::{Index, Offset, Region, RegionIter, Size};
