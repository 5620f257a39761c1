//! ndmorph-test - Regression test framework for ndmorph
//!
//! This crate provides [`RegParams`], which counts comparisons and collects
//! failures so a regression test reports everything that went wrong before
//! asserting once, plus deterministic generators for test images and
//! sequences.
//!
//! # Usage
//!
//! ```
//! use ndmorph_core::Size;
//! use ndmorph_test::{RegParams, random_image};
//!
//! let img = random_image::<u8, 2>(Size([16, 16]), 7, 0..=255);
//! let mut rp = RegParams::new("example");
//! rp.compare_values(256.0, img.data().len() as f64, 0.0);
//! assert!(rp.cleanup());
//! ```

mod error;
mod params;

pub use error::{TestError, TestResult};
pub use params::RegParams;

use ndmorph_core::{Image, Pixel, Region, Size};
use rand::distr::uniform::SampleUniform;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::RangeInclusive;

/// Seeded random generator used by every helper in this crate
pub fn rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Image over `[0, size)` with pixels drawn uniformly from `range`
pub fn random_image<T, const D: usize>(
    size: Size<D>,
    seed: u64,
    range: RangeInclusive<T>,
) -> Image<T, D>
where
    T: Pixel + SampleUniform,
{
    let mut rng = rng(seed);
    Image::from_fn(Region::from_size(size), |_| rng.random_range(range.clone()))
}

/// Image over `[0, size)` with every pixel set to `value`
pub fn constant_image<T: Pixel, const D: usize>(size: Size<D>, value: T) -> Image<T, D> {
    Image::new_filled(Region::from_size(size), value)
}

/// Image over `[0, size)` from raw data, axis 0 fastest
///
/// # Errors
///
/// Returns [`TestError::ImageBuild`] if `data` does not match `size`.
pub fn image_from_data<T: Pixel, const D: usize>(
    size: Size<D>,
    data: Vec<T>,
) -> TestResult<Image<T, D>> {
    Ok(Image::from_vec(Region::from_size(size), data)?)
}

/// Random integer sequence of length `len` with values in `range`
pub fn random_sequence(len: usize, seed: u64, range: RangeInclusive<i32>) -> Vec<i32> {
    let mut rng = rng(seed);
    (0..len).map(|_| rng.random_range(range.clone())).collect()
}
