//! Grayscale morphological operations
//!
//! [`GrayscaleMorphFilter`] is the front end: it picks an algorithm for the
//! kernel, runs it over the input's requested region and returns a new
//! image. The free functions build the usual composites on top of it.
//!
//! - **Dilation**: maximum over the neighborhood
//! - **Erosion**: minimum over the neighborhood
//! - **Opening**: erosion followed by dilation (removes small bright features)
//! - **Closing**: dilation followed by erosion (fills small dark features)
//! - **Gradient**: dilation minus erosion
//! - **Top-hat**: input minus opening
//! - **Bottom-hat**: closing minus input

use crate::anchor::{AnchorConfig, AnchorErodeDilate, MorphOp};
use crate::basic::BasicErodeDilate;
use crate::kernel::FlatKernel;
use crate::parallel::{ProcessingMode, execute};
use crate::MorphResult;
use ndmorph_core::{Image, Pixel, Size};
use std::ops::Sub;
use tracing::debug;

/// Erosion/dilation algorithm
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Algorithm {
    /// Scan the whole neighborhood for every pixel; any kernel
    Basic,
    /// Sliding min/max along decomposed lines; decomposable kernels only
    Anchor,
}

impl Algorithm {
    /// Fastest algorithm that supports `kernel`
    pub fn for_kernel<const D: usize>(kernel: &FlatKernel<D>) -> Self {
        if kernel.is_decomposable() {
            Algorithm::Anchor
        } else {
            Algorithm::Basic
        }
    }
}

/// Grayscale erosion or dilation filter
///
/// # Examples
///
/// ```
/// use ndmorph_core::{Image, Region, Size};
/// use ndmorph_morph::{GrayscaleMorphFilter, MorphOp};
///
/// let region = Region::from_size(Size([5]));
/// let input = Image::<u8, 1>::from_vec(region, vec![5, 1, 4, 2, 3]).unwrap();
/// let eroded = GrayscaleMorphFilter::new(MorphOp::Erode).apply(&input).unwrap();
/// assert_eq!(eroded.data(), &[1, 1, 1, 2, 2]);
/// ```
#[derive(Debug, Clone)]
pub struct GrayscaleMorphFilter<T, const D: usize> {
    kernel: FlatKernel<D>,
    op: MorphOp,
    algorithm: Option<Algorithm>,
    boundary: Option<T>,
    mode: ProcessingMode,
    config: AnchorConfig,
}

impl<T: Pixel, const D: usize> GrayscaleMorphFilter<T, D> {
    /// Create a filter with a box kernel of radius 1
    pub fn new(op: MorphOp) -> Self {
        Self::with_kernel(FlatKernel::box_kernel(Size::filled(1)), op)
    }

    /// Create a filter with the given kernel
    pub fn with_kernel(kernel: FlatKernel<D>, op: MorphOp) -> Self {
        Self {
            kernel,
            op,
            algorithm: None,
            boundary: None,
            mode: ProcessingMode::default(),
            config: AnchorConfig::default(),
        }
    }

    /// Force an algorithm instead of choosing one from the kernel
    pub fn algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = Some(algorithm);
        self
    }

    /// Set the value read outside the input's requested region
    pub fn boundary(mut self, boundary: T) -> Self {
        self.boundary = Some(boundary);
        self
    }

    /// Set the execution mode
    pub fn mode(mut self, mode: ProcessingMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the anchor engine configuration
    pub fn config(mut self, config: AnchorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn kernel(&self) -> &FlatKernel<D> {
        &self.kernel
    }

    pub fn op(&self) -> MorphOp {
        self.op
    }

    /// Algorithm the filter will run
    pub fn selected_algorithm(&self) -> Algorithm {
        self.algorithm
            .unwrap_or_else(|| Algorithm::for_kernel(&self.kernel))
    }

    /// Boundary value the filter will use
    pub fn boundary_value(&self) -> T {
        self.boundary.unwrap_or_else(|| self.op.default_boundary())
    }

    /// Filter the requested region of `input` into a new image
    ///
    /// # Errors
    ///
    /// Returns [`crate::MorphError::NotDecomposable`] if the anchor algorithm was
    /// forced on a kernel without a line decomposition, and any error of the
    /// execution.
    pub fn apply(&self, input: &Image<T, D>) -> MorphResult<Image<T, D>> {
        let algorithm = self.selected_algorithm();
        debug!(op = ?self.op, algorithm = ?algorithm, mode = ?self.mode, "grayscale morphology");

        let mut output = Image::allocate(input.requested_region());
        match algorithm {
            Algorithm::Anchor => {
                let mut engine =
                    AnchorErodeDilate::new(self.kernel.clone(), self.op).with_config(self.config);
                engine.set_boundary(self.boundary_value());
                execute(&engine, input, &mut output, self.mode)?;
            }
            Algorithm::Basic => {
                let mut filter = BasicErodeDilate::new(self.kernel.clone(), self.op);
                filter.set_boundary(self.boundary_value());
                execute(&filter, input, &mut output, self.mode)?;
            }
        }
        Ok(output)
    }
}

/// Erode the requested region of `input` with `kernel`
pub fn erode<T: Pixel, const D: usize>(
    input: &Image<T, D>,
    kernel: &FlatKernel<D>,
) -> MorphResult<Image<T, D>> {
    GrayscaleMorphFilter::with_kernel(kernel.clone(), MorphOp::Erode).apply(input)
}

/// Dilate the requested region of `input` with `kernel`
pub fn dilate<T: Pixel, const D: usize>(
    input: &Image<T, D>,
    kernel: &FlatKernel<D>,
) -> MorphResult<Image<T, D>> {
    GrayscaleMorphFilter::with_kernel(kernel.clone(), MorphOp::Dilate).apply(input)
}

/// Open (erosion followed by dilation)
///
/// Opening removes bright features smaller than the kernel.
pub fn open<T: Pixel, const D: usize>(
    input: &Image<T, D>,
    kernel: &FlatKernel<D>,
) -> MorphResult<Image<T, D>> {
    dilate(&erode(input, kernel)?, kernel)
}

/// Close (dilation followed by erosion)
///
/// Closing fills dark features smaller than the kernel.
pub fn close<T: Pixel, const D: usize>(
    input: &Image<T, D>,
    kernel: &FlatKernel<D>,
) -> MorphResult<Image<T, D>> {
    erode(&dilate(input, kernel)?, kernel)
}

/// Morphological gradient (dilation minus erosion)
pub fn gradient<T, const D: usize>(
    input: &Image<T, D>,
    kernel: &FlatKernel<D>,
) -> MorphResult<Image<T, D>>
where
    T: Pixel + Sub<Output = T>,
{
    let dilated = dilate(input, kernel)?;
    let eroded = erode(input, kernel)?;
    Ok(dilated.zip_map(&eroded, difference)?)
}

/// White top-hat (input minus opening)
///
/// Extracts bright features smaller than the kernel.
pub fn top_hat<T, const D: usize>(
    input: &Image<T, D>,
    kernel: &FlatKernel<D>,
) -> MorphResult<Image<T, D>>
where
    T: Pixel + Sub<Output = T>,
{
    let opened = open(input, kernel)?;
    Ok(Image::from_fn(opened.buffered_region(), |p| {
        difference(input.pixel_at(&p), opened.pixel_at(&p))
    }))
}

/// Black top-hat (closing minus input)
///
/// Extracts dark features smaller than the kernel.
pub fn bottom_hat<T, const D: usize>(
    input: &Image<T, D>,
    kernel: &FlatKernel<D>,
) -> MorphResult<Image<T, D>>
where
    T: Pixel + Sub<Output = T>,
{
    let closed = close(input, kernel)?;
    Ok(Image::from_fn(closed.buffered_region(), |p| {
        difference(closed.pixel_at(&p), input.pixel_at(&p))
    }))
}

/// `a - b`, clamped at zero
#[inline]
fn difference<T: Pixel + Sub<Output = T>>(a: T, b: T) -> T {
    if a > b { a - b } else { T::default() }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndmorph_core::{Index, Region};

    fn ramp() -> Image<u8, 2> {
        let region = Region::from_size(Size([6, 5]));
        Image::from_fn(region, |p| (p[0] * 10 + p[1] * 3) as u8)
    }

    #[test]
    fn test_algorithm_choice() {
        assert_eq!(
            Algorithm::for_kernel(&FlatKernel::<2>::box_kernel(Size([1, 1]))),
            Algorithm::Anchor
        );
        assert_eq!(Algorithm::for_kernel(&FlatKernel::<2>::cross(1)), Algorithm::Basic);
    }

    #[test]
    fn test_anchor_matches_basic() {
        let input = ramp();
        let kernel = FlatKernel::box_kernel(Size([2, 1]));
        for op in [MorphOp::Erode, MorphOp::Dilate] {
            let anchor = GrayscaleMorphFilter::with_kernel(kernel.clone(), op)
                .algorithm(Algorithm::Anchor)
                .apply(&input)
                .unwrap();
            let basic = GrayscaleMorphFilter::with_kernel(kernel.clone(), op)
                .algorithm(Algorithm::Basic)
                .apply(&input)
                .unwrap();
            assert_eq!(anchor, basic, "{op:?}");
        }
    }

    #[test]
    fn test_forced_anchor_on_cross_fails() {
        let input = ramp();
        let err = GrayscaleMorphFilter::with_kernel(FlatKernel::cross(1), MorphOp::Erode)
            .algorithm(Algorithm::Anchor)
            .apply(&input)
            .unwrap_err();
        assert!(err.is_configuration());
    }

    #[test]
    fn test_requested_region_output() {
        let mut input = ramp();
        let inner = Region::new(Index([1, 1]), Size([3, 2]));
        input.set_requested_region(inner).unwrap();
        let out = GrayscaleMorphFilter::new(MorphOp::Dilate).apply(&input).unwrap();
        assert_eq!(out.buffered_region(), inner);
        // pixels outside the requested region are never read
        assert_eq!(out.pixel_at(&Index([3, 2])), input.pixel_at(&Index([3, 2])));
        assert_eq!(out.pixel_at(&Index([1, 1])), input.pixel_at(&Index([2, 2])));
    }

    #[test]
    fn test_composites_on_ramp() {
        let input = ramp();
        let kernel = FlatKernel::box_kernel(Size([1, 1]));

        let opened = open(&input, &kernel).unwrap();
        let closed = close(&input, &kernel).unwrap();
        let white = top_hat(&input, &kernel).unwrap();
        let black = bottom_hat(&input, &kernel).unwrap();
        for p in input.buffered_region().iter() {
            let v = input.pixel_at(&p);
            assert!(opened.pixel_at(&p) <= v);
            assert!(closed.pixel_at(&p) >= v);
            assert_eq!(white.pixel_at(&p), v - opened.pixel_at(&p));
            assert_eq!(black.pixel_at(&p), closed.pixel_at(&p) - v);
        }
        // interior of a ramp survives opening
        assert_eq!(opened.pixel_at(&Index([2, 2])), input.pixel_at(&Index([2, 2])));

        let grad = gradient(&input, &kernel).unwrap();
        assert_eq!(grad.pixel_at(&Index([2, 2])), 26);
    }

    #[test]
    fn test_top_hat_finds_peak() {
        let region = Region::from_size(Size([7, 7]));
        let mut input = Image::<u8, 2>::new_filled(region, 10);
        input.set_pixel_at(&Index([3, 3]), 90);
        let kernel = FlatKernel::box_kernel(Size([1, 1]));
        let hat = top_hat(&input, &kernel).unwrap();
        assert_eq!(hat.pixel_at(&Index([3, 3])), 80);
        assert_eq!(hat.data().iter().filter(|&&v| v != 0).count(), 1);
    }
}
