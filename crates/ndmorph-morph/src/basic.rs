//! Brute-force erosion and dilation for arbitrary flat kernels
//!
//! Every output pixel scans the whole neighborhood. This works for any
//! kernel shape and serves as the reference the anchor engine is checked
//! against.

use crate::anchor::MorphOp;
use crate::kernel::FlatKernel;
use crate::{MorphError, MorphResult};
use ndmorph_core::{Image, ImageViewMut, Pixel};

/// Neighborhood-scanning grayscale erosion or dilation
#[derive(Debug, Clone)]
pub struct BasicErodeDilate<T, const D: usize> {
    kernel: FlatKernel<D>,
    op: MorphOp,
    boundary: T,
}

impl<T: Pixel, const D: usize> BasicErodeDilate<T, D> {
    /// Create a filter with the operation's neutral boundary value
    pub fn new(kernel: FlatKernel<D>, op: MorphOp) -> Self {
        Self {
            kernel,
            op,
            boundary: op.default_boundary(),
        }
    }

    pub fn kernel(&self) -> &FlatKernel<D> {
        &self.kernel
    }

    pub fn op(&self) -> MorphOp {
        self.op
    }

    pub fn boundary(&self) -> T {
        self.boundary
    }

    pub fn set_boundary(&mut self, boundary: T) {
        self.boundary = boundary;
    }

    /// Compute the output for the region covered by `output`
    ///
    /// Erosion reads `idx + b` and dilation reads `idx - b` for every kernel
    /// offset `b`, so dilation uses the reflected kernel and opening and
    /// closing stay ordered for asymmetric masks. Neighbors outside the
    /// input's requested region read the boundary value. An empty
    /// neighborhood yields the operation's neutral value.
    ///
    /// # Errors
    ///
    /// Returns [`MorphError::InvalidParameters`] if the output region is not
    /// inside the input's requested region.
    pub fn process_region(
        &self,
        input: &Image<T, D>,
        output: &mut ImageViewMut<'_, T, D>,
    ) -> MorphResult<()> {
        let sub_region = output.region();
        let requested = input.requested_region();
        if !requested.contains_region(&sub_region) {
            return Err(MorphError::InvalidParameters(format!(
                "output region {sub_region} is outside the input requested region {requested}"
            )));
        }

        let ext = self.op.extremum();
        let offsets: Vec<_> = match self.op {
            MorphOp::Erode => self.kernel.offsets(),
            MorphOp::Dilate => self.kernel.offsets().into_iter().map(|b| -b).collect(),
        };
        for idx in sub_region.iter() {
            let mut best: Option<T> = None;
            for off in &offsets {
                let p = idx + *off;
                let v = if requested.contains_index(&p) {
                    input.pixel_at(&p)
                } else {
                    self.boundary
                };
                best = Some(match best {
                    Some(b) => ext.pick(b, v),
                    None => v,
                });
            }
            output.set_pixel_at(&idx, best.unwrap_or_else(|| ext.neutral()));
        }
        Ok(())
    }
}
