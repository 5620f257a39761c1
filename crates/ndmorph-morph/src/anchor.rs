//! Anchor erosion and dilation for decomposable structuring elements
//!
//! One invocation of [`AnchorErodeDilate::process_region`] computes the
//! output for a single sub-region:
//!
//! 1. the kernel is decomposed into lines; a kernel without a decomposition
//!    fails here, before anything is allocated or written
//! 2. the sub-region is padded by the kernel radius and cropped to the
//!    input's requested region; an accumulator and two line buffers are
//!    allocated for that padded region
//! 3. each line runs one pass: every digital line along its direction is
//!    extracted, filtered with an [`AnchorLine`], and stored back
//! 4. the accumulator, restricted to the sub-region, is copied to the output
//!
//! All scratch state belongs to the invocation, so one engine can serve any
//! number of sub-regions concurrently.

use crate::anchor_line::{AnchorLine, Extremum};
use crate::bresenham::{build_line, dominant_axis};
use crate::kernel::{FlatKernel, KernelLine};
use crate::{MorphError, MorphResult};
use ndmorph_core::{Image, ImageViewMut, Index, Pixel, Region, Size};
use tracing::{debug, trace};

/// Morphological operation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MorphOp {
    /// Minimum over the neighborhood
    Erode,
    /// Maximum over the neighborhood
    Dilate,
}

impl MorphOp {
    /// Extremum the operation keeps
    pub fn extremum(self) -> Extremum {
        match self {
            MorphOp::Erode => Extremum::Min,
            MorphOp::Dilate => Extremum::Max,
        }
    }

    /// Boundary value that leaves image edges unaffected
    pub fn default_boundary<T: Pixel>(self) -> T {
        self.extremum().neutral()
    }

    /// The dual operation
    pub fn dual(self) -> Self {
        match self {
            MorphOp::Erode => MorphOp::Dilate,
            MorphOp::Dilate => MorphOp::Erode,
        }
    }
}

/// Tuning for the anchor engine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnchorConfig {
    /// Extra line-buffer slots beyond the sum of the padded extents
    ///
    /// Two slots hold the boundary sentinels on either end of a line.
    pub line_margin: usize,
}

impl Default for AnchorConfig {
    fn default() -> Self {
        Self { line_margin: 2 }
    }
}

impl AnchorConfig {
    /// Smallest usable margin
    pub const MIN_LINE_MARGIN: usize = 2;

    /// Set the line-buffer margin
    pub fn with_line_margin(mut self, margin: usize) -> Self {
        self.line_margin = margin;
        self
    }

    /// Check the settings
    ///
    /// # Errors
    ///
    /// Returns [`MorphError::InvalidConfig`] for a margin below
    /// [`Self::MIN_LINE_MARGIN`].
    pub fn validate(&self) -> MorphResult<()> {
        if self.line_margin < Self::MIN_LINE_MARGIN {
            return Err(MorphError::InvalidConfig(format!(
                "line margin {} is below the minimum of {}",
                self.line_margin,
                Self::MIN_LINE_MARGIN
            )));
        }
        Ok(())
    }
}

/// Anchor-based grayscale erosion or dilation
#[derive(Debug, Clone)]
pub struct AnchorErodeDilate<T, const D: usize> {
    kernel: FlatKernel<D>,
    op: MorphOp,
    boundary: T,
    config: AnchorConfig,
}

impl<T: Pixel, const D: usize> AnchorErodeDilate<T, D> {
    /// Create an engine with the operation's neutral boundary value
    pub fn new(kernel: FlatKernel<D>, op: MorphOp) -> Self {
        Self {
            kernel,
            op,
            boundary: op.default_boundary(),
            config: AnchorConfig::default(),
        }
    }

    /// Replace the engine configuration
    pub fn with_config(mut self, config: AnchorConfig) -> Self {
        self.config = config;
        self
    }

    /// Structuring element
    pub fn kernel(&self) -> &FlatKernel<D> {
        &self.kernel
    }

    /// Operation
    pub fn op(&self) -> MorphOp {
        self.op
    }

    /// Configuration
    pub fn config(&self) -> AnchorConfig {
        self.config
    }

    /// Value read in place of pixels outside the input's requested region
    pub fn boundary(&self) -> T {
        self.boundary
    }

    /// Set the boundary value; takes effect on the next invocation
    pub fn set_boundary(&mut self, boundary: T) {
        self.boundary = boundary;
    }

    /// Check that the engine can run at all
    ///
    /// # Errors
    ///
    /// Returns [`MorphError::NotDecomposable`] for kernels without a line
    /// decomposition and [`MorphError::InvalidConfig`] for a bad
    /// configuration.
    pub fn verify(&self) -> MorphResult<()> {
        self.kernel.decompose()?;
        self.config.validate()
    }

    /// Input region read while computing `sub_region`
    ///
    /// This is `sub_region` padded by the kernel radius and cropped to the
    /// input's requested region.
    pub fn padded_region(&self, sub_region: &Region<D>, input: &Image<T, D>) -> Region<D> {
        sub_region
            .pad(&self.kernel.radius())
            .crop(&input.requested_region())
    }

    /// Compute the output for the region covered by `output`
    ///
    /// # Errors
    ///
    /// Returns [`MorphError::NotDecomposable`] before touching any buffer if
    /// the kernel has no line decomposition, and
    /// [`MorphError::InvalidParameters`] if the output region is not inside
    /// the input's requested region. The output is untouched on error.
    pub fn process_region(
        &self,
        input: &Image<T, D>,
        output: &mut ImageViewMut<'_, T, D>,
    ) -> MorphResult<()> {
        let lines = self.kernel.decompose()?;
        self.config.validate()?;

        let sub_region = output.region();
        let requested = input.requested_region();
        if !requested.contains_region(&sub_region) {
            return Err(MorphError::InvalidParameters(format!(
                "output region {sub_region} is outside the input requested region {requested}"
            )));
        }
        if sub_region.is_empty() {
            return Ok(());
        }

        if lines.is_empty() {
            for idx in sub_region.iter() {
                output.set_pixel_at(&idx, input.pixel_at(&idx));
            }
            return Ok(());
        }

        let padded = self.padded_region(&sub_region, input);
        debug!(
            sub_region = %sub_region,
            padded = %padded,
            lines = lines.len(),
            op = ?self.op,
            "anchor region"
        );

        let mut job = RegionJob::new(padded, self.config.line_margin, self.op.extremum());
        for line in &lines {
            job.line_pass(input, line, self.boundary)?;
        }
        job.write_back(output);
        Ok(())
    }
}

/// Scratch state owned by one invocation
struct RegionJob<T, const D: usize> {
    padded: Region<D>,
    accumulator: Image<T, D>,
    inbuf: Vec<T>,
    outbuf: Vec<T>,
    processor: AnchorLine,
    passes: usize,
}

impl<T: Pixel, const D: usize> RegionJob<T, D> {
    fn new(padded: Region<D>, margin: usize, extremum: Extremum) -> Self {
        let capacity = padded.size().sum() + margin;
        Self {
            padded,
            accumulator: Image::allocate(padded),
            inbuf: vec![T::default(); capacity],
            outbuf: vec![T::default(); capacity],
            processor: AnchorLine::identity(extremum),
            passes: 0,
        }
    }

    /// Filter every digital line of the padded region along `line`
    fn line_pass(
        &mut self,
        input: &Image<T, D>,
        line: &KernelLine<D>,
        boundary: T,
    ) -> MorphResult<()> {
        let RegionJob {
            padded,
            accumulator,
            inbuf,
            outbuf,
            processor,
            passes,
        } = self;

        let (axis, _) = dominant_axis(&line.direction)?;
        let extent = padded.size()[axis];
        // a run never exceeds the dominant extent, and the buffers hold the
        // sum of all extents plus the two sentinels
        debug_assert!(extent + 2 <= inbuf.len());

        // decomposed lines are regular, so every window sees the same offsets
        let steps = build_line(&line.direction, extent)?;
        processor.set_length(line.length)?;

        let face = start_face(padded, &steps, axis, line.direction[axis] > 0);
        let mut runs = 0usize;

        for start in face.iter() {
            let inside = |k: usize| padded.contains_index(&(start + steps[k]));
            let Some(first) = (0..extent).find(|&k| inside(k)) else {
                continue;
            };
            let last = (first..extent).take_while(|&k| inside(k)).last().unwrap_or(first);
            let run = &steps[first..=last];
            debug_assert!(run.len() + 2 <= inbuf.len());
            let len = run.len();

            inbuf[0] = boundary;
            for (j, step) in run.iter().enumerate() {
                let idx = start + *step;
                inbuf[j + 1] = if *passes == 0 {
                    input.pixel_at(&idx)
                } else {
                    accumulator.pixel_at(&idx)
                };
            }
            inbuf[len + 1] = boundary;

            processor.process(&inbuf[..len + 2], &mut outbuf[..len + 2], boundary)?;

            for (j, step) in run.iter().enumerate() {
                accumulator.set_pixel_at(&(start + *step), outbuf[j + 1]);
            }
            runs += 1;
        }

        *passes += 1;
        trace!(
            direction = %line.direction,
            length = line.length,
            runs,
            "anchor line pass"
        );
        Ok(())
    }

    fn write_back(&self, output: &mut ImageViewMut<'_, T, D>) {
        for idx in output.region().iter() {
            output.set_pixel_at(&idx, self.accumulator.pixel_at(&idx));
        }
    }
}

/// Start positions whose digital lines cover `padded` exactly once
///
/// The lines advance one slice per step along `axis`, so they all start in
/// the first slice they meet. On every other axis the face is widened by the
/// spread of the steps, so lines entering through a side are included too.
fn start_face<const D: usize>(
    padded: &Region<D>,
    steps: &[Index<D>],
    axis: usize,
    forward: bool,
) -> Region<D> {
    let lower = padded.index();
    let upper = padded.upper();
    let mut index = lower;
    let mut size = Size::<D>::default();

    for i in 0..D {
        if i == axis {
            index[i] = if forward { lower[i] } else { upper[i] - 1 };
            size.0[i] = 1;
            continue;
        }
        let lo = steps.iter().map(|s| s[i]).min().unwrap_or(0);
        let hi = steps.iter().map(|s| s[i]).max().unwrap_or(0);
        index[i] = lower[i] - hi;
        size.0[i] = padded.size()[i] + (hi - lo) as usize;
    }
    Region::new(index, size)
}
