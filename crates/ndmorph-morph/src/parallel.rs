//! Region-split execution of region filters
//!
//! The output image is cut into slabs along its slowest axis. Each slab is a
//! contiguous run of the output buffer, so the slabs become disjoint
//! [`ImageViewMut`]s that workers fill without any locking. The input is
//! shared read-only.

use crate::anchor::AnchorErodeDilate;
use crate::basic::BasicErodeDilate;
use crate::{MorphError, MorphResult};
use ndmorph_core::{Image, ImageViewMut, Index, Pixel, Region, Size};
use rayon::prelude::*;
use tracing::{debug, warn};

/// Processing mode for region filters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ProcessingMode {
    /// Single-threaded processing
    Sequential,
    /// Parallel processing using all available cores
    #[default]
    Parallel,
    /// Parallel with specified number of threads
    ParallelWith(usize),
}

impl ProcessingMode {
    /// Number of pieces to split the output into
    pub fn pieces(&self) -> usize {
        match self {
            ProcessingMode::Sequential => 1,
            ProcessingMode::Parallel => rayon::current_num_threads(),
            ProcessingMode::ParallelWith(threads) => *threads,
        }
    }
}

/// Splits a region into disjoint slabs along its last axis
pub struct RegionSplitter;

impl RegionSplitter {
    /// Split `region` into at most `pieces` consecutive slabs
    ///
    /// The slabs cover `region` exactly and differ in thickness by at most
    /// one. A region whose last axis is shorter than `pieces` yields one slab
    /// per slice; an empty region yields itself.
    pub fn split<const D: usize>(region: &Region<D>, pieces: usize) -> Vec<Region<D>> {
        if D == 0 || region.is_empty() || pieces <= 1 {
            return vec![*region];
        }
        let last = D - 1;
        let extent = region.size()[last];
        let count = pieces.min(extent);
        let (base, extra) = (extent / count, extent % count);

        let mut out = Vec::with_capacity(count);
        let mut start = region.index()[last];
        for n in 0..count {
            let thickness = base + usize::from(n < extra);
            let mut index: Index<D> = region.index();
            index[last] = start;
            let mut size: Size<D> = region.size();
            size.0[last] = thickness;
            out.push(Region::new(index, size));
            start += thickness as i64;
        }
        out
    }
}

/// A filter that computes one output sub-region at a time
///
/// Implementors must only write inside the view they are given and must
/// treat the input as read-only.
pub trait RegionFilter<T: Pixel, const D: usize>: Sync {
    /// Check the configuration once before any piece runs
    fn verify(&self) -> MorphResult<()> {
        Ok(())
    }

    /// Compute the output pixels for `output.region()`
    fn process_region(
        &self,
        input: &Image<T, D>,
        output: &mut ImageViewMut<'_, T, D>,
    ) -> MorphResult<()>;
}

impl<T: Pixel, const D: usize> RegionFilter<T, D> for AnchorErodeDilate<T, D> {
    fn verify(&self) -> MorphResult<()> {
        AnchorErodeDilate::verify(self)
    }

    fn process_region(
        &self,
        input: &Image<T, D>,
        output: &mut ImageViewMut<'_, T, D>,
    ) -> MorphResult<()> {
        AnchorErodeDilate::process_region(self, input, output)
    }
}

impl<T: Pixel, const D: usize> RegionFilter<T, D> for BasicErodeDilate<T, D> {
    fn process_region(
        &self,
        input: &Image<T, D>,
        output: &mut ImageViewMut<'_, T, D>,
    ) -> MorphResult<()> {
        BasicErodeDilate::process_region(self, input, output)
    }
}

/// Run `filter` over the buffered region of `output`
///
/// The filter is verified once, then the output is split according to
/// `mode` and every piece is processed exactly once. The first error aborts
/// the run and is returned.
///
/// # Errors
///
/// Returns the filter's verification error before anything is written,
/// [`MorphError::InvalidConfig`] for a zero thread count, and
/// [`MorphError::ThreadPool`] if a dedicated pool cannot be built.
pub fn execute<T, F, const D: usize>(
    filter: &F,
    input: &Image<T, D>,
    output: &mut Image<T, D>,
    mode: ProcessingMode,
) -> MorphResult<()>
where
    T: Pixel,
    F: RegionFilter<T, D>,
{
    if let Err(e) = filter.verify() {
        warn!(error = %e, "region filter rejected before execution");
        return Err(e);
    }
    if mode == ProcessingMode::ParallelWith(0) {
        return Err(MorphError::InvalidConfig(
            "thread count must be at least 1".to_string(),
        ));
    }

    let region = output.buffered_region();
    let pieces = RegionSplitter::split(&region, mode.pieces());
    debug!(region = %region, pieces = pieces.len(), mode = ?mode, "executing region filter");
    let mut views = output.split_views_mut(&pieces)?;

    match mode {
        ProcessingMode::Sequential => views
            .iter_mut()
            .try_for_each(|view| filter.process_region(input, view)),
        ProcessingMode::Parallel => views
            .par_iter_mut()
            .try_for_each(|view| filter.process_region(input, view)),
        ProcessingMode::ParallelWith(threads) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| MorphError::ThreadPool(e.to_string()))?;
            pool.install(|| {
                views
                    .par_iter_mut()
                    .try_for_each(|view| filter.process_region(input, view))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::anchor::MorphOp;
    use crate::kernel::FlatKernel;

    #[test]
    fn test_split_even_and_uneven() {
        let region = Region::new(Index([0, 2]), Size([4, 10]));
        let pieces = RegionSplitter::split(&region, 3);
        let sizes: Vec<_> = pieces.iter().map(|r| r.size()[1]).collect();
        assert_eq!(sizes, vec![4, 3, 3]);
        assert_eq!(pieces[0].index(), Index([0, 2]));
        assert_eq!(pieces[1].index(), Index([0, 6]));
        assert_eq!(pieces[2].index(), Index([0, 9]));
        let total: usize = pieces.iter().map(Region::number_of_pixels).sum();
        assert_eq!(total, region.number_of_pixels());
    }

    #[test]
    fn test_split_short_axis() {
        let region = Region::from_size(Size([8, 2]));
        assert_eq!(RegionSplitter::split(&region, 16).len(), 2);
        assert_eq!(RegionSplitter::split(&region, 1), vec![region]);
        let empty = Region::from_size(Size([0, 5]));
        assert_eq!(RegionSplitter::split(&empty, 4), vec![empty]);
    }

    #[test]
    fn test_modes_agree() {
        let region = Region::from_size(Size([9, 13]));
        let input = Image::<u16, 2>::from_fn(region, |p| ((p[0] * 7 + p[1] * 13) % 31) as u16);
        let filter = AnchorErodeDilate::new(FlatKernel::box_kernel(Size([2, 1])), MorphOp::Erode);

        let mut seq = Image::allocate(region);
        execute(&filter, &input, &mut seq, ProcessingMode::Sequential).unwrap();
        let modes = [
            ProcessingMode::Parallel,
            ProcessingMode::ParallelWith(3),
            ProcessingMode::ParallelWith(64),
        ];
        for mode in modes {
            let mut par = Image::allocate(region);
            execute(&filter, &input, &mut par, mode).unwrap();
            assert_eq!(seq, par, "mode {mode:?}");
        }
    }

    #[test]
    fn test_configuration_error_before_write() {
        let region = Region::from_size(Size([4, 4]));
        let input = Image::<u8, 2>::new_filled(region, 1);
        let filter = AnchorErodeDilate::new(FlatKernel::cross(1), MorphOp::Dilate);
        let mut out = Image::new_filled(region, 9);
        let err = execute(&filter, &input, &mut out, ProcessingMode::Parallel).unwrap_err();
        assert!(matches!(err, MorphError::NotDecomposable));
        assert!(out.data().iter().all(|&v| v == 9));
    }

    #[test]
    fn test_zero_threads_rejected() {
        let region = Region::from_size(Size([2, 2]));
        let input = Image::<u8, 2>::allocate(region);
        let filter = BasicErodeDilate::new(FlatKernel::box_kernel(Size([1, 1])), MorphOp::Erode);
        let mut out = Image::allocate(region);
        let err = execute(&filter, &input, &mut out, ProcessingMode::ParallelWith(0)).unwrap_err();
        assert!(matches!(err, MorphError::InvalidConfig(_)));
    }
}
