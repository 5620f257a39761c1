//! ndmorph - N-dimensional grayscale morphology for Rust
//!
//! Flat-kernel erosion and dilation over images of any dimension. Kernels
//! that decompose into lines (boxes and line kernels) run on the anchor
//! engine, which slides a min/max window along every digital line of the
//! image; other kernels fall back to a neighborhood scan. Work is split into
//! disjoint output slabs and executed on a rayon thread pool.
//!
//! # Example
//!
//! ```
//! use ndmorph::{Image, Index, Region, Size};
//! use ndmorph::morph::{FlatKernel, close, gray_morph_sequence};
//!
//! let region = Region::from_size(Size([32, 32, 8]));
//! let mut volume = Image::<u8, 3>::new_filled(region, 200);
//! volume.set_pixel(&Index([10, 10, 4]), 0).unwrap();
//!
//! // closing fills the single dark voxel
//! let closed = close(&volume, &FlatKernel::box_kernel(Size([1, 1, 1]))).unwrap();
//! assert_eq!(closed.pixel_at(&Index([10, 10, 4])), 200);
//!
//! let same = gray_morph_sequence(&volume, "c3.3.3").unwrap();
//! assert_eq!(same, closed);
//! ```

// Re-export core types (primary data structures used everywhere)
pub use ndmorph_core::*;

// Re-export the morphology crate as a module to avoid name conflicts
pub use ndmorph_morph as morph;
