//! ndmorph-morph - Grayscale morphology for N-dimensional images
//!
//! This crate provides flat-kernel grayscale morphology:
//!
//! - Digital line rasterization for arbitrary integer directions
//! - Flat structuring elements and their decomposition into 1-D lines
//! - Anchor erosion and dilation: sliding min/max along every digital line
//! - Brute-force erosion and dilation for kernels without a decomposition
//! - Region-split execution on a rayon thread pool
//! - Opening, closing, gradient, top-hat and bottom-hat transforms
//! - Morphological sequence operations for chaining multiple operations

mod anchor;
pub mod anchor_line;
mod basic;
pub mod bresenham;
mod error;
pub mod grayscale;
pub mod kernel;
pub mod parallel;
pub mod sequence;

pub use anchor::{AnchorConfig, AnchorErodeDilate, MorphOp};
pub use anchor_line::{AnchorLine, Extremum};
pub use basic::BasicErodeDilate;
pub use error::{MorphError, MorphResult};
pub use kernel::{FlatKernel, KernelLine};

// Re-export grayscale morphology functions
pub use grayscale::{
    Algorithm, GrayscaleMorphFilter, bottom_hat, close, dilate, erode, gradient, open, top_hat,
};

// Re-export execution types
pub use parallel::{ProcessingMode, RegionFilter, RegionSplitter, execute};

// Re-export sequence functions
pub use sequence::{MorphSequence, SequenceOp, gray_morph_sequence};
